//! Integration tests for the asset store and its storage file.

use std::fs;
use std::path::{Path, PathBuf};

use aldehyde_assets::codec::{self, PURCHASE_DATE};
use aldehyde_assets::{AssetRecord, AssetStore, CodecError, StoreError};
use chrono::NaiveDate;
use tempfile::TempDir;

const DRILL: &str = "Drill,Tools,Garage,2023-05-01,Cordless drill,120,2025-05-01";
const SAW: &str = "Saw,Tools,Shed,No date provided,Hand saw,40,No date provided";

fn store_file(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let path = dir.path().join("assets.csv");
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

fn names(store: &AssetStore) -> Vec<String> {
    store.list().iter().map(|a| a.record.name.clone()).collect()
}

fn file_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn missing_file_is_empty_store() {
    let dir = TempDir::new().unwrap();
    let (store, report) = AssetStore::load(dir.path().join("nope.csv"));

    assert!(store.is_empty());
    assert!(report.missing_file);
    assert!(report.unavailable.is_none());
    assert!(report.is_clean());
}

#[test]
fn load_decodes_each_line() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (store, report) = AssetStore::load(&path);

    assert_eq!(report.loaded, 2);
    assert_eq!(report.assigned_ids, 2);
    assert_eq!(names(&store), vec!["Drill", "Saw"]);

    let drill = &store.list()[0].record;
    assert_eq!(drill.purchase_date, NaiveDate::from_ymd_opt(2023, 5, 1));
    assert_eq!(drill.purchase_value, "120");
    assert_eq!(store.list()[1].record.warranty_expiration_date, None);
}

#[test]
fn corrupt_line_does_not_abort_load() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, "garbage without fields", SAW]);
    let (store, report) = AssetStore::load(&path);

    assert_eq!(names(&store), vec!["Drill", "Saw"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 2);
    assert_eq!(report.skipped[0].content, "garbage without fields");
    assert_eq!(
        report.skipped[0].error,
        CodecError::MalformedRecord { found: 1 }
    );
}

#[test]
fn bad_date_is_reported_and_record_kept() {
    let dir = TempDir::new().unwrap();
    let path = store_file(
        &dir,
        &["Kettle,Kitchen,Counter,01/02/2022,Electric,25,No date provided"],
    );
    let (store, report) = AssetStore::load(&path);

    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].record.purchase_date, None);
    assert_eq!(report.degraded.len(), 1);
    assert!(matches!(
        report.degraded[0].error,
        CodecError::UnparseableDate { field, .. } if field == PURCHASE_DATE
    ));
}

#[test]
fn unreadable_path_reports_unavailable() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();

    let (store, report) = AssetStore::load(blocker.join("assets.csv"));

    assert!(store.is_empty());
    assert!(!report.missing_file);
    assert!(matches!(
        report.unavailable,
        Some(StoreError::StorageUnavailable { .. })
    ));
}

#[test]
fn search_is_case_insensitive_substring() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (store, _) = AssetStore::load(&path);

    let hits: Vec<&str> = store
        .search("dri")
        .iter()
        .map(|a| a.record.name.as_str())
        .collect();
    assert_eq!(hits, vec!["Drill"]);

    assert_eq!(store.search("DRI").len(), 1);
    assert_eq!(store.search("iLl").len(), 1);
    assert_eq!(store.search("a").len(), 1);
    assert!(store.search("hammer").is_empty());
}

#[test]
fn empty_search_matches_all_in_order() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[SAW, DRILL]);
    let (store, _) = AssetStore::load(&path);

    let all: Vec<&str> = store
        .search("")
        .iter()
        .map(|a| a.record.name.as_str())
        .collect();
    assert_eq!(all, vec!["Saw", "Drill"]);
}

#[test]
fn search_does_not_change_list() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (store, _) = AssetStore::load(&path);
    let before = store.list().to_vec();

    for text in ["dri", "saw", "", "zzz"] {
        let _ = store.search(text);
    }

    assert_eq!(store.list(), before.as_slice());
    assert_eq!(file_lines(&path), vec![DRILL, SAW]);
}

#[test]
fn delete_rewrites_file_with_remaining() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (mut store, _) = AssetStore::load(&path);
    let drill = store.list()[0].id;
    let saw = store.list()[1].clone();

    let removed = store.delete(drill).unwrap();

    assert_eq!(removed.record.name, "Drill");
    assert_eq!(names(&store), vec!["Saw"]);
    assert_eq!(
        file_lines(&path),
        vec![codec::encode(saw.id, &saw.record)]
    );

    let (reloaded, report) = AssetStore::load(&path);
    assert!(report.is_clean());
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn delete_shrinks_by_exactly_one() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW, DRILL]);
    let (mut store, _) = AssetStore::load(&path);
    let second_drill = store.list()[2].id;

    store.delete(second_drill).unwrap();

    assert_eq!(store.len(), 2);
    assert!(store.get(second_drill).is_none());
    // the structurally identical first drill survives
    assert_eq!(names(&store), vec!["Drill", "Saw"]);
    assert_eq!(AssetStore::load(&path).0.list(), store.list());
}

#[test]
fn delete_unknown_is_selection_required() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL]);
    let (mut store, _) = AssetStore::load(&path);
    let id = store.list()[0].id;
    store.delete(id).unwrap();

    let err = store.delete(id).unwrap_err();
    assert!(matches!(err, StoreError::SelectionRequired));
    assert!(!err.is_storage());
}

#[test]
fn update_replaces_fields_and_keeps_id() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (mut store, _) = AssetStore::load(&path);
    let saw = store.list()[1].id;

    let index = store.position(saw).unwrap();
    let edited = AssetRecord::new("Saw")
        .with_category("Tools")
        .with_location("Garage, back wall")
        .with_description("Hand saw")
        .with_purchase_value("40")
        .warranty_until(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    store.update(index, edited.clone()).unwrap();

    assert_eq!(store.get(saw).unwrap().record, edited);

    let (reloaded, report) = AssetStore::load(&path);
    assert!(report.is_clean());
    assert_eq!(reloaded.get(saw).unwrap().record, edited);
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn append_persists_at_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("assets.csv");
    let (mut store, _) = AssetStore::load(&path);

    let drill = store.append(AssetRecord::new("Drill")).unwrap();
    let saw = store.append(AssetRecord::new("Saw")).unwrap();
    assert_ne!(drill, saw);

    let (reloaded, _) = AssetStore::load(&path);
    assert_eq!(names(&reloaded), vec!["Drill", "Saw"]);
    assert_eq!(reloaded.list()[1].id, saw);
}

#[test]
fn rewrite_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    let (mut store, _) = AssetStore::load(&path);

    store.append(AssetRecord::new("Ladder")).unwrap();
    let id = store.list()[0].id;
    store.delete(id).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn failed_write_keeps_memory_change() {
    let dir = TempDir::new().unwrap();
    let parent = dir.path().join("later");
    let (mut store, report) = AssetStore::load(parent.join("assets.csv"));
    assert!(report.missing_file);
    // the parent directory cannot be created once a file sits in its place
    fs::write(&parent, "").unwrap();

    let err = store.append(AssetRecord::new("Drill")).unwrap_err();

    assert!(err.is_storage());
    assert_eq!(store.len(), 1);
    assert!(store.save().is_err());
}

#[test]
fn save_retries_after_failure() {
    let dir = TempDir::new().unwrap();
    let parent = dir.path().join("later");
    let (mut store, _) = AssetStore::load(parent.join("assets.csv"));
    fs::write(&parent, "").unwrap();
    assert!(store.append(AssetRecord::new("Drill")).is_err());

    fs::remove_file(&parent).unwrap();
    store.save().unwrap();

    let (reloaded, _) = AssetStore::load(parent.join("assets.csv"));
    assert_eq!(names(&reloaded), vec!["Drill"]);
}

#[test]
fn unread_file_is_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let parent = dir.path().join("data");
    fs::write(&parent, "").unwrap();
    let path = parent.join("assets.csv");
    let (mut store, report) = AssetStore::load(&path);
    assert!(report.unavailable.is_some());
    assert!(store.is_read_only());

    // the file becomes reachable after the failed read
    fs::remove_file(&parent).unwrap();
    fs::create_dir(&parent).unwrap();
    fs::write(&path, format!("{DRILL}\n{SAW}\n")).unwrap();

    let err = store.append(AssetRecord::new("Ladder")).unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly { .. }));
    assert!(!err.is_storage());
    assert!(store.is_empty());
    assert!(matches!(store.save(), Err(StoreError::ReadOnly { .. })));

    assert_eq!(file_lines(&path), vec![DRILL, SAW]);
}

#[cfg(unix)]
#[test]
fn file_without_read_permission_is_left_intact() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, &[DRILL, SAW]);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&path).is_ok() {
        // running as root, mode bits do not block the read
        return;
    }

    let (mut store, report) = AssetStore::load(&path);
    assert!(report.unavailable.is_some());
    assert!(store.append(AssetRecord::new("Ladder")).is_err());

    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    assert_eq!(file_lines(&path), vec![DRILL, SAW]);
}

#[test]
fn padded_fields_survive_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assets.csv");
    let (mut store, _) = AssetStore::load(&path);

    let record = AssetRecord::new(" Drill ").with_description("  padded");
    let id = store.append(record.clone()).unwrap();

    let (reloaded, report) = AssetStore::load(&path);
    assert!(report.is_clean());
    assert_eq!(reloaded.get(id).unwrap().record, record);
    assert_eq!(reloaded.list(), store.list());
}
