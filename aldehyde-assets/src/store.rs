use std::collections::HashSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use tempfile::NamedTempFile;

use crate::codec;
use crate::error::{CodecError, StoreError};
use crate::record::{Asset, AssetId, AssetRecord};

/// A problem attributed to one line of the storage file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based.
    pub line: usize,
    pub content: String,
    pub error: CodecError,
}

/// What happened while loading the storage file.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub missing_file: bool,
    /// Lines dropped because they could not be decoded.
    pub skipped: Vec<LineDiagnostic>,
    /// Lines kept with one or more dates treated as absent.
    pub degraded: Vec<LineDiagnostic>,
    /// Records that had no id, or a duplicate one, and were given a fresh id.
    pub assigned_ids: usize,
    /// Set when the file exists but could not be read; the store starts empty.
    pub unavailable: Option<StoreError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.degraded.is_empty() && self.unavailable.is_none()
    }
}

/// The authoritative asset collection, mirrored to a delimited text file.
///
/// Order is file order, then append order. Every mutation rewrites the whole
/// file through a temporary file renamed into place, so a failed write leaves
/// the previous file untouched. The in-memory change is kept even when the
/// write fails; call [`AssetStore::save`] to retry.
///
/// A store whose file existed but could not be read is read-only: every
/// mutation fails with [`StoreError::ReadOnly`] so the empty collection never
/// replaces the unread file.
#[derive(Debug)]
pub struct AssetStore {
    path: PathBuf,
    assets: Vec<Asset>,
    /// `None` once ids past the largest stored one are exhausted.
    next_id: Option<AssetId>,
    read_only: bool,
}

impl AssetStore {
    /// Loads the store from `path`.
    ///
    /// Never fails: a missing file yields an empty store, an unreadable file
    /// yields an empty store with `unavailable` set, and lines that cannot be
    /// decoded are skipped and listed in the report.
    pub fn load(path: impl Into<PathBuf>) -> (Self, LoadReport) {
        let path = path.into();
        let mut store = Self {
            path,
            assets: Vec::new(),
            next_id: Some(AssetId::new(1)),
            read_only: false,
        };
        let mut report = LoadReport::default();

        let bytes = match fs::read(&store.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} does not exist, starting empty", store.path.display());
                report.missing_file = true;
                return (store, report);
            }
            Err(e) => {
                error!("failed to read {}: {}", store.path.display(), e);
                report.unavailable = Some(store.unavailable(e));
                store.read_only = true;
                return (store, report);
            }
        };
        let content = String::from_utf8_lossy(&bytes);

        let mut decoded = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index + 1;
            match codec::decode(line) {
                Ok(d) => {
                    for issue in &d.date_issues {
                        warn!("line {}: {}", line_no, issue);
                        report.degraded.push(LineDiagnostic {
                            line: line_no,
                            content: line.to_string(),
                            error: issue.clone(),
                        });
                    }
                    decoded.push((line_no, d));
                }
                Err(e) => {
                    warn!("line {}: skipped: {}", line_no, e);
                    report.skipped.push(LineDiagnostic {
                        line: line_no,
                        content: line.to_string(),
                        error: e,
                    });
                }
            }
        }

        // Every stored id is reserved up front so fresh ones never collide with a later line.
        let mut taken: HashSet<AssetId> = decoded.iter().filter_map(|(_, d)| d.id).collect();
        if let Some(max) = taken.iter().max() {
            store.next_id = max.next();
        }

        let mut claimed = HashSet::new();
        for (line_no, d) in decoded {
            let id = match d.id {
                Some(id) if claimed.insert(id) => id,
                stored => {
                    let id = store.allocate_id(&taken);
                    taken.insert(id);
                    claimed.insert(id);
                    if let Some(dup) = stored {
                        warn!("line {}: duplicate id {}, reassigned {}", line_no, dup, id);
                    }
                    report.assigned_ids += 1;
                    id
                }
            };
            store.assets.push(Asset {
                id,
                record: d.record,
            });
        }

        report.loaded = store.assets.len();
        info!(
            "loaded {} assets from {} ({} skipped)",
            report.loaded,
            store.path.display(),
            report.skipped.len()
        );
        (store, report)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file could not be read at load time.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// The authoritative collection, in order.
    pub fn list(&self) -> &[Asset] {
        &self.assets
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Position of `id` in [`list`](Self::list), for use with [`update`](Self::update).
    pub fn position(&self, id: AssetId) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }

    /// Every asset whose name contains `text`, ignoring case, in collection order.
    ///
    /// Empty `text` matches everything. The store is not modified.
    pub fn search(&self, text: &str) -> Vec<&Asset> {
        let needle = text.to_lowercase();
        let matches: Vec<&Asset> = self
            .assets
            .iter()
            .filter(|a| a.record.name_contains(&needle))
            .collect();
        debug!("search {:?}: {} of {} match", text, matches.len(), self.assets.len());
        matches
    }

    /// Distinct non-blank categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.assets.iter().map(|a| a.record.category.as_str()))
    }

    /// Distinct non-blank locations in first-seen order.
    pub fn locations(&self) -> Vec<&str> {
        distinct(self.assets.iter().map(|a| a.record.location.as_str()))
    }

    /// Removes the asset with `id` and rewrites the file.
    ///
    /// Returns [`StoreError::SelectionRequired`] without touching the file when
    /// no such asset exists.
    pub fn delete(&mut self, id: AssetId) -> Result<Asset, StoreError> {
        self.ensure_writable()?;
        let index = self.position(id).ok_or(StoreError::SelectionRequired)?;
        let removed = self.assets.remove(index);
        info!("deleted {} ({})", removed.record.name, removed.id);
        self.save()?;
        Ok(removed)
    }

    /// Replaces the fields of the asset at `index` and rewrites the file.
    /// The asset keeps its id.
    ///
    /// # Panics
    ///
    /// If `index` is out of range. Callers obtain it from [`position`](Self::position)
    /// on this same store.
    pub fn update(&mut self, index: usize, record: AssetRecord) -> Result<(), StoreError> {
        self.ensure_writable()?;
        let len = self.assets.len();
        let Some(asset) = self.assets.get_mut(index) else {
            panic!("asset index {index} out of range for store of {len}");
        };
        asset.record = record;
        debug!("updated {} at {}", asset.id, index);
        self.save()
    }

    /// Adds a new asset at the end and rewrites the file.
    pub fn append(&mut self, record: AssetRecord) -> Result<AssetId, StoreError> {
        self.ensure_writable()?;
        let taken: HashSet<AssetId> = self.assets.iter().map(|a| a.id).collect();
        let id = self.allocate_id(&taken);
        self.assets.push(Asset { id, record });
        debug!("appended {}", id);
        self.save()?;
        Ok(id)
    }

    /// Writes the whole collection to the storage file.
    ///
    /// The content goes to a temporary file in the same directory, which then
    /// replaces the storage file in one rename.
    pub fn save(&self) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.write_all().map_err(|e| {
            error!("failed to write {}: {}", self.path.display(), e);
            self.unavailable(e)
        })?;
        debug!("wrote {} assets to {}", self.assets.len(), self.path.display());
        Ok(())
    }

    fn write_all(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            for asset in &self.assets {
                writeln!(writer, "{}", codec::encode(asset.id, &asset.record))?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Hands out ids above the largest stored one, then the lowest id not in `taken`.
    fn allocate_id(&mut self, taken: &HashSet<AssetId>) -> AssetId {
        if let Some(id) = self.next_id {
            self.next_id = id.next();
            return id;
        }

        let mut used: Vec<u64> = taken.iter().map(|id| id.get()).collect();
        used.sort_unstable();
        let mut candidate = 1;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        AssetId::new(candidate)
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            warn!("not writing {}: it could not be read", self.path.display());
            return Err(StoreError::ReadOnly {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn unavailable(&self, source: io::Error) -> StoreError {
        StoreError::StorageUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    labels
        .filter(|label| !label.trim().is_empty() && seen.insert(*label))
        .collect()
}
