use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{AppMode, BrowseApp};

pub fn handle_event(app: &mut BrowseApp, event: Event) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(app, key);
        }
    }
}

fn handle_key(app: &mut BrowseApp, key: KeyEvent) {
    match app.mode {
        AppMode::Table => handle_table_key(app, key),
        AppMode::Search => handle_search_key(app, key),
        AppMode::Edit => handle_edit_key(app, key),
    }
}

fn handle_table_key(app: &mut BrowseApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc if !app.query.is_empty() => app.clear_search(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_selected(),
        KeyCode::Char('a') => app.add_new(),
        KeyCode::Char('r') => app.retry_save(),
        _ => {}
    }
}

fn handle_search_key(app: &mut BrowseApp, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => app.clear_search(),
        (KeyCode::Enter, _) => app.finish_search(),
        (KeyCode::Backspace, _) => app.search_backspace(),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => app.search_char(c),
        _ => {}
    }
}

fn handle_edit_key(app: &mut BrowseApp, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => app.cancel_form(),
        (KeyCode::Enter, _) => app.commit_form(),
        (KeyCode::Tab, _) | (KeyCode::Down, _) => app.focus_next(),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => app.focus_previous(),
        (KeyCode::Backspace, _) => app.input_backspace(),
        (KeyCode::Delete, _) => app.input_delete(),
        (KeyCode::Left, _) => app.input_left(),
        (KeyCode::Right, _) => app.input_right(),
        (KeyCode::Home, _) => app.input_home(),
        (KeyCode::End, _) => app.input_end(),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => app.input_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aldehyde_assets::AssetStore;
    use std::fs;
    use tempfile::TempDir;

    fn press(app: &mut BrowseApp, code: KeyCode) {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn app() -> (BrowseApp, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets.csv");
        fs::write(
            &path,
            "Drill,Tools,Garage,2023-05-01,Cordless drill,120,2025-05-01\n\
             Saw,Tools,Shed,No date provided,Hand saw,40,No date provided\n",
        )
        .unwrap();
        let (store, report) = AssetStore::load(path);
        (BrowseApp::new(store, &report), dir)
    }

    #[test]
    fn slash_then_text_filters() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        for c in "dri".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Table);
        assert_eq!(app.query, "dri");
        assert_eq!(app.view.len(), 1);

        // first Esc clears the filter, second quits
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view.len(), 2);
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn escape_cancels_edit_without_saving() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('!'));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, AppMode::Table);
        assert_eq!(app.store.list()[0].record.name, "Drill");
    }

    #[test]
    fn delete_key_removes_selected() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.list()[0].record.name, "Drill");
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _dir) = app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_event(&mut app, Event::Key(key));
        assert!(!app.should_quit);
    }
}
