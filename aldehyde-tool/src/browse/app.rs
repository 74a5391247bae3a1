use aldehyde_assets::{AssetId, AssetStore, LoadReport, StoreError};
use ratatui::widgets::TableState;

use crate::draft::{Draft, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Table,
    Search,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Existing(AssetId),
    New,
}

/// The record editor popup.
pub struct Form {
    pub target: EditTarget,
    pub draft: Draft,
    pub focus: usize,
    /// Byte offset into the focused field.
    pub cursor: usize,
}

impl Form {
    fn new(target: EditTarget, draft: Draft) -> Self {
        let cursor = draft.get(Field::ALL[0]).len();
        Self {
            target,
            draft,
            focus: 0,
            cursor,
        }
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn value(&self) -> &str {
        self.draft.get(self.focused())
    }

    fn value_mut(&mut self) -> &mut String {
        let field = self.focused();
        self.draft.get_mut(field)
    }

    fn move_focus(&mut self, focus: usize) {
        self.focus = focus % Field::ALL.len();
        self.cursor = self.value().len();
    }
}

pub struct BrowseApp {
    pub mode: AppMode,
    pub should_quit: bool,
    pub store: AssetStore,
    /// Search text; the view shows only names containing it.
    pub query: String,
    /// Ids of the displayed rows. A projection of the store, never the target of a change.
    pub view: Vec<AssetId>,
    pub table_state: TableState,
    pub form: Option<Form>,
    pub status: Option<String>,
    pub last_error: Option<String>,
    /// The last change is in memory only; `r` retries the write.
    pub unsaved: bool,
}

impl BrowseApp {
    pub fn new(store: AssetStore, report: &LoadReport) -> Self {
        let mut status = format!("Loaded {} assets", report.loaded);
        if !report.skipped.is_empty() {
            status.push_str(&format!(", skipped {} unreadable lines", report.skipped.len()));
        }
        if !report.degraded.is_empty() {
            status.push_str(&format!(", {} dates not understood", report.degraded.len()));
        }

        let mut app = Self {
            mode: AppMode::Table,
            should_quit: false,
            store,
            query: String::new(),
            view: Vec::new(),
            table_state: TableState::default(),
            form: None,
            status: Some(status),
            last_error: report.unavailable.as_ref().map(|e| e.to_string()),
            unsaved: false,
        };
        app.refresh_view(None);
        app
    }

    /// Recomputes the view from the store, keeping `keep` selected when visible.
    fn refresh_view(&mut self, keep: Option<AssetId>) {
        let previous = self.table_state.selected();
        self.view = self.store.search(&self.query).iter().map(|a| a.id).collect();

        let selected = match keep.and_then(|id| self.view.iter().position(|v| *v == id)) {
            Some(index) => Some(index),
            None if self.view.is_empty() => None,
            None => Some(previous.unwrap_or(0).min(self.view.len() - 1)),
        };
        self.table_state.select(selected);
    }

    pub fn selected_id(&self) -> Option<AssetId> {
        self.table_state
            .selected()
            .and_then(|index| self.view.get(index).copied())
    }

    pub fn select_next(&mut self) {
        if let Some(index) = self.table_state.selected() {
            if index + 1 < self.view.len() {
                self.table_state.select(Some(index + 1));
            }
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(index) = self.table_state.selected() {
            self.table_state.select(Some(index.saturating_sub(1)));
        }
    }

    pub fn select_first(&mut self) {
        if !self.view.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.view.is_empty() {
            self.table_state.select(Some(self.view.len() - 1));
        }
    }

    fn clear_messages(&mut self) {
        self.status = None;
        self.last_error = None;
    }

    fn report(&mut self, err: StoreError) {
        if err.is_storage() {
            self.unsaved = true;
        }
        self.last_error = Some(err.to_string());
    }

    pub fn start_search(&mut self) {
        self.clear_messages();
        self.mode = AppMode::Search;
    }

    pub fn search_char(&mut self, c: char) {
        let keep = self.selected_id();
        self.query.push(c);
        self.refresh_view(keep);
    }

    pub fn search_backspace(&mut self) {
        let keep = self.selected_id();
        self.query.pop();
        self.refresh_view(keep);
    }

    /// Leaves search input; the filter stays applied.
    pub fn finish_search(&mut self) {
        self.mode = AppMode::Table;
        self.status = Some(format!("{} matching \"{}\"", self.view.len(), self.query));
    }

    pub fn clear_search(&mut self) {
        let keep = self.selected_id();
        self.query.clear();
        self.mode = AppMode::Table;
        self.refresh_view(keep);
    }

    pub fn delete_selected(&mut self) {
        self.clear_messages();
        let Some(id) = self.selected_id() else {
            self.report(StoreError::SelectionRequired);
            return;
        };

        match self.store.delete(id) {
            Ok(asset) => {
                self.unsaved = false;
                self.status = Some(format!("Deleted {}", asset.record.name));
            }
            Err(e) => self.report(e),
        }
        self.refresh_view(None);
    }

    pub fn edit_selected(&mut self) {
        self.clear_messages();
        let Some(asset) = self.selected_id().and_then(|id| self.store.get(id)) else {
            self.report(StoreError::SelectionRequired);
            return;
        };

        let form = Form::new(EditTarget::Existing(asset.id), Draft::from_record(&asset.record));
        self.form = Some(form);
        self.mode = AppMode::Edit;
    }

    pub fn add_new(&mut self) {
        self.clear_messages();
        self.form = Some(Form::new(EditTarget::New, Draft::default()));
        self.mode = AppMode::Edit;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.mode = AppMode::Table;
    }

    /// Writes the form back to the store. Invalid input keeps the form open.
    pub fn commit_form(&mut self) {
        let Some(form) = &self.form else {
            return;
        };
        let record = match form.draft.to_record() {
            Ok(record) => record,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };
        let target = form.target;
        self.form = None;
        self.mode = AppMode::Table;
        self.clear_messages();

        let result = match target {
            EditTarget::Existing(id) => match self.store.position(id) {
                Some(index) => {
                    let name = record.name.clone();
                    self.store.update(index, record).map(|()| (id, name))
                }
                None => Err(StoreError::SelectionRequired),
            },
            EditTarget::New => {
                let name = record.name.clone();
                self.store.append(record).map(|id| (id, name))
            }
        };

        match result {
            Ok((id, name)) => {
                self.unsaved = false;
                self.status = Some(format!("Saved {}", name));
                self.refresh_view(Some(id));
            }
            Err(e) => {
                self.report(e);
                self.refresh_view(None);
            }
        }
    }

    pub fn retry_save(&mut self) {
        self.clear_messages();
        match self.store.save() {
            Ok(()) => {
                self.unsaved = false;
                self.status = Some(format!("Wrote {}", self.store.path().display()));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn focus_next(&mut self) {
        if let Some(form) = &mut self.form {
            form.move_focus(form.focus + 1);
        }
    }

    pub fn focus_previous(&mut self) {
        if let Some(form) = &mut self.form {
            form.move_focus(form.focus + Field::ALL.len() - 1);
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(form) = &mut self.form {
            let cursor = form.cursor;
            form.value_mut().insert(cursor, c);
            form.cursor += c.len_utf8();
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(form) = &mut self.form {
            if form.cursor > 0 {
                let prev = previous_boundary(form.value(), form.cursor);
                form.value_mut().remove(prev);
                form.cursor = prev;
            }
        }
    }

    pub fn input_delete(&mut self) {
        if let Some(form) = &mut self.form {
            let cursor = form.cursor;
            if cursor < form.value().len() {
                form.value_mut().remove(cursor);
            }
        }
    }

    pub fn input_left(&mut self) {
        if let Some(form) = &mut self.form {
            form.cursor = previous_boundary(form.value(), form.cursor);
        }
    }

    pub fn input_right(&mut self) {
        if let Some(form) = &mut self.form {
            let value = form.value();
            if form.cursor < value.len() {
                form.cursor = value[form.cursor..]
                    .char_indices()
                    .nth(1)
                    .map(|(i, _)| form.cursor + i)
                    .unwrap_or(value.len());
            }
        }
    }

    pub fn input_home(&mut self) {
        if let Some(form) = &mut self.form {
            form.cursor = 0;
        }
    }

    pub fn input_end(&mut self) {
        if let Some(form) = &mut self.form {
            form.cursor = form.value().len();
        }
    }
}

fn previous_boundary(s: &str, cursor: usize) -> usize {
    s[..cursor]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}
