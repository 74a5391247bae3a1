use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{AppMode, BrowseApp, EditTarget, Form};
use crate::draft::Field;

const LABEL_WIDTH: u16 = 16;

pub fn render(frame: &mut Frame, app: &mut BrowseApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Assets
            Constraint::Length(1), // Search
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_search(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if let Some(form) = &app.form {
        render_form(frame, form);
    }
}

fn render_header(frame: &mut Frame, app: &BrowseApp, area: Rect) {
    let read_only = if app.store.is_read_only() { "  (read-only)" } else { "" };
    let title = format!(
        "ald - {}  [{} of {}]{}",
        app.store.path().display(),
        app.view.len(),
        app.store.len(),
        read_only
    );

    let header = Paragraph::new(title).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(header, area);
}

fn date_cell(date: Option<NaiveDate>) -> Cell<'static> {
    match date {
        Some(d) => Cell::from(d.to_string()),
        None => Cell::from("-").style(Style::default().fg(Color::DarkGray)),
    }
}

fn render_table(frame: &mut Frame, app: &mut BrowseApp, area: Rect) {
    let header = Row::new(["Name", "Category", "Location", "Purchased", "Value", "Warranty", "Description"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .view
        .iter()
        .filter_map(|id| app.store.get(*id))
        .map(|asset| {
            let r = &asset.record;
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(r.category.clone()),
                Cell::from(r.location.clone()),
                date_cell(r.purchase_date),
                Cell::from(r.purchase_value.clone()),
                date_cell(r.warranty_expiration_date),
                Cell::from(r.description.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(12),
        Constraint::Percentage(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(10),
    ];

    let title = if app.query.is_empty() {
        "Assets".to_string()
    } else {
        format!("Assets matching \"{}\"", app.query)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_search(frame: &mut Frame, app: &BrowseApp, area: Rect) {
    if app.mode != AppMode::Search && app.query.is_empty() {
        return;
    }

    let line = Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(app.query.as_str()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if app.mode == AppMode::Search {
        let cursor_x = area.x + 1 + app.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, area.y));
    }
}

fn render_status_bar(frame: &mut Frame, app: &BrowseApp, area: Rect) {
    let (text, style) = if let Some(ref error) = app.last_error {
        let hint = if app.unsaved { "  r: Retry save" } else { "" };
        (format!("Error: {}{}", error, hint), Style::default().fg(Color::Red))
    } else if let Some(ref status) = app.status {
        (status.clone(), Style::default().fg(Color::Green))
    } else {
        let keys = match app.mode {
            AppMode::Table => "/: Search  e: Edit  a: Add  d: Delete  q: Quit",
            AppMode::Search => "Enter: Keep filter  Esc: Clear",
            AppMode::Edit => "Tab/↑/↓: Field  Enter: Save  Esc: Cancel",
        };
        (keys.to_string(), Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_form(frame: &mut Frame, form: &Form) {
    let area = centered_rect(60, 60, frame.area());

    frame.render_widget(Clear, area);

    let title = match form.target {
        EditTarget::Existing(id) => format!("Edit asset {}", id),
        EditTarget::New => "New asset".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let label_style = if i == form.focus {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH as usize);
            let value = form.draft.get(*field);
            let value = if value.is_empty() && field.is_date() {
                Span::styled("YYYY-MM-DD", Style::default().fg(Color::DarkGray))
            } else {
                Span::raw(value)
            };
            Line::from(vec![Span::styled(label, label_style), value])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);

    let value = form.draft.get(form.focused());
    let column = value[..form.cursor].chars().count() as u16;
    let cursor_x = inner.x + LABEL_WIDTH + column;
    let cursor_y = inner.y + form.focus as u16;
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
