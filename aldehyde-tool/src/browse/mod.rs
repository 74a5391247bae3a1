mod app;
mod input;
mod ui;

use std::io;

use aldehyde_assets::{AssetStore, LoadReport};
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use app::BrowseApp;

use crate::error::AldError;

pub fn run(store: AssetStore, report: LoadReport) -> Result<(), AldError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = BrowseApp::new(store, &report);

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.unsaved {
        eprintln!(
            "Warning: last change was not written to {}",
            app.store.path().display()
        );
    }

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut BrowseApp,
) -> Result<(), AldError> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        let event = event::read()?;
        input::handle_event(app, event);
    }

    Ok(())
}
