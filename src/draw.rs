use std::io::{self, Stdout};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::snapshot::{Snapshot, SnapshotStore};
use crate::ui::draw_table_view;

/// init terminal
pub fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// restore terminal and show cursor
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.show_cursor()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

/// Draw the dashboard once from the given snapshot.
pub fn draw_interface<B: Backend>(
    terminal: &mut Terminal<B>,
    snapshot: &Snapshot,
    url: &str,
    lang: &str,
) -> Result<()> {
    terminal.draw(|f| {
        let area = f.area();
        draw_table_view(f, snapshot, url, lang, area);
    })?;
    Ok(())
}

/// Watch-mode event loop. Redraws whenever the poller nudges the wakeup
/// channel, keeps keyboard handling on a 50ms cadence, and returns when
/// the user quits or `running` is cleared.
pub fn draw_interface_with_updates<B: Backend>(
    terminal: &mut Terminal<B>,
    store: &SnapshotStore,
    wakeup_rx: Receiver<()>,
    running: Arc<Mutex<bool>>,
    url: &str,
    lang: &str,
) -> Result<()> {
    draw_interface(terminal, &store.current(), url, lang)?;

    loop {
        if !*running.lock().unwrap() {
            break Ok(());
        }

        // Check for keyboard events
        if let Ok(true) = event::poll(Duration::from_millis(50)) {
            if let Ok(Event::Key(key)) = event::read() {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *running.lock().unwrap() = false;
                        break Ok(());
                    }
                    KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                        *running.lock().unwrap() = false;
                        break Ok(());
                    }
                    _ => {}
                }
            }
        }

        match wakeup_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(()) => draw_interface(terminal, &store.current(), url, lang)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break Ok(()),
        }
    }
}
