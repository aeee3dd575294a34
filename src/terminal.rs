use std::io::Stdout;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::draw;

/// Owns the live terminal and restores the screen on drop, so an error
/// or panic in the UI loop cannot leave the shell in raw mode.
pub struct TerminalGuard {
    pub terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
}

impl TerminalGuard {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            let _ = draw::restore_terminal(&mut terminal);
        }
    }
}
