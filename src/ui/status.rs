use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Line, Style};
use ratatui::widgets::Paragraph;

use crate::i18n;
use crate::model::format_timestamp;
use crate::snapshot::Snapshot;

/// Bottom status area: poll health first, quit hint last. Poll failures
/// never clear the table, they only surface here while the last good
/// snapshot stays on screen.
pub fn draw_status_section(f: &mut Frame, snapshot: &Snapshot, url: &str, lang: &str, area: Rect) {
    let mut lines = Vec::new();

    if let Some(fetched_at) = &snapshot.fetched_at {
        let time = format_timestamp(fetched_at);
        if snapshot.is_stale() {
            lines.push(Line::styled(
                i18n::t_with_args(lang, "status-stale", &[("time", time)]),
                Style::default().fg(Color::Yellow),
            ));
        } else {
            lines.push(Line::styled(
                i18n::t_with_args(lang, "status-last-update", &[("time", time)]),
                Style::default().fg(Color::Green),
            ));
        }
    } else if snapshot.last_error.is_none() {
        lines.push(Line::styled(
            i18n::t_with_args(lang, "status-waiting", &[("url", url.to_string())]),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(error) = &snapshot.last_error {
        lines.push(Line::styled(
            i18n::t_with_args(lang, "status-error", &[("error", error.clone())]),
            Style::default().fg(Color::Red),
        ));
    }

    lines.push(Line::styled(
        i18n::t(lang, "hint-quit"),
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(lines), area);
}
