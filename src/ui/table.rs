use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Row, Table};

use crate::i18n;
use crate::model::{PingResult, format_rtt_ms, format_timestamp};
use crate::snapshot::Snapshot;
use crate::ui::draw_status_section;

/// Text cells for one table body, one `[host, ip, rtt, timestamp]` entry
/// per result, in collection order. Pure so the rendering contract can be
/// tested without a terminal.
pub fn result_cells(results: &[PingResult], lang: &str) -> Vec<[String; 4]> {
    results
        .iter()
        .map(|result| {
            let rtt = if result.success {
                format_rtt_ms(result.rtt)
            } else {
                i18n::t(lang, "rtt-timeout")
            };
            [
                result.host_name.clone(),
                result.ip.clone(),
                rtt,
                format_timestamp(&result.time),
            ]
        })
        .collect()
}

pub fn draw_table_view(f: &mut Frame, snapshot: &Snapshot, url: &str, lang: &str, area: Rect) {
    let header_style = Style::default().add_modifier(Modifier::BOLD);

    let header = Row::new(vec![
        i18n::t(lang, "label-host"),
        i18n::t(lang, "label-ip"),
        i18n::t(lang, "label-rtt"),
        i18n::t(lang, "label-timestamp"),
    ])
    .style(header_style)
    .height(1);

    // rows stay in collection order, failed hosts are painted red
    let rows = snapshot
        .results
        .iter()
        .zip(result_cells(&snapshot.results, lang))
        .map(|(result, cells)| {
            let row = Row::new(cells.to_vec()).height(1);
            if result.success {
                row
            } else {
                row.style(Style::default().bg(Color::Red).fg(Color::White))
            }
        });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(Block::default().title(i18n::t(lang, "table-title")));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    // blank line
    let blank = Paragraph::new("");
    f.render_widget(blank, chunks[0]);
    f.render_widget(table, chunks[1]);

    draw_status_section(f, snapshot, url, lang, chunks[2]);
}
