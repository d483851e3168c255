use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::{app::App, stats::ScoreRecord};

const HEADERS: [&str; 6] = ["When", "Game", "Score", "Time", "Avg", "Rating"];

/// "3 minutes ago" style label relative to `now`
pub fn format_ago(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let age = (now - timestamp).to_std().unwrap_or_default();
    if age.as_secs() < 1 {
        return "just now".to_string();
    }
    HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Table cells for one stored session
pub fn present_record(rec: &ScoreRecord, now: DateTime<Local>) -> [String; 6] {
    [
        format_ago(rec.timestamp, now),
        rec.game_id.clone(),
        rec.score.to_string(),
        format!("{:.1}s", rec.time_ms as f64 / 1000.0),
        rec.avg_reaction_ms
            .map(|ms| format!("{ms:.0} ms"))
            .unwrap_or_else(|| "-".to_string()),
        rec.rating.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

/// Plain-text history for non-interactive output, columns padded by display width
pub fn history_lines(records: &[ScoreRecord], now: DateTime<Local>) -> Vec<String> {
    let rows: Vec<[String; 6]> = records.iter().map(|r| present_record(r, now)).collect();
    let mut widths = HEADERS.map(|h| h.width());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let header = HEADERS.map(|h| h.to_string());
    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, w)| format!("{cell}{}", " ".repeat(w - cell.width())))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Render the recent-sessions screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(format!("Recent sessions ({})", app.history.len()))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if app.history.is_empty() {
        let empty = Paragraph::new("No finished sessions yet. Play a game to see it here.")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let now = Local::now();
        let rows = app.history.iter().map(|rec| {
            let cells = present_record(rec, now);
            Row::new(cells.into_iter().enumerate().map(|(i, text)| {
                let style = if i == 2 {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Cell::from(text).style(style)
            }))
        });
        let header = Row::new(HEADERS).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(16),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(b)ack / (r)etry / (n)ew game / (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}
