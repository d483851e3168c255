pub mod charting;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    games::{
        dots::{FIELD_HEIGHT, FIELD_WIDTH},
        GameId,
    },
    round::Outcome,
    session::{Feedback, Phase},
    stimulus::Stimulus,
    time_series::split_series,
    ui::charting::{compute_chart_params, format_label, hint_color},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Cells per row in the number grid
const GRID_COLUMNS: usize = 4;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Results => render_results(self, area, buf),
            AppState::Playing | AppState::History => render_playing(self, area, buf),
        }
    }
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1),
            Constraint::Min(3), // stimulus
            Constraint::Length(1), // feedback
            Constraint::Length(1), // notice
            Constraint::Length(1), // controls
        ])
        .split(area);

    Paragraph::new(Span::styled(header_text(app), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let stage = stimulus_lines(app);
    let top_pad = chunks[2].height.saturating_sub(stage.len() as u16) / 2;
    let stage_area = Rect {
        y: chunks[2].y + top_pad,
        height: chunks[2].height - top_pad,
        ..chunks[2]
    };
    Paragraph::new(stage)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .render(stage_area, buf);

    if let Some(fb) = app.session.state().last_feedback {
        Paragraph::new(Span::styled(feedback_text(&fb), outcome_style(fb.outcome)))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    let controls = format!("{} / (esc)ape", app.game.info().controls);
    Paragraph::new(Span::styled(controls, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

fn header_text(app: &App) -> String {
    let info = app.game.info();
    let state = app.session.state();
    let config = app.session.config();
    let round = (state.rounds_played + u32::from(state.current.is_some())).max(1);

    let mut parts = vec![info.name.to_string()];
    parts.push(match config.max_rounds {
        Some(max) => format!("round {round}/{max}"),
        None => format!("round {round}"),
    });
    parts.push(format!("score {}", state.score));
    if let Some(limit) = config.miss_limit {
        parts.push(format!("misses {}/{limit}", state.misses));
    }
    if let Some(secs) = app.session.seconds_remaining(app.now) {
        parts.push(format!("{secs:.1}s"));
    }
    parts.join("   ")
}

fn feedback_text(fb: &Feedback) -> String {
    let verdict = match fb.outcome {
        Outcome::Correct => "Correct",
        Outcome::Incorrect => "Wrong",
        Outcome::TooEarly => "Too early!",
        Outcome::Timeout => "Too slow",
    };
    match fb.reaction_ms {
        Some(ms) => format!("{verdict}  {:+}  ({ms} ms)", fb.delta),
        None => format!("{verdict}  {:+}", fb.delta),
    }
}

fn outcome_style(outcome: Outcome) -> Style {
    let color = match outcome {
        Outcome::Correct => Color::Green,
        Outcome::Incorrect => Color::Red,
        Outcome::TooEarly => Color::Magenta,
        Outcome::Timeout => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn stimulus_lines(app: &App) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    match app.session.phase() {
        Phase::Idle => vec![Line::from("press any key")],
        Phase::Ended => vec![Line::from(Span::styled("done", bold_style))],
        Phase::Resolving => vec![Line::from(Span::styled(
            "next round...",
            bold_style.add_modifier(Modifier::DIM),
        ))],
        Phase::AwaitingStimulus if app.game == GameId::Reaction => block_lines(
            "wait for green...",
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Phase::AwaitingStimulus => vec![Line::from(Span::styled(
            "get ready",
            bold_style.add_modifier(Modifier::DIM),
        ))],
        Phase::Active => match app.session.current_round() {
            Some(round) => {
                let mut lines = render_stimulus(&round.stimulus, &app.answer);
                if let Some(expires_at) = round.expires_at() {
                    let window = round.window_ms.unwrap_or(1).max(1);
                    let left = expires_at.saturating_sub(app.now).min(window);
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        time_bar(left, window, 30),
                        Style::default().fg(Color::Cyan),
                    )));
                }
                lines
            }
            None => Vec::new(),
        },
    }
}

/// A solid coloured panel with a centred caption
fn block_lines(caption: &str, style: Style) -> Vec<Line<'static>> {
    let width = caption.width() + 8;
    let blank = " ".repeat(width);
    let pad = (width - caption.width()) / 2;
    let text = format!(
        "{}{caption}{}",
        " ".repeat(pad),
        " ".repeat(width - pad - caption.width())
    );
    vec![
        Line::from(Span::styled(blank.clone(), style)),
        Line::from(Span::styled(text, style.add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(blank, style)),
    ]
}

fn time_bar(left: u64, window: u64, width: usize) -> String {
    let filled = (left as usize * width).div_ceil(window as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_stimulus(stimulus: &Stimulus, answer: &str) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    match stimulus {
        Stimulus::Signal => block_lines("TAP!", Style::default().fg(Color::Black).bg(Color::Green)),
        Stimulus::Numbers { values, .. } => values
            .chunks(GRID_COLUMNS)
            .enumerate()
            .map(|(row, cells)| {
                let spans = cells
                    .iter()
                    .enumerate()
                    .flat_map(|(col, value)| {
                        let idx = row * GRID_COLUMNS + col;
                        [
                            Span::styled(
                                format!("[{}]", cell_key(idx)),
                                Style::default().add_modifier(Modifier::DIM),
                            ),
                            Span::styled(format!("{value:>4}   "), bold_style),
                        ]
                    })
                    .collect::<Vec<_>>();
                Line::from(spans)
            })
            .collect(),
        Stimulus::Dots { positions } => {
            let mut field =
                vec![vec!['·'; FIELD_WIDTH as usize]; FIELD_HEIGHT as usize];
            for &(x, y) in positions {
                if let Some(cell) = field
                    .get_mut(y as usize)
                    .and_then(|row| row.get_mut(x as usize))
                {
                    *cell = '●';
                }
            }
            let mut lines: Vec<Line<'static>> = field
                .into_iter()
                .map(|row| {
                    let text: String = row.iter().flat_map(|c| [*c, ' ']).collect();
                    Line::from(Span::styled(text, Style::default().fg(Color::Cyan)))
                })
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("how many? {answer}_"),
                bold_style,
            )));
            lines
        }
        Stimulus::Arrow(direction) => vec![Line::from(Span::styled(
            direction.glyph().to_string(),
            bold_style.fg(Color::Yellow),
        ))],
        Stimulus::Ball { lane, lanes } => {
            let ball: String = (0..*lanes)
                .map(|i| if i == *lane { "  ●  " } else { "     " })
                .collect();
            let labels: String = (0..*lanes).map(|i| format!("  {}  ", i + 1)).collect();
            vec![
                Line::from(Span::styled(ball, bold_style.fg(Color::Yellow))),
                Line::from(Span::styled(
                    "─".repeat(lanes * 5),
                    Style::default().add_modifier(Modifier::DIM),
                )),
                Line::from(Span::styled(labels, Style::default().add_modifier(Modifier::DIM))),
            ]
        }
    }
}

/// Key that picks grid cell `idx`: 1-9 then a-g
fn cell_key(idx: usize) -> char {
    match idx {
        0..=8 => char::from(b'1' + idx as u8),
        9..=15 => char::from(b'a' + (idx - 9) as u8),
        _ => '?',
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // rating
            Constraint::Length(1), // personal bests
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let Some(result) = app.session.result() else {
        Paragraph::new("no result")
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        return;
    };

    let (correct, incorrect) = split_series(&result.samples);
    let (overall_rounds, slowest_ms) =
        compute_chart_params(&[&correct, &incorrect], result.rounds_played);
    let datasets = vec![
        Dataset::default()
            .name("correct")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Green))
            .graph_type(GraphType::Line)
            .data(&correct),
        Dataset::default()
            .name("wrong")
            .marker(ratatui::symbols::Marker::Dot)
            .style(Style::default().fg(Color::Red))
            .graph_type(GraphType::Scatter)
            .data(&incorrect),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::NONE).title(Span::styled(
            app.game.info().name,
            bold_style,
        )))
        .x_axis(
            Axis::default()
                .title("round")
                .bounds([1.0, overall_rounds])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(format_label(overall_rounds), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds([0.0, slowest_ms])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(slowest_ms), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let summary = &result.summary;
    let ms = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"));
    let stats = format!(
        "score {}   avg {}±{} ms   median {} ms   best {} ms   acc {}%   {} rounds in {:.1}s",
        result.score,
        ms(summary.mean_ms),
        ms(summary.std_dev_ms),
        ms(summary.median_ms),
        summary
            .best_ms
            .map_or_else(|| "-".to_string(), |v| v.to_string()),
        result
            .accuracy()
            .map_or_else(|| "-".to_string(), |a| format!("{a:.0}")),
        result.rounds_played,
        result.elapsed_ms as f64 / 1000.0,
    );
    Paragraph::new(Span::styled(stats, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Line::from(vec![
        Span::raw(format!("{} · ", result.ended_by)),
        Span::styled(
            result.rating.label(),
            bold_style.fg(hint_color(result.rating.color_hint())),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let bests = format!(
        "best score {}   best time {}",
        app.best_score
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
        app.best_time
            .map_or_else(|| "-".to_string(), |t| format!("{:.1}s", t as f64 / 1000.0)),
    );
    Paragraph::new(Span::styled(
        bests,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew game / (h)istory / (esc)ape",
        italic_style,
    ))
    .render(chunks[5], buf);
}
