// Status bar widget: roster state, step progress, parlay count, notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use prophet_app::protocol::{AppSnapshot, NoticeLevel};
use prophet_core::parlay::MAX_LEGS;

use crate::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [roster dot] [step breadcrumb] | [parlay count] | [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let spans = match state.snapshot.as_ref() {
        Some(snapshot) => status_spans(snapshot),
        None => vec![Span::styled(
            " Starting...",
            Style::default().fg(Color::Gray),
        )],
    };

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn status_spans(snapshot: &AppSnapshot) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    let (dot, dot_color) = roster_indicator(snapshot.roster_loaded);
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));

    spans.push(Span::styled(
        format!("Step {}/{} ", snapshot.step_number, snapshot.steps.len()),
        Style::default().fg(Color::White),
    ));
    spans.extend(progress_spans(snapshot));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("Parlay {}/{}", snapshot.parlay.legs.len(), MAX_LEGS),
        Style::default().fg(Color::White),
    ));

    if let Some(notice) = &snapshot.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Warn => Color::Yellow,
        };
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
    }

    spans
}

/// Green once players and teams have arrived, yellow while fetching.
pub fn roster_indicator(loaded: bool) -> (&'static str, Color) {
    if loaded {
        ("●", Color::Green)
    } else {
        ("●", Color::Yellow)
    }
}

/// One span per step: completed steps dimmed, the current one highlighted.
pub fn progress_spans(snapshot: &AppSnapshot) -> Vec<Span<'static>> {
    let current = snapshot.step_number.saturating_sub(1);
    snapshot
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let style = if i == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if i < current {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("[{}]", step.title()), style)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
