// Prediction panel: the outcome of the Line step.
//
// Idle shows a hint, Loading a spinner line, Ready the probability (colour
// tiered), confidence, reasoning and market odds, Failed the error text.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use prophet_app::protocol::AppSnapshot;
use prophet_core::payload::{format_percent, OddsData, Prediction};
use prophet_core::wizard::{Outcome, Step};

use super::{confidence_color, probability_color};
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (lines, border) = match state.snapshot.as_ref() {
        Some(snapshot) => (body_lines(snapshot), border_color(&snapshot.outcome)),
        None => (Vec::new(), Color::Reset),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Prediction "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn border_color(outcome: &Outcome) -> Color {
    match outcome {
        Outcome::Idle => Color::Reset,
        Outcome::Loading { .. } => Color::Yellow,
        Outcome::Ready { prediction, .. } => probability_color(prediction.probability),
        Outcome::Failed(_) => Color::Red,
    }
}

pub fn body_lines(snapshot: &AppSnapshot) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    match &snapshot.outcome {
        Outcome::Idle if snapshot.step != Step::Line => {
            vec![Line::styled("Finish the steps above to ask for a prediction.", dim)]
        }
        Outcome::Idle if snapshot.can_predict => {
            vec![Line::styled("Press Enter to get the prediction.", dim)]
        }
        Outcome::Idle => vec![Line::styled("Type the line, e.g. 25.5", dim)],
        Outcome::Loading { .. } => vec![Line::styled(
            "Analyzing... (Esc to cancel)",
            Style::default().fg(Color::Yellow),
        )],
        Outcome::Failed(message) => vec![
            Line::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Line::styled("Press Enter to try again.", dim),
        ],
        Outcome::Ready { prediction, odds } => {
            let mut lines = prediction_lines(prediction);
            if let Some(odds) = odds {
                lines.push(Line::raw(""));
                lines.extend(odds_lines(odds));
            }
            lines.push(Line::raw(""));
            lines.push(if snapshot.in_parlay {
                Line::styled("On your parlay slip.", Style::default().fg(Color::Green))
            } else {
                Line::styled("Press a to add this to your parlay.", dim)
            });
            lines
        }
    }
}

pub fn prediction_lines(prediction: &Prediction) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format_percent(prediction.probability),
            Style::default()
                .fg(probability_color(prediction.probability))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} CONFIDENCE", prediction.confidence.label()),
            Style::default().fg(confidence_color(prediction.confidence.tier())),
        ),
    ])];

    if let Some(summary) = &prediction.summary {
        lines.push(Line::raw(""));
        lines.push(Line::raw(summary.clone()));
    }

    section(&mut lines, "Key factors", &prediction.factors, Color::Green);
    section(&mut lines, "Risks", &prediction.risks, Color::Red);

    if let Some(rec) = &prediction.recommendation {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Recommendation: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(rec.clone()),
        ]));
    }
    if let Some(alignment) = &prediction.market_alignment {
        lines.push(Line::from(vec![
            Span::styled("Market: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(alignment.clone()),
        ]));
    }
    lines
}

fn section(lines: &mut Vec<Line<'static>>, title: &str, items: &[String], bullet: Color) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for item in items {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(bullet)),
            Span::raw(item.clone()),
        ]));
    }
}

pub fn odds_lines(odds: &OddsData) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        "Market odds".to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(line) = odds.consensus_line {
        lines.push(Line::raw(format!("  Consensus line: {line}")));
    }
    if let Some(best) = &odds.best_over {
        lines.push(Line::raw(format!("  Best OVER:  {} at {}", best.odds, best.book)));
    }
    if let Some(best) = &odds.best_under {
        lines.push(Line::raw(format!("  Best UNDER: {} at {}", best.odds, best.book)));
    }
    for book in &odds.books {
        let over = book.over_odds.as_ref().map_or("-".to_string(), |o| o.to_string());
        let under = book.under_odds.as_ref().map_or("-".to_string(), |o| o.to_string());
        lines.push(Line::styled(
            format!("  {:<12} {:>5}  o {:<6} u {}", book.book, book.line, over, under),
            Style::default().fg(Color::Gray),
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
