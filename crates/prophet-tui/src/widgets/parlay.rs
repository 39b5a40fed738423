// Parlay sidebar: the legs on the slip and the combined result.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use prophet_app::protocol::ParlaySnapshot;
use prophet_core::parlay::{ParlayLeg, ParlayStatus, MAX_LEGS, MIN_LEGS};
use prophet_core::payload::format_percent;

use super::{focused_border_style, probability_color};
use crate::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        return;
    };
    let parlay = &snapshot.parlay;
    let focused = state.focus == Focus::Parlay;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border_style(focused))
        .title(format!(" Parlay ({}/{}) ", parlay.legs.len(), MAX_LEGS));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((parlay.legs.len().max(1) * 2) as u16),
            Constraint::Min(0),
        ])
        .split(inner);

    if parlay.legs.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No legs yet. Press a on a prediction.",
                Style::default().fg(Color::DarkGray),
            )),
            sections[0],
        );
    } else {
        let items: Vec<ListItem> = parlay
            .legs
            .iter()
            .map(|leg| ListItem::new(leg_lines(leg)))
            .collect();
        let mut list = List::new(items);
        let mut list_state = ListState::default();
        if focused {
            list = list
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("> ");
            list_state.select(Some(state.parlay_cursor));
        }
        frame.render_stateful_widget(list, sections[0], &mut list_state);
    }

    frame.render_widget(
        Paragraph::new(status_lines(parlay)).wrap(Wrap { trim: false }),
        sections[1],
    );
}

/// Two rows per leg: who and what, then the line and probability.
fn leg_lines(leg: &ParlayLeg) -> Vec<Line<'static>> {
    let mut detail = format!("  {} {} ", leg.direction.as_str(), leg.line);
    if let Some(opponent) = &leg.opponent {
        detail.push_str(&format!("vs {} ", opponent));
    }
    vec![
        Line::from(vec![
            Span::styled(leg.player.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {}", leg.stat.label())),
        ]),
        Line::from(vec![
            Span::raw(detail),
            Span::styled(
                format_percent(leg.probability),
                Style::default().fg(probability_color(leg.probability)),
            ),
        ]),
    ]
}

pub fn status_lines(parlay: &ParlaySnapshot) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::raw("")];

    match &parlay.status {
        ParlayStatus::Idle if parlay.can_calculate => {
            lines.push(Line::styled("Press c to calculate.", dim));
        }
        ParlayStatus::Idle => {
            let needed = MIN_LEGS.saturating_sub(parlay.legs.len());
            if needed > 0 {
                lines.push(Line::styled(
                    format!("Add {needed} more leg(s) to calculate."),
                    dim,
                ));
            }
        }
        ParlayStatus::Loading { .. } => {
            lines.push(Line::styled(
                "Calculating...",
                Style::default().fg(Color::Yellow),
            ));
        }
        ParlayStatus::Failed(message) => {
            lines.push(Line::styled(message.clone(), Style::default().fg(Color::Red)));
        }
        ParlayStatus::Ready(result) => {
            lines.push(Line::from(vec![
                Span::raw("Combined: "),
                Span::styled(
                    format_percent(result.combined_probability),
                    Style::default()
                        .fg(probability_color(result.combined_probability))
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::raw(format!("Implied odds: {}", result.implied_odds)));
            if let Some(warning) = &result.correlation_warning {
                lines.push(Line::styled(
                    format!("! {warning}"),
                    Style::default().fg(Color::Yellow),
                ));
            }
            if let Some(analysis) = &result.analysis {
                lines.push(Line::raw(""));
                lines.push(Line::raw(analysis.clone()));
            }
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
