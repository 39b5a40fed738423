// Wizard panel: choices made so far, then the current step's input.
//
// List steps render as a scrollable list with the cursor row highlighted.
// The Player step adds a search field above the list, the Line step shows
// the question being asked and the line field.

use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use prophet_app::protocol::AppSnapshot;
use prophet_core::selection::{Direction, Selection};
use prophet_core::wizard::Step;

use super::focused_border_style;
use crate::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        let block = Block::default().borders(Borders::ALL).title(" Prop Bet ");
        frame.render_widget(Paragraph::new("Starting...").block(block), area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border_style(state.focus == Focus::Wizard))
        .title(Span::styled(
            format!(
                " Step {}/{}: {} ",
                snapshot.step_number,
                snapshot.steps.len(),
                prompt(snapshot.step)
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let summary = summary_lines(&snapshot.selection, snapshot.step);
    let field = input_line(snapshot, state);

    let sections = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(summary.len() as u16),
            Constraint::Length(u16::from(field.is_some())),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(summary), sections[0]);
    if let Some(field) = field {
        frame.render_widget(Paragraph::new(field), sections[1]);
    }

    let body = sections[2];
    if needs_roster(snapshot.step) && !snapshot.roster_loaded {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Loading players...",
                Style::default().fg(Color::Yellow),
            )),
            body,
        );
        return;
    }

    if snapshot.step == Step::Line {
        let question = Paragraph::new(Line::from(Span::styled(
            snapshot.question.clone(),
            Style::default().fg(Color::Cyan),
        )))
        .wrap(Wrap { trim: true });
        frame.render_widget(question, body);
        return;
    }

    let labels = option_labels(snapshot);
    if labels.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                empty_message(snapshot.step),
                Style::default().fg(Color::DarkGray),
            )),
            body,
        );
        return;
    }

    let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.cursor));
    frame.render_stateful_widget(list, body, &mut list_state);
}

fn prompt(step: Step) -> &'static str {
    match step {
        Step::Sport => "Choose a sport",
        Step::Player => "Find a player",
        Step::Stat => "Choose a stat",
        Step::Opponent => "Choose the opponent",
        Step::Direction => "Over or under?",
        Step::Line => "Set the line",
    }
}

fn needs_roster(step: Step) -> bool {
    matches!(step, Step::Player | Step::Opponent)
}

fn empty_message(step: Step) -> &'static str {
    match step {
        Step::Player => "No players available. Type a name and press Enter.",
        Step::Opponent => "No opponents available.",
        _ => "Nothing to choose.",
    }
}

/// One line per choice already made, excluding the current step's own.
pub fn summary_lines(selection: &Selection, current: Step) -> Vec<Line<'static>> {
    let mut rows: Vec<(&str, String)> = Vec::new();

    if let Some(sport) = &selection.sport {
        rows.push(("Sport", sport.clone()));
    }
    if let Some(player) = &selection.player {
        let label = match player.team_display() {
            Some(team) => format!("{} ({})", player.name(), team),
            None => player.name().to_string(),
        };
        rows.push(("Player", label));
    }
    if let Some(stat) = selection.stat {
        rows.push(("Stat", stat.label().to_string()));
    }
    if let Some(team) = &selection.opponent {
        rows.push(("Opponent", team.display_name()));
    }
    if let Some(direction) = selection.direction {
        rows.push(("Direction", direction.as_str().to_string()));
    }

    rows.into_iter()
        .filter(|(label, _)| *label != current.title())
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:>9}: "), Style::default().fg(Color::Gray)),
                Span::styled(value, Style::default().fg(Color::White)),
            ])
        })
        .collect()
}

/// The text field for steps that take typing.
fn input_line(snapshot: &AppSnapshot, state: &ViewState) -> Option<Line<'static>> {
    let (label, text) = match snapshot.step {
        Step::Player => ("Search", state.search_input.clone()),
        Step::Line => ("Line", state.line_input.clone()),
        _ => return None,
    };
    Some(Line::from(vec![
        Span::styled(format!("{label:>9}: "), Style::default().fg(Color::Gray)),
        Span::styled(text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled("_", Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK)),
    ]))
}

/// Rows of the current step's list, in the order the cursor indexes them.
pub fn option_labels(snapshot: &AppSnapshot) -> Vec<String> {
    match snapshot.step {
        Step::Sport => snapshot.sports.clone(),
        Step::Player => {
            let mut rows: Vec<String> = snapshot
                .player_options
                .iter()
                .map(|p| match p.team_display() {
                    Some(team) => format!("{} ({})", p.name, team),
                    None => p.name.clone(),
                })
                .collect();
            let typed = snapshot.search.trim();
            if !typed.is_empty() {
                rows.push(format!("Use \"{typed}\" as typed"));
            }
            rows
        }
        Step::Stat => snapshot
            .stat_options
            .iter()
            .map(|s| s.label().to_string())
            .collect(),
        Step::Opponent => snapshot
            .opponent_options
            .iter()
            .map(|t| t.display_name())
            .collect(),
        Step::Direction => Direction::ALL
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
        Step::Line => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
