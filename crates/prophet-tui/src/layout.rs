// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Wizard (40%)             |                        |
// +-------------------------+ Parlay Sidebar (35%)   |
// | Prediction Result (60%)  | (only while open)      |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// With the parlay sidebar collapsed, the wizard and result panels take the
// full width.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: step progress, roster state, notices.
    pub status_bar: Rect,
    /// Selections so far and the current step's input.
    pub wizard: Rect,
    /// Prediction outcome for the Line step.
    pub result: Rect,
    /// Parlay slip, present only when the sidebar is open.
    pub parlay: Option<Rect>,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect, show_parlay: bool) -> AppLayout {
    // Vertical: status(1) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    let (main, parlay) = if show_parlay {
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(middle);
        (horizontal[0], Some(horizontal[1]))
    } else {
        (middle, None)
    };

    let main_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main);

    AppLayout {
        status_bar,
        wizard: main_sections[0],
        result: main_sections[1],
        parlay,
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
