// Help bar widget: key hints for the current step and focus.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use prophet_core::wizard::Step;

use crate::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        hint_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Key hints for whatever currently has focus.
pub fn hint_text(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        return " y:Quit | n:Cancel";
    }
    let Some(snapshot) = state.snapshot.as_ref() else {
        return " q:Quit";
    };
    if state.focus == Focus::Parlay {
        return " ↑↓:Leg | d:Remove | c:Calculate | x:Clear | Tab/Esc:Back";
    }
    match snapshot.step {
        Step::Player => " type:Search | ↑↓:Move | Enter:Select | Esc:Back | Ctrl+R:Reset | Ctrl+P:Parlay",
        Step::Line if snapshot.outcome.is_loading() => " Esc:Cancel | q:Quit",
        Step::Line => " 0-9.:Line | Enter:Predict | a:Add leg | p:Parlay | c:Calculate | Esc:Back | r:Reset | q:Quit",
        Step::Direction => " o:Over | u:Under | Enter:Select | Esc:Back | r:Reset | p:Parlay | q:Quit",
        Step::Sport | Step::Stat | Step::Opponent => {
            " ↑↓:Move | Enter:Select | Esc:Back | r:Reset | p:Parlay | Tab:Focus parlay | q:Quit"
        }
    }
}
