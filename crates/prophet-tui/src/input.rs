// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState mutations (cursor movement, focus,
// edit buffers).
//
// The Player step is a text field, so plain letters are typed rather than
// treated as shortcuts there. Ctrl+R (reset) and Ctrl+P (parlay panel)
// work everywhere.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use prophet_app::protocol::UserCommand;
use prophet_core::selection::Direction;
use prophet_core::wizard::Step;

use crate::{option_count, Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// orchestrator. Returns `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release for each keystroke.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.snapshot.is_none() {
        if key_event.code == KeyCode::Char('q') {
            view_state.confirm_quit = true;
        }
        return None;
    }

    if ctrl {
        return match key_event.code {
            KeyCode::Char('r') => Some(reset(view_state)),
            KeyCode::Char('p') => Some(UserCommand::ToggleParlay),
            _ => None,
        };
    }

    if key_event.code == KeyCode::Tab {
        toggle_focus(view_state);
        return None;
    }

    match view_state.focus {
        Focus::Parlay => handle_parlay_focus(key_event, view_state),
        Focus::Wizard => handle_wizard_focus(key_event, view_state),
    }
}

/// Handle key events while in quit confirmation mode.
///
/// `y`/`q` confirm, `n`/`Esc` cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn reset(view_state: &mut ViewState) -> UserCommand {
    view_state.search_input.clear();
    view_state.line_input.clear();
    view_state.cursor = 0;
    view_state.focus = Focus::Wizard;
    UserCommand::Reset
}

/// Move focus to the parlay sidebar and back. Only possible while the
/// sidebar is open and holds at least one leg.
fn toggle_focus(view_state: &mut ViewState) {
    let has_legs = view_state
        .snapshot
        .as_ref()
        .is_some_and(|s| s.parlay.open && !s.parlay.legs.is_empty());

    view_state.focus = match view_state.focus {
        Focus::Wizard if has_legs => Focus::Parlay,
        _ => Focus::Wizard,
    };
}

// ---------------------------------------------------------------------------
// Parlay sidebar
// ---------------------------------------------------------------------------

fn handle_parlay_focus(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let legs = view_state
        .snapshot
        .as_ref()
        .map(|s| s.parlay.legs.as_slice())
        .unwrap_or_default();

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.parlay_cursor = view_state.parlay_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.parlay_cursor + 1 < legs.len() {
                view_state.parlay_cursor += 1;
            }
            None
        }
        KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => legs
            .get(view_state.parlay_cursor)
            .map(|leg| UserCommand::RemoveLeg(leg.id)),
        KeyCode::Esc => {
            view_state.focus = Focus::Wizard;
            None
        }
        code => shortcut(code, view_state),
    }
}

// ---------------------------------------------------------------------------
// Wizard panel
// ---------------------------------------------------------------------------

fn handle_wizard_focus(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let (step, loading) = match view_state.snapshot.as_ref() {
        Some(s) => (s.step, s.outcome.is_loading()),
        None => return None,
    };

    if key_event.code == KeyCode::Esc {
        return if loading {
            Some(UserCommand::CancelPrediction)
        } else {
            Some(UserCommand::GoBack)
        };
    }

    match step {
        Step::Player => handle_search(key_event, view_state),
        Step::Line => handle_line(key_event, view_state, loading),
        _ => handle_list(key_event, view_state, step),
    }
}

/// Player step: typing filters the list; Enter picks the highlighted row.
fn handle_search(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(c) => {
            view_state.search_input.push(c);
            view_state.cursor = 0;
            Some(UserCommand::UpdateSearch(view_state.search_input.clone()))
        }
        KeyCode::Backspace => {
            view_state.search_input.pop()?;
            view_state.cursor = 0;
            Some(UserCommand::UpdateSearch(view_state.search_input.clone()))
        }
        KeyCode::Up => {
            move_cursor_up(view_state);
            None
        }
        KeyCode::Down => {
            move_cursor_down(view_state);
            None
        }
        KeyCode::Enter => {
            let snapshot = view_state.snapshot.as_ref()?;
            match snapshot.player_options.get(view_state.cursor) {
                Some(player) => Some(UserCommand::SelectPlayer(player.id)),
                None if !snapshot.search.trim().is_empty() => Some(UserCommand::SubmitSearch),
                None => None,
            }
        }
        _ => None,
    }
}

/// Line step: numeric entry, Enter predicts. Edits are ignored while a
/// prediction is in flight.
fn handle_line(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    loading: bool,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
            if loading {
                return None;
            }
            view_state.line_input.push(c);
            Some(UserCommand::SetLine(view_state.line_input.clone()))
        }
        KeyCode::Backspace => {
            if loading {
                return None;
            }
            view_state.line_input.pop()?;
            Some(UserCommand::SetLine(view_state.line_input.clone()))
        }
        KeyCode::Enter => Some(UserCommand::Predict),
        code => shortcut(code, view_state),
    }
}

/// Sport, Stat, Opponent and Direction steps: pick from a list.
fn handle_list(key_event: KeyEvent, view_state: &mut ViewState, step: Step) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor_up(view_state);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor_down(view_state);
            None
        }
        KeyCode::Enter => selected_option(view_state, step),
        KeyCode::Char('o') if step == Step::Direction => {
            Some(UserCommand::SelectDirection(Direction::Over))
        }
        KeyCode::Char('u') if step == Step::Direction => {
            Some(UserCommand::SelectDirection(Direction::Under))
        }
        code => shortcut(code, view_state),
    }
}

/// Command for the highlighted row of a list step.
fn selected_option(view_state: &ViewState, step: Step) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let i = view_state.cursor;
    match step {
        Step::Sport => snapshot
            .sports
            .get(i)
            .map(|sport| UserCommand::SelectSport(sport.clone())),
        Step::Stat => snapshot
            .stat_options
            .get(i)
            .map(|stat| UserCommand::SelectStat(*stat)),
        Step::Opponent => snapshot
            .opponent_options
            .get(i)
            .map(|team| UserCommand::SelectOpponent(team.id)),
        Step::Direction => Direction::ALL
            .get(i)
            .map(|direction| UserCommand::SelectDirection(*direction)),
        Step::Player | Step::Line => None,
    }
}

/// Letter shortcuts available outside the Player text field.
fn shortcut(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char('a') => Some(UserCommand::AddLeg),
        KeyCode::Char('p') => Some(UserCommand::ToggleParlay),
        KeyCode::Char('c') => Some(UserCommand::CalculateParlay),
        KeyCode::Char('x') => Some(UserCommand::ClearParlay),
        KeyCode::Char('r') => Some(reset(view_state)),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

fn move_cursor_up(view_state: &mut ViewState) {
    view_state.cursor = view_state.cursor.saturating_sub(1);
}

fn move_cursor_down(view_state: &mut ViewState) {
    let count = view_state.snapshot.as_ref().map_or(0, option_count);
    if view_state.cursor + 1 < count {
        view_state.cursor += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{leg, snapshot};
    use crossterm::event::{KeyEventState, KeyModifiers};
    use prophet_app::protocol::AppSnapshot;
    use prophet_core::selection::StatCategory;
    use prophet_core::wizard::Outcome;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn at(step: Step) -> ViewState {
        with(snapshot(step))
    }

    fn with(snap: AppSnapshot) -> ViewState {
        ViewState {
            snapshot: Some(snap),
            ..ViewState::default()
        }
    }

    fn with_parlay(legs: usize) -> ViewState {
        let mut snap = snapshot(Step::Line);
        snap.parlay.open = true;
        snap.parlay.legs = (0..legs as i64)
            .map(|i| leg(100 + i, "LeBron James", 60.0))
            .collect();
        with(snap)
    }

    // -- Quit --

    #[test]
    fn ctrl_c_quits_immediately() {
        let mut state = at(Step::Stat);
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn ctrl_c_quits_before_first_snapshot() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn q_enters_confirm_quit_mode() {
        let mut state = at(Step::Stat);
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert!(state.confirm_quit);
    }

    #[test]
    fn confirm_quit_y_sends_quit() {
        let mut state = at(Step::Stat);
        state.confirm_quit = true;
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn confirm_quit_esc_cancels() {
        let mut state = at(Step::Stat);
        state.confirm_quit = true;
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert!(!state.confirm_quit);
    }

    #[test]
    fn confirm_quit_blocks_other_keys() {
        let mut state = at(Step::Stat);
        state.confirm_quit = true;
        for code in [KeyCode::Enter, KeyCode::Down, KeyCode::Char('a')] {
            assert!(handle_key(key(code), &mut state).is_none());
        }
        assert!(state.confirm_quit);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn q_is_typed_in_player_search() {
        let mut state = at(Step::Player);
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &mut state),
            Some(UserCommand::UpdateSearch("q".into()))
        );
        assert!(!state.confirm_quit);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = at(Step::Line);
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(handle_key(release, &mut state).is_none());
    }

    // -- List steps --

    #[test]
    fn down_then_enter_selects_second_stat() {
        let mut state = at(Step::Stat);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SelectStat(StatCategory::Rebounds))
        );
    }

    #[test]
    fn cursor_stops_at_list_end() {
        let mut state = at(Step::Opponent);
        for _ in 0..5 {
            handle_key(key(KeyCode::Char('j')), &mut state);
        }
        assert_eq!(state.cursor, 1);
        handle_key(key(KeyCode::Up), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn enter_selects_opponent_by_team_id() {
        let mut state = at(Step::Opponent);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SelectOpponent(4))
        );
    }

    #[test]
    fn enter_selects_sport() {
        let mut state = at(Step::Sport);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SelectSport("NBA".into()))
        );
    }

    #[test]
    fn direction_shortcuts() {
        let mut state = at(Step::Direction);
        assert_eq!(
            handle_key(key(KeyCode::Char('u')), &mut state),
            Some(UserCommand::SelectDirection(Direction::Under))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('o')), &mut state),
            Some(UserCommand::SelectDirection(Direction::Over))
        );
    }

    #[test]
    fn esc_goes_back() {
        let mut state = at(Step::Stat);
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            Some(UserCommand::GoBack)
        );
    }

    // -- Player search --

    #[test]
    fn typing_sends_full_search_text() {
        let mut state = at(Step::Player);
        handle_key(key(KeyCode::Char('l')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('e')), &mut state),
            Some(UserCommand::UpdateSearch("le".into()))
        );
        assert_eq!(
            handle_key(key(KeyCode::Backspace), &mut state),
            Some(UserCommand::UpdateSearch("l".into()))
        );
    }

    #[test]
    fn backspace_on_empty_search_is_noop() {
        let mut state = at(Step::Player);
        assert!(handle_key(key(KeyCode::Backspace), &mut state).is_none());
    }

    #[test]
    fn enter_picks_highlighted_player() {
        let mut state = at(Step::Player);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SelectPlayer(3))
        );
    }

    #[test]
    fn enter_on_free_text_row_submits_search() {
        let mut snap = snapshot(Step::Player);
        snap.search = "Zion".into();
        snap.player_options.clear();
        let mut state = with(snap);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SubmitSearch)
        );
    }

    #[test]
    fn enter_with_nothing_typed_and_no_matches_is_noop() {
        let mut snap = snapshot(Step::Player);
        snap.player_options.clear();
        let mut state = with(snap);
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
    }

    // -- Line entry --

    #[test]
    fn line_accepts_numeric_characters_only() {
        let mut state = at(Step::Line);
        for c in ['2', '5', '.', '5'] {
            handle_key(key(KeyCode::Char(c)), &mut state);
        }
        assert_eq!(state.line_input, "25.5");
        assert!(handle_key(key(KeyCode::Char('z')), &mut state).is_none());
        assert_eq!(state.line_input, "25.5");
    }

    #[test]
    fn enter_on_line_predicts() {
        let mut state = at(Step::Line);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Predict)
        );
    }

    #[test]
    fn line_is_locked_while_loading() {
        let mut snap = snapshot(Step::Line);
        snap.outcome = Outcome::Loading { generation: 1 };
        let mut state = with(snap);
        state.line_input = "25".into();

        assert!(handle_key(key(KeyCode::Char('1')), &mut state).is_none());
        assert!(handle_key(key(KeyCode::Backspace), &mut state).is_none());
        assert_eq!(state.line_input, "25");
    }

    #[test]
    fn esc_while_loading_cancels() {
        let mut snap = snapshot(Step::Line);
        snap.outcome = Outcome::Loading { generation: 1 };
        let mut state = with(snap);
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            Some(UserCommand::CancelPrediction)
        );
    }

    // -- Shortcuts --

    #[test]
    fn letter_shortcuts_outside_search() {
        let mut state = at(Step::Line);
        assert_eq!(handle_key(key(KeyCode::Char('a')), &mut state), Some(UserCommand::AddLeg));
        assert_eq!(
            handle_key(key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::CalculateParlay)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('x')), &mut state),
            Some(UserCommand::ClearParlay)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('p')), &mut state),
            Some(UserCommand::ToggleParlay)
        );
    }

    #[test]
    fn ctrl_r_resets_from_search_and_clears_buffers() {
        let mut state = at(Step::Player);
        state.search_input = "leb".into();
        state.line_input = "25".into();
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::Reset)
        );
        assert!(state.search_input.is_empty());
        assert!(state.line_input.is_empty());
    }

    #[test]
    fn ctrl_p_toggles_parlay_from_search() {
        let mut state = at(Step::Player);
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('p')), &mut state),
            Some(UserCommand::ToggleParlay)
        );
        assert!(state.search_input.is_empty());
    }

    // -- Parlay focus --

    #[test]
    fn tab_needs_open_parlay_with_legs() {
        let mut state = at(Step::Line);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Wizard);

        let mut state = with_parlay(2);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Parlay);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Wizard);
    }

    #[test]
    fn parlay_focus_removes_highlighted_leg() {
        let mut state = with_parlay(3);
        state.focus = Focus::Parlay;
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.parlay_cursor, 2);
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mut state),
            Some(UserCommand::RemoveLeg(102))
        );
    }

    #[test]
    fn parlay_focus_esc_returns_to_wizard() {
        let mut state = with_parlay(1);
        state.focus = Focus::Parlay;
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert_eq!(state.focus, Focus::Wizard);
    }

    #[test]
    fn parlay_focus_over_search_step_keeps_letters_as_shortcuts() {
        let mut snap = snapshot(Step::Player);
        snap.parlay.open = true;
        snap.parlay.legs = vec![leg(1, "LeBron James", 60.0), leg(2, "Ja Morant", 52.0)];
        let mut state = with(snap);
        state.focus = Focus::Parlay;

        assert_eq!(
            handle_key(key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::CalculateParlay)
        );
        assert!(state.search_input.is_empty());
    }

    #[test]
    fn keys_before_first_snapshot_are_ignored() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert!(handle_key(key(KeyCode::Char('a')), &mut state).is_none());
    }
}
