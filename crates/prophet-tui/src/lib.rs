// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the orchestrator's latest
// `AppSnapshot` plus purely local concerns (cursor, edit buffers, focus).
// Snapshots arrive over an mpsc channel; the TUI re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use prophet_app::protocol::{AppSnapshot, UiUpdate, UserCommand};
use prophet_core::selection::Direction;
use prophet_core::wizard::Step;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Wizard,
    Parlay,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Everything the render pass reads.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Latest snapshot from the orchestrator. `None` until the first push.
    pub snapshot: Option<AppSnapshot>,
    /// Highlighted row in the current step's option list.
    pub cursor: usize,
    /// Highlighted leg in the parlay sidebar.
    pub parlay_cursor: usize,
    pub focus: Focus,
    /// Player search text as typed. Kept locally so fast typing is not
    /// clobbered by snapshots that lag a keystroke behind.
    pub search_input: String,
    /// Line text as typed.
    pub line_input: String,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn step(&self) -> Option<Step> {
        self.snapshot.as_ref().map(|s| s.step)
    }

    pub fn parlay_open(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.parlay.open)
    }
}

/// Number of selectable rows on the current step.
///
/// The Player step lists the matching players and, when something has been
/// typed, one extra row that submits the text as a free-form name.
pub fn option_count(snapshot: &AppSnapshot) -> usize {
    match snapshot.step {
        Step::Sport => snapshot.sports.len(),
        Step::Player => {
            let free_text = usize::from(!snapshot.search.trim().is_empty());
            snapshot.player_options.len() + free_text
        }
        Step::Stat => snapshot.stat_options.len(),
        Step::Opponent => snapshot.opponent_options.len(),
        Step::Direction => Direction::ALL.len(),
        Step::Line => 0,
    }
}

/// Apply an update from the orchestrator to the view state.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            let snapshot = *snapshot;
            let step_changed = state.step() != Some(snapshot.step);

            if step_changed {
                state.cursor = 0;
                state.search_input = snapshot.search.clone();
                state.line_input = snapshot.selection.line.clone();
            }

            let count = option_count(&snapshot);
            state.cursor = state.cursor.min(count.saturating_sub(1));

            let legs = snapshot.parlay.legs.len();
            state.parlay_cursor = state.parlay_cursor.min(legs.saturating_sub(1));
            if !snapshot.parlay.open || legs == 0 {
                state.focus = Focus::Wizard;
            }

            state.snapshot = Some(snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the full frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.parlay_open());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::wizard::render(frame, layout.wizard, state);
    widgets::prediction::render(frame, layout.result, state);
    if let Some(area) = layout.parlay {
        widgets::parlay::render(frame, area, state);
    }
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area(), state);
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the orchestrator hangs up.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Orchestrator is gone.
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use prophet_app::protocol::{AppSnapshot, ParlaySnapshot};
    use prophet_core::parlay::{ParlayLeg, ParlayStatus};
    use prophet_core::payload::{BookPrice, Confidence, OddsData, OddsValue, Prediction};
    use prophet_core::roster::{Player, Team};
    use prophet_core::selection::{Direction, PlayerPick, Selection, StatCategory};
    use prophet_core::wizard::{Outcome, Step};

    pub fn player(id: i64, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            team_id: Some(1),
            team_city: Some("Los Angeles".into()),
            team_name: Some("Lakers".into()),
            team_abbrev: Some("LAL".into()),
            position: Some("F".into()),
            sport: Some("NBA".into()),
        }
    }

    pub fn team(id: i64, city: &str, name: &str) -> Team {
        Team {
            id,
            city: city.to_string(),
            name: name.to_string(),
            abbreviation: None,
            conference: None,
        }
    }

    pub fn prediction(probability: f64) -> Prediction {
        Prediction {
            probability,
            confidence: Confidence::High,
            summary: Some("Strong recent form against weak interior defence.".into()),
            factors: vec!["Averaging 27.1 over the last 10".into()],
            risks: vec!["Back-to-back minutes restriction".into()],
            recommendation: Some("Take the OVER".into()),
            direction: Some(Direction::Over),
            market_alignment: Some("Agrees with consensus".into()),
        }
    }

    pub fn odds() -> OddsData {
        OddsData {
            consensus_line: Some(25.5),
            best_over: Some(BookPrice {
                book: "DraftKings".into(),
                odds: OddsValue::Number(-110.0),
                line: Some(25.5),
            }),
            best_under: None,
            books: Vec::new(),
        }
    }

    pub fn leg(id: i64, name: &str, probability: f64) -> ParlayLeg {
        ParlayLeg {
            id,
            player: name.to_string(),
            stat: StatCategory::Points,
            line: 25.5,
            direction: Direction::Over,
            opponent: Some("Celtics".into()),
            probability,
        }
    }

    /// Snapshot sitting at the given step with a full roster.
    pub fn snapshot(step: Step) -> AppSnapshot {
        let steps = vec![
            Step::Sport,
            Step::Player,
            Step::Stat,
            Step::Opponent,
            Step::Direction,
            Step::Line,
        ];
        let step_number = steps.iter().position(|s| *s == step).map_or(1, |i| i + 1);
        AppSnapshot {
            steps,
            step,
            step_number,
            roster_loaded: true,
            sports: vec!["NBA".into()],
            selection: Selection {
                sport: Some("NBA".into()),
                player: Some(PlayerPick::Roster(player(1, "LeBron James"))),
                stat: Some(StatCategory::Points),
                opponent: Some(team(2, "Boston", "Celtics")),
                direction: Some(Direction::Over),
                line: String::new(),
            },
            search: String::new(),
            player_options: vec![player(1, "LeBron James"), player(3, "Stephen Curry")],
            stat_options: StatCategory::for_sport("NBA", false),
            opponent_options: vec![team(2, "Boston", "Celtics"), team(4, "Denver", "Nuggets")],
            outcome: Outcome::Idle,
            can_predict: false,
            question: "What are the odds LeBron James scores OVER 25.5 points vs Celtics?"
                .into(),
            in_parlay: false,
            parlay: ParlaySnapshot {
                legs: Vec::new(),
                status: ParlayStatus::Idle,
                open: false,
                can_calculate: false,
            },
            notice: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
