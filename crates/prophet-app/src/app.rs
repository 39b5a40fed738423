// Application state and orchestration logic.
//
// The central event loop owns the wizard, the roster and the parlay slip.
// It applies user commands from the TUI, spawns one gateway task per
// prediction or parlay request, merges their results (dropping stale ones by
// generation) and pushes a fresh snapshot to the TUI after every change.

use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use prophet_core::config::Config;
use prophet_core::parlay::{AddLeg, ParlaySlip, ParlayStatus, MAX_LEGS};
use prophet_core::roster::Roster;
use prophet_core::selection::PlayerPick;
use prophet_core::wizard::{Outcome, StepPlan, Wizard};
use prophet_gateway::PredictionService;

use crate::protocol::{
    AppSnapshot, GatewayEvent, Notice, ParlaySnapshot, UiUpdate, UserCommand,
};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub wizard: Wizard,
    pub roster: Roster,
    /// False until the startup roster fetch reports back (success or not).
    pub roster_loaded: bool,
    pub slip: ParlaySlip,
    pub notice: Option<Notice>,
    service: Arc<dyn PredictionService>,
    /// Spawned tasks report back on this sender.
    gateway_tx: mpsc::Sender<GatewayEvent>,
    prediction_task: Option<JoinHandle<()>>,
    parlay_task: Option<JoinHandle<()>>,
}

impl AppState {
    pub fn new(
        config: Config,
        service: Arc<dyn PredictionService>,
        gateway_tx: mpsc::Sender<GatewayEvent>,
    ) -> Self {
        let wizard = Wizard::new(StepPlan::from_config(&config.wizard));
        AppState {
            config,
            wizard,
            roster: Roster::default(),
            roster_loaded: false,
            slip: ParlaySlip::new(),
            notice: None,
            service,
            gateway_tx,
            prediction_task: None,
            parlay_task: None,
        }
    }

    /// Fetch players and teams in the background.
    pub fn start_roster_load(&self) {
        let service = Arc::clone(&self.service);
        let tx = self.gateway_tx.clone();
        tokio::spawn(async move {
            let roster = service.load_roster().await;
            let _ = tx.send(GatewayEvent::RosterLoaded(roster)).await;
        });
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        let selection = self.wizard.selection().clone();

        let player_options = self
            .roster
            .filter_players(
                self.wizard.search(),
                &self.config.roster.featured,
                self.config.roster.max_search_results,
            )
            .into_iter()
            .cloned()
            .collect();

        let own_team = selection.player.as_ref().and_then(PlayerPick::team_id);
        let opponent_options = self
            .roster
            .eligible_opponents(own_team)
            .into_iter()
            .cloned()
            .collect();

        let in_parlay = match (self.wizard.outcome(), &selection.player, selection.stat) {
            (Outcome::Ready { .. }, Some(player), Some(stat)) => selection
                .parsed_line()
                .is_some_and(|line| self.slip.contains(player.name(), stat, line)),
            _ => false,
        };

        AppSnapshot {
            steps: self.wizard.plan().steps().to_vec(),
            step: self.wizard.current_step(),
            step_number: self.wizard.step_number(),
            roster_loaded: self.roster_loaded,
            sports: self.config.wizard.sports.clone(),
            search: self.wizard.search().to_string(),
            player_options,
            stat_options: self.wizard.stat_options(),
            opponent_options,
            outcome: self.wizard.outcome().clone(),
            can_predict: self.wizard.can_predict(),
            question: self.wizard.question(),
            in_parlay,
            parlay: ParlaySnapshot {
                legs: self.slip.legs().to_vec(),
                status: self.slip.status().clone(),
                open: self.slip.is_open(),
                can_calculate: self.slip.can_calculate(),
            },
            notice: self.notice.clone(),
            selection,
        }
    }

    // -- Commands --

    /// Apply one user command. Rejected actions leave state untouched and
    /// set a warning notice instead.
    pub fn apply_command(&mut self, cmd: UserCommand) {
        self.notice = None;
        match cmd {
            UserCommand::SelectSport(sport) => {
                if self.roster_gate() {
                    return;
                }
                let sport = sport.trim().to_string();
                if !self.config.wizard.sports.contains(&sport) {
                    self.reject(format!("unknown sport {sport:?}"));
                    return;
                }
                let result = self.wizard.select_sport(&sport);
                self.settle(result);
            }
            UserCommand::UpdateSearch(text) => {
                let result = self.wizard.update_search(&text);
                self.settle(result);
            }
            UserCommand::SelectPlayer(id) => {
                if self.roster_gate() {
                    return;
                }
                let Some(player) = self.roster.players.iter().find(|p| p.id == id).cloned() else {
                    self.reject(format!("no player with id {id}"));
                    return;
                };
                let result = self.wizard.select_player(PlayerPick::Roster(player));
                self.settle(result);
            }
            UserCommand::SubmitSearch => {
                if self.roster_gate() {
                    return;
                }
                let result = self.wizard.submit_search();
                self.settle(result);
            }
            UserCommand::SelectStat(stat) => {
                if self.roster_gate() {
                    return;
                }
                let result = self.wizard.select_stat(stat);
                self.settle(result);
            }
            UserCommand::SelectOpponent(id) => {
                if self.roster_gate() {
                    return;
                }
                let Some(team) = self.roster.team(id).cloned() else {
                    self.reject(format!("no team with id {id}"));
                    return;
                };
                let result = self.wizard.select_opponent(team);
                self.settle(result);
            }
            UserCommand::SelectDirection(direction) => {
                if self.roster_gate() {
                    return;
                }
                let result = self.wizard.select_direction(direction);
                self.settle(result);
            }
            UserCommand::SetLine(text) => {
                let result = self.wizard.set_line(&text);
                self.settle(result);
            }
            UserCommand::Predict => self.start_prediction(),
            UserCommand::CancelPrediction => {
                if self.wizard.cancel_prediction() {
                    self.abort_prediction_task();
                    info!("prediction cancelled by user");
                    self.notice = Some(Notice::info("Prediction cancelled"));
                }
            }
            UserCommand::GoBack => {
                let result = self.wizard.go_back();
                if result.is_ok() {
                    self.abort_prediction_task();
                }
                self.settle(result);
            }
            UserCommand::Reset => {
                self.wizard.reset();
                self.abort_prediction_task();
                debug!("wizard reset");
            }
            UserCommand::AddLeg => self.add_leg(),
            UserCommand::RemoveLeg(id) => {
                if self.slip.remove_leg(id) {
                    self.abort_parlay_task();
                } else {
                    self.reject(format!("no parlay leg with id {id}"));
                }
            }
            UserCommand::ClearParlay => {
                self.slip.clear();
                self.abort_parlay_task();
            }
            UserCommand::CalculateParlay => self.start_parlay(),
            UserCommand::ToggleParlay => self.slip.toggle_open(),
            // Handled by the event loop.
            UserCommand::Quit => {}
        }
    }

    fn start_prediction(&mut self) {
        let pending = match self.wizard.begin_prediction() {
            Ok(pending) => pending,
            Err(e) => {
                self.reject(e);
                return;
            }
        };
        info!(
            generation = pending.generation,
            player = %pending.request.player_name,
            stat = %pending.request.stat_type,
            line = pending.request.line,
            direction = %pending.request.direction,
            "prediction requested"
        );

        let service = Arc::clone(&self.service);
        let tx = self.gateway_tx.clone();
        let handle = tokio::spawn(async move {
            let result = service.predict(&pending.request).await.map_err(|e| {
                warn!(error = %e, "prediction request failed");
                e.user_message()
            });
            let _ = tx
                .send(GatewayEvent::Prediction {
                    generation: pending.generation,
                    result,
                })
                .await;
        });
        self.prediction_task = Some(handle);
    }

    fn add_leg(&mut self) {
        let draft = match self.wizard.leg_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.reject(e);
                return;
            }
        };
        // A leg change invalidates any running calculation.
        let had_calculation = matches!(self.slip.status(), ParlayStatus::Loading { .. });
        match self.slip.add_leg(draft) {
            AddLeg::Added(id) => {
                if had_calculation {
                    self.abort_parlay_task();
                }
                info!(id, legs = self.slip.len(), "parlay leg added");
                self.notice = Some(Notice::info(format!(
                    "Added to parlay ({}/{MAX_LEGS})",
                    self.slip.len()
                )));
            }
            AddLeg::Duplicate => self.reject("that player and stat is already on the parlay"),
            AddLeg::Full => self.reject(format!("parlay is full ({MAX_LEGS} legs max)")),
        }
    }

    fn start_parlay(&mut self) {
        let pending = match self.slip.begin_calculation() {
            Ok(pending) => pending,
            Err(e) => {
                self.reject(e);
                return;
            }
        };
        self.slip.expand();
        info!(generation = pending.generation, legs = pending.request.legs.len(), "parlay requested");

        let service = Arc::clone(&self.service);
        let tx = self.gateway_tx.clone();
        let handle = tokio::spawn(async move {
            let result = service
                .calculate_parlay(&pending.request)
                .await
                .map_err(|e| {
                    warn!(error = %e, "parlay request failed");
                    e.user_message()
                });
            let _ = tx
                .send(GatewayEvent::Parlay {
                    generation: pending.generation,
                    result,
                })
                .await;
        });
        self.parlay_task = Some(handle);
    }

    // -- Gateway events --

    pub fn apply_gateway_event(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::RosterLoaded(roster) => {
                info!(
                    players = roster.players.len(),
                    teams = roster.teams.len(),
                    "roster loaded"
                );
                if roster.players.is_empty() {
                    self.notice = Some(Notice::warn(
                        "Player list unavailable; type a name and press Enter",
                    ));
                }
                self.roster = roster;
                self.roster_loaded = true;
            }
            GatewayEvent::Prediction { generation, result } => {
                if self.wizard.finish_prediction(generation, result) {
                    self.prediction_task = None;
                } else {
                    debug!(generation, "discarding stale prediction result");
                }
            }
            GatewayEvent::Parlay { generation, result } => {
                if self.slip.finish_calculation(generation, result) {
                    self.parlay_task = None;
                } else {
                    debug!(generation, "discarding stale parlay result");
                }
            }
        }
    }

    /// Abort any in-flight request tasks.
    pub fn abort_tasks(&mut self) {
        self.abort_prediction_task();
        self.abort_parlay_task();
    }

    // -- Helpers --

    fn abort_prediction_task(&mut self) {
        if let Some(handle) = self.prediction_task.take() {
            handle.abort();
            debug!("aborted prediction task");
        }
    }

    fn abort_parlay_task(&mut self) {
        if let Some(handle) = self.parlay_task.take() {
            handle.abort();
            debug!("aborted parlay task");
        }
    }

    /// True (and a notice is set) while the roster is still loading.
    fn roster_gate(&mut self) -> bool {
        if self.roster_loaded {
            return false;
        }
        self.notice = Some(Notice::warn("Still loading players, try again in a moment"));
        true
    }

    fn settle<E: Display>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.reject(e);
        }
    }

    fn reject(&mut self, reason: impl Display) {
        warn!(reason = %reason, "action rejected");
        self.notice = Some(Notice::warn(reason.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Results from spawned gateway tasks
/// 2. User commands from the TUI
///
/// Pushes a snapshot through `ui_tx` after each.
pub async fn run(
    mut gateway_rx: mpsc::Receiver<GatewayEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    state.start_roster_load();
    send_snapshot(&state, &ui_tx).await;

    let mut gateway_open = true;

    loop {
        tokio::select! {
            event = gateway_rx.recv(), if gateway_open => {
                match event {
                    Some(event) => {
                        state.apply_gateway_event(event);
                        send_snapshot(&state, &ui_tx).await;
                    }
                    None => {
                        info!("Gateway channel closed");
                        gateway_open = false;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.abort_tasks();
    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    debug!(?cmd, "user command");
    state.apply_command(cmd);
    send_snapshot(state, ui_tx).await;
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
