// Messages exchanged between the TUI, the orchestrator and request tasks.

use prophet_core::parlay::{ParlayLeg, ParlayStatus};
use prophet_core::payload::{ParlayResult, PredictionOutcome};
use prophet_core::roster::{Player, Roster, Team};
use prophet_core::selection::{Direction, Selection, StatCategory};
use prophet_core::wizard::{Outcome, Step};

/// Commands sent from the TUI to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SelectSport(String),
    UpdateSearch(String),
    /// Pick a roster entry by player id.
    SelectPlayer(i64),
    /// Use the typed search text as a free-text player name.
    SubmitSearch,
    SelectStat(StatCategory),
    /// Pick an opponent by team id.
    SelectOpponent(i64),
    SelectDirection(Direction),
    SetLine(String),
    Predict,
    CancelPrediction,
    GoBack,
    Reset,
    AddLeg,
    RemoveLeg(i64),
    ClearParlay,
    CalculateParlay,
    ToggleParlay,
    Quit,
}

/// Results delivered back to the orchestrator by spawned tasks.
#[derive(Debug)]
pub enum GatewayEvent {
    RosterLoaded(Roster),
    Prediction {
        generation: u64,
        result: Result<PredictionOutcome, String>,
    },
    Parlay {
        generation: u64,
        result: Result<ParlayResult, String>,
    },
}

/// Updates pushed from the orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// One-line message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warn,
            text: text.into(),
        }
    }
}

/// Everything the TUI renders, captured in one shot.
///
/// Option lists are already derived for the current step: the filtered
/// player list, the stat set for the sport, the eligible opponents.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub steps: Vec<Step>,
    pub step: Step,
    pub step_number: usize,
    pub roster_loaded: bool,
    pub sports: Vec<String>,
    pub selection: Selection,
    pub search: String,
    pub player_options: Vec<Player>,
    pub stat_options: Vec<StatCategory>,
    pub opponent_options: Vec<Team>,
    pub outcome: Outcome,
    pub can_predict: bool,
    pub question: String,
    /// The current prediction is already on the slip.
    pub in_parlay: bool,
    pub parlay: ParlaySnapshot,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct ParlaySnapshot {
    pub legs: Vec<ParlayLeg>,
    pub status: ParlayStatus,
    pub open: bool,
    pub can_calculate: bool,
}
