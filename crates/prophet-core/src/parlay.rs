// The parlay slip: 2 to 6 frozen prediction legs and their combined result.

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::payload::{ParlayLegPayload, ParlayRequest, ParlayResult};
use crate::selection::{Direction, StatCategory};

pub const MIN_LEGS: usize = 2;
pub const MAX_LEGS: usize = 6;

/// Snapshot of a ready prediction, before it gets an id on the slip.
#[derive(Debug, Clone, PartialEq)]
pub struct LegDraft {
    pub player: String,
    pub stat: StatCategory,
    pub line: f64,
    pub direction: Direction,
    /// Opponent team name (not city), when one was chosen.
    pub opponent: Option<String>,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParlayLeg {
    pub id: i64,
    pub player: String,
    pub stat: StatCategory,
    pub line: f64,
    pub direction: Direction,
    pub opponent: Option<String>,
    pub probability: f64,
}

impl ParlayLeg {
    fn payload(&self) -> ParlayLegPayload {
        ParlayLegPayload {
            id: self.id,
            player: self.player.clone(),
            stat: self.stat.label().to_string(),
            line: self.line,
            direction: self.direction,
            opponent: self.opponent.clone(),
            probability: self.probability,
        }
    }
}

/// What `add_leg` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLeg {
    Added(i64),
    /// A leg for the same player and stat is already on the slip.
    Duplicate,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParlayStatus {
    Idle,
    Loading { generation: u64 },
    Ready(ParlayResult),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParlayError {
    #[error("a parlay needs at least 2 legs (have {have})")]
    TooFewLegs { have: usize },

    #[error("a parlay calculation is already in flight")]
    Busy,
}

/// A calculation that has been started and is waiting on the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingParlay {
    pub generation: u64,
    pub request: ParlayRequest,
}

#[derive(Debug, Clone)]
pub struct ParlaySlip {
    legs: Vec<ParlayLeg>,
    status: ParlayStatus,
    open: bool,
    generation: u64,
    last_id: i64,
}

impl Default for ParlaySlip {
    fn default() -> Self {
        Self::new()
    }
}

impl ParlaySlip {
    pub fn new() -> Self {
        ParlaySlip {
            legs: Vec::new(),
            status: ParlayStatus::Idle,
            open: false,
            generation: 0,
            last_id: 0,
        }
    }

    pub fn legs(&self) -> &[ParlayLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.legs.len() >= MAX_LEGS
    }

    pub fn status(&self) -> &ParlayStatus {
        &self.status
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn expand(&mut self) {
        self.open = true;
    }

    pub fn can_calculate(&self) -> bool {
        self.legs.len() >= MIN_LEGS && !matches!(self.status, ParlayStatus::Loading { .. })
    }

    /// Whether a leg with exactly this player, stat and line is on the slip.
    pub fn contains(&self, player: &str, stat: StatCategory, line: f64) -> bool {
        self.legs
            .iter()
            .any(|l| l.player == player && l.stat == stat && l.line == line)
    }

    pub fn add_leg(&mut self, draft: LegDraft) -> AddLeg {
        if self
            .legs
            .iter()
            .any(|l| l.player == draft.player && l.stat == draft.stat)
        {
            return AddLeg::Duplicate;
        }
        if self.is_full() {
            return AddLeg::Full;
        }
        let id = self.next_id();
        debug!(id, player = %draft.player, stat = %draft.stat, "parlay leg added");
        self.legs.push(ParlayLeg {
            id,
            player: draft.player,
            stat: draft.stat,
            line: draft.line,
            direction: draft.direction,
            opponent: draft.opponent,
            probability: draft.probability,
        });
        self.legs_changed();
        AddLeg::Added(id)
    }

    /// Remove the leg with this id. Returns false when no such leg exists.
    pub fn remove_leg(&mut self, id: i64) -> bool {
        let before = self.legs.len();
        self.legs.retain(|l| l.id != id);
        if self.legs.len() == before {
            return false;
        }
        self.legs_changed();
        true
    }

    /// Empty the slip and collapse the panel.
    pub fn clear(&mut self) {
        self.legs.clear();
        self.legs_changed();
        self.open = false;
    }

    pub fn begin_calculation(&mut self) -> Result<PendingParlay, ParlayError> {
        if matches!(self.status, ParlayStatus::Loading { .. }) {
            return Err(ParlayError::Busy);
        }
        if self.legs.len() < MIN_LEGS {
            return Err(ParlayError::TooFewLegs {
                have: self.legs.len(),
            });
        }
        self.generation += 1;
        self.status = ParlayStatus::Loading {
            generation: self.generation,
        };
        Ok(PendingParlay {
            generation: self.generation,
            request: ParlayRequest::new(self.legs.iter().map(ParlayLeg::payload).collect()),
        })
    }

    /// Merge a gateway reply. Returns false for a stale reply.
    pub fn finish_calculation(
        &mut self,
        generation: u64,
        result: Result<ParlayResult, String>,
    ) -> bool {
        match self.status {
            ParlayStatus::Loading { generation: current } if current == generation => {}
            _ => return false,
        }
        self.status = match result {
            Ok(parlay) => ParlayStatus::Ready(parlay),
            Err(message) => ParlayStatus::Failed(message),
        };
        true
    }

    /// Any change to the legs invalidates a displayed or pending result.
    fn legs_changed(&mut self) {
        if matches!(self.status, ParlayStatus::Loading { .. }) {
            self.generation += 1;
        }
        self.status = ParlayStatus::Idle;
    }

    // Millisecond timestamps, bumped past the previous id when two legs land
    // in the same millisecond.
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }
}
