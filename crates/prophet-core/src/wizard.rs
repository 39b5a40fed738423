// The wizard step machine.
//
// Steps advance strictly forward on selection and strictly backward (LIFO)
// on `go_back`. The terminal Line step carries an `Outcome` sub-phase
// (idle / loading / ready / failed) so exactly one of them holds at a time.
//
// Every outgoing prediction is stamped with a generation number. Reset,
// back and cancel bump the generation, so a reply that arrives afterwards
// is recognised as stale and dropped.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::config::WizardConfig;
use crate::parlay::LegDraft;
use crate::payload::{OddsData, Prediction, PredictionOutcome, PredictionRequest};
use crate::roster::Team;
use crate::selection::{parse_line, Direction, PlayerPick, Selection, StatCategory};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Sport,
    Player,
    Stat,
    Opponent,
    Direction,
    Line,
}

impl Step {
    pub fn title(self) -> &'static str {
        match self {
            Step::Sport => "Sport",
            Step::Player => "Player",
            Step::Stat => "Stat",
            Step::Opponent => "Opponent",
            Step::Direction => "Direction",
            Step::Line => "Line",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Which steps this wizard runs, in order. The Player, Stat, Direction and
/// Line steps are always present; Sport and Opponent are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPlan {
    steps: Vec<Step>,
    default_sport: String,
    combo_stat: bool,
}

impl StepPlan {
    pub fn new(
        sport_step: bool,
        opponent_step: bool,
        default_sport: impl Into<String>,
        combo_stat: bool,
    ) -> Self {
        let mut steps = Vec::with_capacity(6);
        if sport_step {
            steps.push(Step::Sport);
        }
        steps.push(Step::Player);
        steps.push(Step::Stat);
        if opponent_step {
            steps.push(Step::Opponent);
        }
        steps.push(Step::Direction);
        steps.push(Step::Line);
        StepPlan {
            steps,
            default_sport: default_sport.into(),
            combo_stat,
        }
    }

    pub fn from_config(config: &WizardConfig) -> Self {
        StepPlan::new(
            config.sport_step,
            config.opponent_step,
            config.default_sport.clone(),
            config.combo_stat,
        )
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        StepPlan::new(true, true, "NBA", false)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Sub-phase of the Line step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    Loading { generation: u64 },
    Ready {
        prediction: Prediction,
        odds: Option<OddsData>,
    },
    Failed(String),
}

impl Outcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading { .. })
    }
}

/// A prediction that has been started and is waiting on the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrediction {
    pub generation: u64,
    pub request: PredictionRequest,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("{action} is not available at the {current} step")]
    WrongStep { action: &'static str, current: Step },

    #[error("sport must not be empty")]
    EmptySport,

    #[error("{stat} is not offered for {sport}")]
    UnsupportedStat { stat: StatCategory, sport: String },

    #[error("{team} is the player's own team")]
    OwnTeam { team: String },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("type a name to search for first")]
    EmptySearch,

    #[error("line must be a number")]
    InvalidLine,

    #[error("a prediction is already in flight")]
    Busy,

    #[error("no {0} selected")]
    Missing(&'static str),

    #[error("no prediction to add")]
    NoPrediction,
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Wizard {
    plan: StepPlan,
    index: usize,
    selection: Selection,
    search: String,
    outcome: Outcome,
    generation: u64,
}

impl Wizard {
    pub fn new(plan: StepPlan) -> Self {
        let mut wizard = Wizard {
            plan,
            index: 0,
            selection: Selection::default(),
            search: String::new(),
            outcome: Outcome::Idle,
            generation: 0,
        };
        wizard.preset_sport();
        wizard
    }

    // -- Accessors --

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn current_step(&self) -> Step {
        self.plan.steps[self.index]
    }

    /// 1-based step number, as shown in the progress bar.
    pub fn step_number(&self) -> usize {
        self.index + 1
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_loading(&self) -> bool {
        self.outcome.is_loading()
    }

    /// Stat categories offered for the chosen sport.
    pub fn stat_options(&self) -> Vec<StatCategory> {
        let sport = self
            .selection
            .sport
            .as_deref()
            .unwrap_or(self.plan.default_sport.as_str());
        StatCategory::for_sport(sport, self.plan.combo_stat)
    }

    /// Whether the predict action is enabled: at the Line step, nothing in
    /// flight, and the line parses to a finite number.
    pub fn can_predict(&self) -> bool {
        self.current_step() == Step::Line
            && !self.is_loading()
            && self.selection.parsed_line().is_some()
    }

    // -- Forward transitions --

    pub fn select_sport(&mut self, sport: &str) -> Result<(), WizardError> {
        self.expect_step(Step::Sport, "selecting a sport")?;
        let sport = sport.trim();
        if sport.is_empty() {
            return Err(WizardError::EmptySport);
        }
        self.selection.sport = Some(sport.to_string());
        self.advance();
        Ok(())
    }

    pub fn update_search(&mut self, text: &str) -> Result<(), WizardError> {
        self.expect_step(Step::Player, "searching")?;
        self.search = text.to_string();
        Ok(())
    }

    pub fn select_player(&mut self, pick: PlayerPick) -> Result<(), WizardError> {
        self.expect_step(Step::Player, "selecting a player")?;
        self.selection.player = Some(pick);
        self.search.clear();
        self.advance();
        Ok(())
    }

    /// Select the typed search text as a free-text player name.
    pub fn submit_search(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::Player, "submitting a name")?;
        let name = self.search.trim().to_string();
        if name.is_empty() {
            return Err(WizardError::EmptySearch);
        }
        self.select_player(PlayerPick::FreeText(name))
    }

    pub fn select_stat(&mut self, stat: StatCategory) -> Result<(), WizardError> {
        self.expect_step(Step::Stat, "selecting a stat")?;
        if !self.stat_options().contains(&stat) {
            return Err(WizardError::UnsupportedStat {
                stat,
                sport: self
                    .selection
                    .sport
                    .clone()
                    .unwrap_or_else(|| self.plan.default_sport.clone()),
            });
        }
        self.selection.stat = Some(stat);
        self.advance();
        Ok(())
    }

    pub fn select_opponent(&mut self, team: Team) -> Result<(), WizardError> {
        self.expect_step(Step::Opponent, "selecting an opponent")?;
        let own = self.selection.player.as_ref().and_then(PlayerPick::team_id);
        if own == Some(team.id) {
            return Err(WizardError::OwnTeam {
                team: team.display_name(),
            });
        }
        self.selection.opponent = Some(team);
        self.advance();
        Ok(())
    }

    pub fn select_direction(&mut self, direction: Direction) -> Result<(), WizardError> {
        self.expect_step(Step::Direction, "choosing over/under")?;
        self.selection.direction = Some(direction);
        self.advance();
        Ok(())
    }

    /// Store the line text. Not a transition. Editing the line discards a
    /// displayed result or error, since it no longer matches the input.
    pub fn set_line(&mut self, text: &str) -> Result<(), WizardError> {
        self.expect_step(Step::Line, "entering a line")?;
        if self.is_loading() {
            return Err(WizardError::Busy);
        }
        if self.selection.line != text {
            self.selection.line = text.to_string();
            self.outcome = Outcome::Idle;
        }
        Ok(())
    }

    // -- Backward transitions --

    /// Undo the most recent forward step.
    ///
    /// Clears the in-progress input of the step being left and the field
    /// set by the step returned to, so the selection equals what it was
    /// before that step was taken.
    pub fn go_back(&mut self) -> Result<(), WizardError> {
        if self.index == 0 {
            return Err(WizardError::AtFirstStep);
        }
        self.invalidate_in_flight();
        let leaving = self.current_step();
        self.clear_field(leaving);
        self.index -= 1;
        let returning = self.current_step();
        self.clear_field(returning);
        debug!(from = %leaving, to = %returning, "wizard went back");
        Ok(())
    }

    /// Return to the first step with everything cleared.
    pub fn reset(&mut self) {
        self.invalidate_in_flight();
        self.index = 0;
        self.selection = Selection::default();
        self.search.clear();
        self.outcome = Outcome::Idle;
        self.preset_sport();
    }

    // -- Prediction lifecycle --

    /// Start a prediction: builds the request and enters `Loading`.
    pub fn begin_prediction(&mut self) -> Result<PendingPrediction, WizardError> {
        self.expect_step(Step::Line, "predicting")?;
        if self.is_loading() {
            return Err(WizardError::Busy);
        }
        let line = self
            .selection
            .parsed_line()
            .ok_or(WizardError::InvalidLine)?;
        let player = self
            .selection
            .player
            .as_ref()
            .ok_or(WizardError::Missing("player"))?;
        let stat = self.selection.stat.ok_or(WizardError::Missing("stat"))?;
        let direction = self
            .selection
            .direction
            .ok_or(WizardError::Missing("direction"))?;

        let request = PredictionRequest {
            player_name: player.name().to_string(),
            stat_type: stat.wire_name(),
            line,
            direction,
            opponent: self.selection.opponent.as_ref().map(Team::display_name),
            player_team: player.team_display(),
        };

        self.generation += 1;
        self.outcome = Outcome::Loading {
            generation: self.generation,
        };
        Ok(PendingPrediction {
            generation: self.generation,
            request,
        })
    }

    /// Merge a gateway reply. Returns false when the reply is stale (the
    /// request was cancelled, or the user reset or went back meanwhile).
    pub fn finish_prediction(
        &mut self,
        generation: u64,
        result: Result<PredictionOutcome, String>,
    ) -> bool {
        match self.outcome {
            Outcome::Loading { generation: current } if current == generation => {}
            _ => {
                debug!(generation, current = self.generation, "dropping stale prediction reply");
                return false;
            }
        }
        self.outcome = match result {
            Ok(outcome) => Outcome::Ready {
                prediction: outcome.prediction,
                odds: outcome.odds,
            },
            Err(message) => Outcome::Failed(message),
        };
        true
    }

    /// Abandon the in-flight request, if any.
    pub fn cancel_prediction(&mut self) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.invalidate_in_flight();
        true
    }

    // -- Derived output --

    /// "What are the odds LeBron James goes OVER 25.5 points vs Warriors?"
    pub fn question(&self) -> String {
        let s = &self.selection;
        let player = s.player.as_ref().map(PlayerPick::name).unwrap_or("___");
        let direction = s.direction.map(Direction::as_str).unwrap_or("___");
        let line = if s.line.trim().is_empty() {
            "___"
        } else {
            s.line.trim()
        };
        let stat = s
            .stat
            .map(|st| st.label().to_lowercase())
            .unwrap_or_else(|| "___".to_string());
        let mut q = format!("What are the odds {player} goes {direction} {line} {stat}");
        if let Some(team) = &s.opponent {
            q.push_str(" vs ");
            q.push_str(&team.name);
        }
        q.push('?');
        q
    }

    /// Freeze the current result as a parlay leg.
    pub fn leg_draft(&self) -> Result<LegDraft, WizardError> {
        let Outcome::Ready { prediction, .. } = &self.outcome else {
            return Err(WizardError::NoPrediction);
        };
        let s = &self.selection;
        Ok(LegDraft {
            player: s
                .player
                .as_ref()
                .map(|p| p.name().to_string())
                .ok_or(WizardError::Missing("player"))?,
            stat: s.stat.ok_or(WizardError::Missing("stat"))?,
            line: s.parsed_line().ok_or(WizardError::InvalidLine)?,
            direction: s.direction.ok_or(WizardError::Missing("direction"))?,
            opponent: s.opponent.as_ref().map(|t| t.name.clone()),
            probability: prediction.probability,
        })
    }

    // -- Internals --

    fn expect_step(&self, step: Step, action: &'static str) -> Result<(), WizardError> {
        let current = self.current_step();
        if current == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep { action, current })
        }
    }

    fn advance(&mut self) {
        if self.index + 1 < self.plan.len() {
            self.index += 1;
        }
    }

    fn preset_sport(&mut self) {
        if !self.plan.has(Step::Sport) {
            self.selection.sport = Some(self.plan.default_sport.clone());
        }
    }

    fn invalidate_in_flight(&mut self) {
        if self.is_loading() {
            self.generation += 1;
            self.outcome = Outcome::Idle;
        }
    }

    fn clear_field(&mut self, step: Step) {
        match step {
            Step::Sport => self.selection.sport = None,
            Step::Player => {
                self.selection.player = None;
                self.search.clear();
            }
            Step::Stat => self.selection.stat = None,
            Step::Opponent => self.selection.opponent = None,
            Step::Direction => self.selection.direction = None,
            Step::Line => {
                self.selection.line.clear();
                self.outcome = Outcome::Idle;
            }
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Wizard::new(StepPlan::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Confidence;
    use crate::roster::Player;

    fn lebron() -> Player {
        Player {
            id: 237,
            name: "LeBron James".into(),
            team_id: Some(14),
            team_city: Some("Los Angeles".into()),
            team_name: Some("Lakers".into()),
            team_abbrev: Some("LAL".into()),
            position: Some("F".into()),
            sport: Some("NBA".into()),
        }
    }

    fn team(id: i64, city: &str, name: &str) -> Team {
        Team {
            id,
            city: city.into(),
            name: name.into(),
            abbreviation: None,
            conference: None,
        }
    }

    fn warriors() -> Team {
        team(10, "Golden State", "Warriors")
    }

    fn prediction(probability: f64) -> PredictionOutcome {
        PredictionOutcome {
            prediction: Prediction {
                probability,
                confidence: Confidence::High,
                summary: None,
                factors: vec![],
                risks: vec![],
                recommendation: None,
                direction: None,
                market_alignment: None,
            },
            odds: None,
        }
    }

    /// Drive a full six-step wizard up to the Line step.
    fn at_line_step() -> Wizard {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        w.select_stat(StatCategory::Points).unwrap();
        w.select_opponent(warriors()).unwrap();
        w.select_direction(Direction::Over).unwrap();
        w
    }

    /// Forward actions in canonical order, as closures over the wizard.
    fn forward_actions() -> Vec<Box<dyn Fn(&mut Wizard)>> {
        vec![
            Box::new(|w: &mut Wizard| w.select_sport("NBA").unwrap()),
            Box::new(|w: &mut Wizard| w.select_player(PlayerPick::Roster(lebron())).unwrap()),
            Box::new(|w: &mut Wizard| w.select_stat(StatCategory::Rebounds).unwrap()),
            Box::new(|w: &mut Wizard| w.select_opponent(warriors()).unwrap()),
            Box::new(|w: &mut Wizard| w.select_direction(Direction::Under).unwrap()),
        ]
    }

    // -- Forward progression --

    #[test]
    fn starts_at_sport_with_empty_selection() {
        let w = Wizard::default();
        assert_eq!(w.current_step(), Step::Sport);
        assert_eq!(w.step_number(), 1);
        assert_eq!(w.selection(), &Selection::default());
        assert_eq!(w.outcome(), &Outcome::Idle);
    }

    #[test]
    fn selections_advance_one_step_each() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        assert_eq!(w.current_step(), Step::Player);
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        assert_eq!(w.current_step(), Step::Stat);
        w.select_stat(StatCategory::Points).unwrap();
        assert_eq!(w.current_step(), Step::Opponent);
        w.select_opponent(warriors()).unwrap();
        assert_eq!(w.current_step(), Step::Direction);
        w.select_direction(Direction::Over).unwrap();
        assert_eq!(w.current_step(), Step::Line);
        assert_eq!(w.step_number(), 6);
    }

    #[test]
    fn out_of_order_action_is_rejected_without_change() {
        let mut w = Wizard::default();
        let before = w.selection().clone();
        let err = w.select_stat(StatCategory::Points).unwrap_err();
        assert_eq!(
            err,
            WizardError::WrongStep {
                action: "selecting a stat",
                current: Step::Sport
            }
        );
        assert_eq!(w.selection(), &before);
        assert_eq!(w.current_step(), Step::Sport);
    }

    #[test]
    fn empty_sport_is_rejected() {
        let mut w = Wizard::default();
        assert_eq!(w.select_sport("  "), Err(WizardError::EmptySport));
        assert_eq!(w.current_step(), Step::Sport);
    }

    #[test]
    fn select_player_clears_search() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.update_search("lebr").unwrap();
        assert_eq!(w.search(), "lebr");
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        assert!(w.search().is_empty());
    }

    #[test]
    fn submit_search_selects_free_text() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.update_search("  Bronny James ").unwrap();
        w.submit_search().unwrap();
        assert_eq!(
            w.selection().player,
            Some(PlayerPick::FreeText("Bronny James".into()))
        );
        assert_eq!(w.current_step(), Step::Stat);
    }

    #[test]
    fn submit_empty_search_is_rejected() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        assert_eq!(w.submit_search(), Err(WizardError::EmptySearch));
        assert_eq!(w.current_step(), Step::Player);
    }

    #[test]
    fn combo_stat_requires_plan_support() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        let err = w.select_stat(StatCategory::PointsReboundsAssists).unwrap_err();
        assert!(matches!(err, WizardError::UnsupportedStat { .. }));

        let mut combo = Wizard::new(StepPlan::new(true, true, "NBA", true));
        combo.select_sport("NBA").unwrap();
        combo.select_player(PlayerPick::Roster(lebron())).unwrap();
        combo.select_stat(StatCategory::PointsReboundsAssists).unwrap();
        assert_eq!(combo.current_step(), Step::Opponent);
    }

    #[test]
    fn own_team_cannot_be_opponent() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        w.select_stat(StatCategory::Points).unwrap();
        let err = w.select_opponent(team(14, "Los Angeles", "Lakers")).unwrap_err();
        assert_eq!(
            err,
            WizardError::OwnTeam {
                team: "Los Angeles Lakers".into()
            }
        );
        assert_eq!(w.current_step(), Step::Opponent);
        assert!(w.selection().opponent.is_none());
    }

    #[test]
    fn free_text_player_may_face_any_team() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.select_player(PlayerPick::FreeText("Someone".into())).unwrap();
        w.select_stat(StatCategory::Points).unwrap();
        w.select_opponent(team(14, "Los Angeles", "Lakers")).unwrap();
        assert_eq!(w.current_step(), Step::Direction);
    }

    // -- Step plans --

    #[test]
    fn five_step_plan_skips_opponent() {
        let mut w = Wizard::new(StepPlan::new(true, false, "NBA", false));
        assert_eq!(w.plan().len(), 5);
        w.select_sport("NBA").unwrap();
        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        w.select_stat(StatCategory::Points).unwrap();
        assert_eq!(w.current_step(), Step::Direction);
        w.select_direction(Direction::Over).unwrap();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        assert!(pending.request.opponent.is_none());
    }

    #[test]
    fn four_step_plan_presets_sport() {
        let mut w = Wizard::new(StepPlan::new(false, false, "NBA", false));
        assert_eq!(w.plan().len(), 4);
        assert_eq!(w.current_step(), Step::Player);
        assert_eq!(w.selection().sport.as_deref(), Some("NBA"));
        assert_eq!(w.go_back(), Err(WizardError::AtFirstStep));

        w.select_player(PlayerPick::Roster(lebron())).unwrap();
        w.reset();
        assert_eq!(w.selection().sport.as_deref(), Some("NBA"));
        assert!(w.selection().player.is_none());
    }

    // -- Line and predict gating --

    #[test]
    fn predict_disabled_until_line_is_numeric() {
        let mut w = at_line_step();
        assert!(!w.can_predict());
        for bad in ["", "abc", "NaN", "inf", "1.2.3", "-"] {
            w.set_line(bad).unwrap();
            assert!(!w.can_predict(), "line {bad:?} should not enable predict");
            assert_eq!(w.begin_prediction(), Err(WizardError::InvalidLine));
        }
        w.set_line("25.5").unwrap();
        assert!(w.can_predict());
    }

    #[test]
    fn set_line_outside_line_step_is_rejected() {
        let mut w = Wizard::default();
        assert!(matches!(w.set_line("3"), Err(WizardError::WrongStep { .. })));
    }

    #[test]
    fn begin_prediction_builds_request() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        assert_eq!(pending.request.player_name, "LeBron James");
        assert_eq!(pending.request.stat_type, "points");
        assert_eq!(pending.request.line, 25.5);
        assert_eq!(pending.request.direction, Direction::Over);
        assert_eq!(pending.request.opponent.as_deref(), Some("Golden State Warriors"));
        assert_eq!(pending.request.player_team.as_deref(), Some("Los Angeles Lakers"));
        assert_eq!(
            w.outcome(),
            &Outcome::Loading {
                generation: pending.generation
            }
        );
    }

    #[test]
    fn only_one_prediction_in_flight() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        w.begin_prediction().unwrap();
        assert!(!w.can_predict());
        assert_eq!(w.begin_prediction(), Err(WizardError::Busy));
        assert_eq!(w.set_line("30"), Err(WizardError::Busy));
    }

    #[test]
    fn success_reply_becomes_ready() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        assert!(w.finish_prediction(pending.generation, Ok(prediction(62.0))));
        match w.outcome() {
            Outcome::Ready { prediction, odds } => {
                assert_eq!(prediction.probability, 62.0);
                assert_eq!(prediction.confidence, Confidence::High);
                assert!(odds.is_none());
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn failure_reply_sets_message_and_no_result() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        assert!(w.finish_prediction(pending.generation, Err("Player not found".into())));
        assert_eq!(w.outcome(), &Outcome::Failed("Player not found".into()));
        assert_eq!(w.leg_draft(), Err(WizardError::NoPrediction));
    }

    #[test]
    fn retry_after_failure_clears_error() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let first = w.begin_prediction().unwrap();
        w.finish_prediction(first.generation, Err("boom".into()));
        let second = w.begin_prediction().unwrap();
        assert!(second.generation > first.generation);
        assert!(w.is_loading());
    }

    #[test]
    fn editing_line_discards_result() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        w.finish_prediction(pending.generation, Ok(prediction(62.0)));
        w.set_line("25.5").unwrap();
        assert!(matches!(w.outcome(), Outcome::Ready { .. }));
        w.set_line("27.5").unwrap();
        assert_eq!(w.outcome(), &Outcome::Idle);
    }

    #[test]
    fn reply_after_reset_is_dropped() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        w.reset();
        assert!(!w.finish_prediction(pending.generation, Ok(prediction(62.0))));
        assert_eq!(w.outcome(), &Outcome::Idle);
        assert_eq!(w.current_step(), Step::Sport);
    }

    #[test]
    fn reply_after_back_is_dropped() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        w.go_back().unwrap();
        w.select_direction(Direction::Under).unwrap();
        assert!(!w.finish_prediction(pending.generation, Ok(prediction(62.0))));
        assert_eq!(w.outcome(), &Outcome::Idle);
    }

    #[test]
    fn cancel_drops_late_reply() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        assert!(w.cancel_prediction());
        assert!(!w.is_loading());
        assert!(!w.finish_prediction(pending.generation, Ok(prediction(62.0))));
        assert!(!w.cancel_prediction());
        // The line survives a cancel so the user can retry directly.
        assert!(w.can_predict());
    }

    // -- Back and reset --

    #[test]
    fn go_back_at_first_step_is_rejected() {
        let mut w = Wizard::default();
        assert_eq!(w.go_back(), Err(WizardError::AtFirstStep));
    }

    #[test]
    fn go_back_is_lifo_undo_for_every_prefix() {
        let actions = forward_actions();
        for n in 1..=actions.len() {
            let mut w = Wizard::default();
            for action in &actions[..n - 1] {
                action(&mut w);
            }
            let before_step = w.current_step();
            let before = w.selection().clone();

            actions[n - 1](&mut w);
            w.go_back().unwrap();

            assert_eq!(w.current_step(), before_step, "after {n} forward steps");
            assert_eq!(w.selection(), &before, "after {n} forward steps");
        }
    }

    #[test]
    fn go_back_from_line_clears_line_result_and_direction() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        w.finish_prediction(pending.generation, Ok(prediction(62.0)));

        w.go_back().unwrap();
        assert_eq!(w.current_step(), Step::Direction);
        assert!(w.selection().line.is_empty());
        assert!(w.selection().direction.is_none());
        assert_eq!(w.outcome(), &Outcome::Idle);
        // Earlier fields survive.
        assert!(w.selection().opponent.is_some());
        assert!(w.selection().stat.is_some());
    }

    #[test]
    fn go_back_from_player_clears_sport_and_search() {
        let mut w = Wizard::default();
        w.select_sport("NBA").unwrap();
        w.update_search("cur").unwrap();
        w.go_back().unwrap();
        assert_eq!(w.current_step(), Step::Sport);
        assert!(w.selection().sport.is_none());
        assert!(w.search().is_empty());
    }

    #[test]
    fn reset_always_yields_empty_first_step() {
        let mut fresh = Wizard::default();
        fresh.reset();
        assert_eq!(fresh.selection(), &Selection::default());

        let mut loading = at_line_step();
        loading.set_line("25.5").unwrap();
        loading.begin_prediction().unwrap();
        loading.reset();
        assert_eq!(loading.current_step(), Step::Sport);
        assert_eq!(loading.selection(), &Selection::default());
        assert_eq!(loading.outcome(), &Outcome::Idle);

        let mut ready = at_line_step();
        ready.set_line("25.5").unwrap();
        let pending = ready.begin_prediction().unwrap();
        ready.finish_prediction(pending.generation, Ok(prediction(55.0)));
        ready.reset();
        assert_eq!(ready.selection(), &Selection::default());
        assert_eq!(ready.outcome(), &Outcome::Idle);

        let mut failed = at_line_step();
        failed.set_line("25.5").unwrap();
        let pending = failed.begin_prediction().unwrap();
        failed.finish_prediction(pending.generation, Err("nope".into()));
        failed.reset();
        assert_eq!(failed.outcome(), &Outcome::Idle);
        assert!(failed.search().is_empty());
    }

    // -- Derived output --

    #[test]
    fn question_fills_blanks() {
        let mut w = at_line_step();
        assert_eq!(
            w.question(),
            "What are the odds LeBron James goes OVER ___ points vs Warriors?"
        );
        w.set_line("25.5").unwrap();
        assert_eq!(
            w.question(),
            "What are the odds LeBron James goes OVER 25.5 points vs Warriors?"
        );
    }

    #[test]
    fn leg_draft_freezes_ready_result() {
        let mut w = at_line_step();
        w.set_line("25.5").unwrap();
        let pending = w.begin_prediction().unwrap();
        w.finish_prediction(pending.generation, Ok(prediction(62.0)));
        let leg = w.leg_draft().unwrap();
        assert_eq!(leg.player, "LeBron James");
        assert_eq!(leg.stat, StatCategory::Points);
        assert_eq!(leg.line, 25.5);
        assert_eq!(leg.direction, Direction::Over);
        assert_eq!(leg.opponent.as_deref(), Some("Warriors"));
        assert_eq!(leg.probability, 62.0);
    }
}
