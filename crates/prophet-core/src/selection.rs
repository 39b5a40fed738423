// Selection building blocks: stat categories, bet direction, player picks,
// and the accumulating `Selection` the wizard fills in step by step.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::{Player, Team};

// ---------------------------------------------------------------------------
// StatCategory
// ---------------------------------------------------------------------------

/// A stat line the user can bet on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatCategory {
    Points,
    Rebounds,
    Assists,
    ThreePointers,
    Steals,
    Blocks,
    /// Composite Points+Rebounds+Assists line.
    PointsReboundsAssists,
}

/// The basketball stat set, in menu order. The composite line is appended
/// only when enabled in config.
const BASKETBALL_STATS: &[StatCategory] = &[
    StatCategory::Points,
    StatCategory::Rebounds,
    StatCategory::Assists,
    StatCategory::ThreePointers,
    StatCategory::Steals,
    StatCategory::Blocks,
];

impl StatCategory {
    /// Display label, e.g. "Three-Pointers".
    pub fn label(self) -> &'static str {
        match self {
            StatCategory::Points => "Points",
            StatCategory::Rebounds => "Rebounds",
            StatCategory::Assists => "Assists",
            StatCategory::ThreePointers => "Three-Pointers",
            StatCategory::Steals => "Steals",
            StatCategory::Blocks => "Blocks",
            StatCategory::PointsReboundsAssists => "Points+Rebounds+Assists",
        }
    }

    /// Value sent as `stat_type`: the lower-cased label.
    pub fn wire_name(self) -> String {
        self.label().to_lowercase()
    }

    /// Stat categories offered for a sport. Unknown sports get the
    /// basketball set, which is the only one the endpoint models.
    pub fn for_sport(_sport: &str, combo: bool) -> Vec<StatCategory> {
        let mut stats = BASKETBALL_STATS.to_vec();
        if combo {
            stats.push(StatCategory::PointsReboundsAssists);
        }
        stats
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which side of the line the bet is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "OVER", alias = "over", alias = "Over")]
    Over,
    #[serde(rename = "UNDER", alias = "under", alias = "Under")]
    Under,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Over, Direction::Under];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Over => "OVER",
            Direction::Under => "UNDER",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PlayerPick
// ---------------------------------------------------------------------------

/// The chosen player: either a roster entry or a typed name that did not
/// need to match the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerPick {
    Roster(Player),
    FreeText(String),
}

impl PlayerPick {
    pub fn name(&self) -> &str {
        match self {
            PlayerPick::Roster(p) => &p.name,
            PlayerPick::FreeText(name) => name,
        }
    }

    /// The player's own team id, when known.
    pub fn team_id(&self) -> Option<i64> {
        match self {
            PlayerPick::Roster(p) => p.team_id,
            PlayerPick::FreeText(_) => None,
        }
    }

    /// "City Name" of the player's team, when known.
    pub fn team_display(&self) -> Option<String> {
        match self {
            PlayerPick::Roster(p) => p.team_display(),
            PlayerPick::FreeText(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The user's accumulating choice. Fields are filled in wizard order; the
/// step machine in `wizard` is what keeps that ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub sport: Option<String>,
    pub player: Option<PlayerPick>,
    pub stat: Option<StatCategory>,
    pub opponent: Option<Team>,
    pub direction: Option<Direction>,
    /// Raw line text as typed. Parsed on demand.
    pub line: String,
}

impl Selection {
    /// The line as a finite number, if the text parses to one.
    pub fn parsed_line(&self) -> Option<f64> {
        parse_line(&self.line)
    }
}

/// Parse a betting line. Only finite numbers count; "NaN", "inf" and empty
/// text are rejected.
pub fn parse_line(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_is_lowercased_label() {
        assert_eq!(StatCategory::Points.wire_name(), "points");
        assert_eq!(StatCategory::ThreePointers.wire_name(), "three-pointers");
        assert_eq!(
            StatCategory::PointsReboundsAssists.wire_name(),
            "points+rebounds+assists"
        );
    }

    #[test]
    fn combo_stat_only_when_enabled() {
        let plain = StatCategory::for_sport("NBA", false);
        assert_eq!(plain.len(), 6);
        assert!(!plain.contains(&StatCategory::PointsReboundsAssists));

        let combo = StatCategory::for_sport("NBA", true);
        assert_eq!(combo.len(), 7);
        assert_eq!(combo.last(), Some(&StatCategory::PointsReboundsAssists));
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Over).unwrap(), "\"OVER\"");
        assert_eq!(serde_json::to_string(&Direction::Under).unwrap(), "\"UNDER\"");
        let d: Direction = serde_json::from_str("\"under\"").unwrap();
        assert_eq!(d, Direction::Under);
    }

    #[test]
    fn parse_line_accepts_decimals() {
        assert_eq!(parse_line("25.5"), Some(25.5));
        assert_eq!(parse_line(" 7 "), Some(7.0));
        assert_eq!(parse_line("-1.5"), Some(-1.5));
    }

    #[test]
    fn parse_line_rejects_non_finite_and_garbage() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("abc"), None);
        assert_eq!(parse_line("NaN"), None);
        assert_eq!(parse_line("inf"), None);
        assert_eq!(parse_line("25.5.5"), None);
    }

    #[test]
    fn free_text_pick_has_no_team() {
        let pick = PlayerPick::FreeText("Some Rookie".into());
        assert_eq!(pick.name(), "Some Rookie");
        assert_eq!(pick.team_id(), None);
        assert_eq!(pick.team_display(), None);
    }
}
