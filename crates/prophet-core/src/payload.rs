// JSON payloads exchanged with the prediction endpoint.
//
// Request bodies are built by the wizard and the parlay slip; response
// bodies are decoded by the gateway. Response fields the view only renders
// when present are all optional so a sparse reply is never a decode error.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::roster::{Player, Team};
use crate::selection::Direction;

// ---------------------------------------------------------------------------
// Roster responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PlayersResponse {
    pub success: bool,
    #[serde(default)]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub success: bool,
    #[serde(default)]
    pub teams: Vec<Team>,
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Body of a prediction POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub player_name: String,
    /// Lower-cased stat label.
    pub stat_type: String,
    pub line: f64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_team: Option<String>,
}

/// Envelope returned for a prediction POST.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default)]
    pub prediction: Option<Prediction>,
    #[serde(default)]
    pub odds_data: Option<OddsData>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Confidence tier reported by the service. Both vocabularies the service
/// has used are recognised; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
    Strong,
    Moderate,
    Weak,
    Other(String),
}

/// Collapsed tier used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    Top,
    Middle,
    Bottom,
}

impl Confidence {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            "strong" => Confidence::Strong,
            "moderate" => Confidence::Moderate,
            "weak" => Confidence::Weak,
            _ => Confidence::Other(raw.to_string()),
        }
    }

    pub fn tier(&self) -> ConfidenceTier {
        match self {
            Confidence::High | Confidence::Strong => ConfidenceTier::Top,
            Confidence::Medium | Confidence::Moderate => ConfidenceTier::Middle,
            _ => ConfidenceTier::Bottom,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Confidence::High => "HIGH".into(),
            Confidence::Medium => "MEDIUM".into(),
            Confidence::Low => "LOW".into(),
            Confidence::Strong => "STRONG".into(),
            Confidence::Moderate => "MODERATE".into(),
            Confidence::Weak => "WEAK".into(),
            Confidence::Other(raw) => raw.to_uppercase(),
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Confidence::parse(&raw))
    }
}

/// The service's prediction object, stored verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default, alias = "recommended_play")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub market_alignment: Option<String>,
}

/// A successful prediction reply: the prediction plus any market odds.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    pub odds: Option<OddsData>,
}

/// Colour band for a probability: >= 60 favourable, >= 45 coin flip,
/// below that unfavourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityBand {
    Favourable,
    CoinFlip,
    Unfavourable,
}

impl ProbabilityBand {
    pub fn of(probability: f64) -> Self {
        if probability >= 60.0 {
            ProbabilityBand::Favourable
        } else if probability >= 45.0 {
            ProbabilityBand::CoinFlip
        } else {
            ProbabilityBand::Unfavourable
        }
    }
}

/// A percentage as the service sent it: "62%", "62.5%".
pub fn format_percent(probability: f64) -> String {
    format!("{}%", trim_float(probability))
}

/// Market odds comparison returned alongside richer predictions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OddsData {
    #[serde(default)]
    pub consensus_line: Option<f64>,
    #[serde(default)]
    pub best_over: Option<BookPrice>,
    #[serde(default)]
    pub best_under: Option<BookPrice>,
    #[serde(default)]
    pub books: Vec<BookLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookPrice {
    pub book: String,
    pub odds: OddsValue,
    #[serde(default)]
    pub line: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookLine {
    pub book: String,
    pub line: f64,
    #[serde(default)]
    pub over_odds: Option<OddsValue>,
    #[serde(default)]
    pub under_odds: Option<OddsValue>,
}

/// American odds as the service sends them: a number or preformatted text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for OddsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsValue::Number(n) if *n > 0.0 => write!(f, "+{}", trim_float(*n)),
            OddsValue::Number(n) => write!(f, "{}", trim_float(*n)),
            OddsValue::Text(s) if s.starts_with('+') || s.starts_with('-') => f.write_str(s),
            OddsValue::Text(s) => write!(f, "+{s}"),
        }
    }
}

fn trim_float(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Parlay
// ---------------------------------------------------------------------------

/// One leg as sent in a parlay request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayLegPayload {
    pub id: i64,
    pub player: String,
    pub stat: String,
    pub line: f64,
    pub direction: Direction,
    pub opponent: Option<String>,
    pub probability: f64,
}

/// Body of a parlay POST. Serializes with `"type": "parlay"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub legs: Vec<ParlayLegPayload>,
}

impl ParlayRequest {
    pub fn new(legs: Vec<ParlayLegPayload>) -> Self {
        ParlayRequest { kind: "parlay", legs }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParlayResponse {
    pub success: bool,
    #[serde(default)]
    pub parlay: Option<ParlayResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParlayResult {
    pub combined_probability: f64,
    pub implied_odds: OddsValue,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub correlation_warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
