// HTTP client for the prediction endpoint.
//
// One endpoint URL serves everything: `GET ?type=players|teams` for the
// roster, and `POST` with a JSON body for predictions and parlays. Every
// call is a single round trip with a fixed timeout; nothing is retried or
// cached.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use prophet_core::config::ApiConfig;
use prophet_core::payload::{
    ParlayRequest, ParlayResponse, ParlayResult, PlayersResponse, PredictionOutcome,
    PredictionRequest, PredictionResponse, TeamsResponse,
};
use prophet_core::roster::{Player, Roster, Team};

const PREDICTION_FALLBACK: &str = "Prediction failed";
const PARLAY_FALLBACK: &str = "Parlay calculation failed";
const CONNECT_FAILURE: &str = "Failed to connect to API";
const TIMEOUT_MESSAGE: &str = "Request timed out";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("malformed response: {0}")]
    Decode(String),

    /// The service answered with `success: false`.
    #[error("service rejected request: {message}")]
    Rejected { message: String },
}

impl GatewayError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(err)
        }
    }

    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(_) | GatewayError::Decode(_) => CONNECT_FAILURE.to_string(),
            GatewayError::Timeout => TIMEOUT_MESSAGE.to_string(),
            GatewayError::Rejected { message } => message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Service seam
// ---------------------------------------------------------------------------

/// What the orchestrator needs from the remote service.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, request: &PredictionRequest)
        -> Result<PredictionOutcome, GatewayError>;

    async fn calculate_parlay(&self, request: &ParlayRequest)
        -> Result<ParlayResult, GatewayError>;

    /// Fetch players and teams. A half that fails comes back empty.
    async fn load_roster(&self) -> Roster;
}

// ---------------------------------------------------------------------------
// GatewayClient
// ---------------------------------------------------------------------------

pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GatewayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Transport)?;
        Ok(GatewayClient {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, GatewayError> {
        GatewayClient::new(config.endpoint.trim(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, kind: &str) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("type", kind)])
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        decode(response).await
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, GatewayError> {
        let resp: PlayersResponse = self.get_json("players").await?;
        if !resp.success {
            return Err(GatewayError::Rejected {
                message: "player list unavailable".into(),
            });
        }
        Ok(resp.players)
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, GatewayError> {
        let resp: TeamsResponse = self.get_json("teams").await?;
        if !resp.success {
            return Err(GatewayError::Rejected {
                message: "team list unavailable".into(),
            });
        }
        Ok(resp.teams)
    }
}

/// Read the body and decode it as JSON regardless of the HTTP status: the
/// service reports failures as `success: false` envelopes, sometimes with a
/// 4xx/5xx status. A body that is not JSON is a decode error.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(GatewayError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!(%status, error = %e, "undecodable response body");
        GatewayError::Decode(format!("HTTP {status}: {e}"))
    })
}

#[async_trait]
impl PredictionService for GatewayClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionOutcome, GatewayError> {
        debug!(
            player = %request.player_name,
            stat = %request.stat_type,
            line = request.line,
            direction = %request.direction,
            "requesting prediction"
        );
        let resp: PredictionResponse = self.post_json(request).await?;
        match resp {
            PredictionResponse {
                success: true,
                prediction: Some(prediction),
                odds_data,
                ..
            } => Ok(PredictionOutcome {
                prediction,
                odds: odds_data,
            }),
            PredictionResponse { error, .. } => Err(GatewayError::Rejected {
                message: error.unwrap_or_else(|| PREDICTION_FALLBACK.to_string()),
            }),
        }
    }

    async fn calculate_parlay(&self, request: &ParlayRequest) -> Result<ParlayResult, GatewayError> {
        debug!(legs = request.legs.len(), "requesting parlay calculation");
        let resp: ParlayResponse = self.post_json(request).await?;
        match resp {
            ParlayResponse {
                success: true,
                parlay: Some(parlay),
                ..
            } => Ok(parlay),
            ParlayResponse { error, .. } => Err(GatewayError::Rejected {
                message: error.unwrap_or_else(|| PARLAY_FALLBACK.to_string()),
            }),
        }
    }

    async fn load_roster(&self) -> Roster {
        let (players, teams) = tokio::join!(self.fetch_players(), self.fetch_teams());
        let players = players.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load players");
            Vec::new()
        });
        let teams = teams.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load teams");
            Vec::new()
        });
        debug!(players = players.len(), teams = teams.len(), "roster loaded");
        Roster::new(players, teams)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
