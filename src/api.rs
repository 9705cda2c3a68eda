use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::{EngineConfig, HotReloadConfig};
use crate::engine;
use crate::error::ScoringError;
use crate::history::{History, HistoryEntry};
use crate::normalize::ComponentScores;
use crate::result::ConfluenceResult;
use crate::verdict::Verdict;

const HISTORY_CAP: usize = 2000;
const DEBUG_HISTORY_N: usize = 20;

#[derive(Clone)]
pub struct AppState {
    config: Arc<HotReloadConfig>,
    history: Arc<History>,
}

impl AppState {
    /// Fixed configuration, no file watching (tests, embedding).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(HotReloadConfig::new(None, config)),
            history: Arc::new(History::with_capacity(HISTORY_CAP)),
        }
    }

    /// Config from `$CONFLUENCE_CONFIG_PATH` / `config/`, hot-reloaded on change.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            config: Arc::new(HotReloadConfig::from_env()?),
            history: Arc::new(History::with_capacity(HISTORY_CAP)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score_one))
        .route("/score/batch", post(score_batch))
        .route("/debug/history", get(debug_history))
        .route("/debug/config", get(debug_config))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    pub scores: ComponentScores,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub verdict: Verdict,
    pub result: ConfluenceResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl From<&ScoringError> for ErrorBody {
    fn from(e: &ScoringError) -> Self {
        Self {
            error: e.kind(),
            message: e.to_string(),
        }
    }
}

/// HTTP wrapper so handlers can `?` a [`ScoringError`].
pub struct ApiError(ScoringError);

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::from(&self.0))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct BatchItemOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConfluenceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

fn run(state: &AppState, cfg: &EngineConfig, req: ScoreRequest) -> Result<ScoreResponse, ScoringError> {
    let result = engine::score(&req.scores, &cfg.weighting, &cfg.adjustment)?;
    let verdict = Verdict::from_score(result.adjusted_score, &cfg.thresholds);
    state
        .history
        .push(req.symbol.as_deref().unwrap_or("-"), &result);
    Ok(ScoreResponse {
        symbol: req.symbol,
        verdict,
        result,
    })
}

async fn score_one(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let cfg = state.config.current();
    Ok(Json(run(&state, &cfg, req)?))
}

async fn score_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<ScoreRequest>>,
) -> Json<Vec<BatchItemOut>> {
    // One config snapshot for the whole batch.
    let cfg = state.config.current();
    let out = items
        .into_iter()
        .map(|req| {
            let symbol = req.symbol.clone();
            match run(&state, &cfg, req) {
                Ok(r) => BatchItemOut {
                    symbol,
                    verdict: Some(r.verdict),
                    result: Some(r.result),
                    error: None,
                },
                Err(e) => BatchItemOut {
                    symbol,
                    verdict: None,
                    result: None,
                    error: Some(ErrorBody::from(&e)),
                },
            }
        })
        .collect::<Vec<_>>();
    Json(out)
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(DEBUG_HISTORY_N))
}

async fn debug_config(State(state): State<AppState>) -> Json<EngineConfig> {
    Json(state.config.current())
}
