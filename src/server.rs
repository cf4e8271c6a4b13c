use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::bail_runner;
use crate::error::RunnerResult;
use crate::inference::models::model::ModelLoader;
use crate::summarizer::{SummarizationRequest, Summarizer, SummaryStatistics};

/// Shared by every handler, the summarizer lives as long as the process.
pub struct AppState<L: ModelLoader + 'static> {
    pub summarizer: Arc<Summarizer<'static, L>>,
}

impl<L: ModelLoader + 'static> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            summarizer: self.summarizer.clone(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SummarizeRequest {
    pub input: String,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SummarizeResponse {
    pub summary: String,
    pub statistics: SummaryStatistics,
    pub warnings: Vec<String>,
    pub inference_time: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub loaded: bool,
}

pub fn router<L>(state: AppState<L>) -> Router
where
    L: ModelLoader + Send + Sync + 'static,
{
    let text_router = Router::new().route("/summarize", post(handle_summarize_request::<L>));

    Router::new()
        .route("/health", get(handle_health_request::<L>))
        .nest("/text", text_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn handle_summarize_request<L>(
    State(state): State<AppState<L>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> RunnerResult<(StatusCode, Json<SummarizeResponse>)>
where
    L: ModelLoader + Send + Sync + 'static,
{
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            bail_runner!(
                StatusCode::BAD_REQUEST,
                "Invalid request: {}",
                rejection.body_text()
            );
        }
    };

    let settings = state.summarizer.settings();
    let request = SummarizationRequest {
        input: req.input,
        max_length: req.max_length.unwrap_or(settings.default_max_length),
        min_length: req.min_length.unwrap_or(settings.default_min_length),
    };

    // Model loading and inference block, keep them off the async workers
    let summarizer = state.summarizer.clone();
    let report = tokio::task::spawn_blocking(move || summarizer.run(&request)).await??;

    Ok((
        StatusCode::OK,
        Json(SummarizeResponse {
            summary: report.result.summary,
            statistics: report.result.statistics,
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
            inference_time: report.result.inference_time,
        }),
    ))
}

pub async fn handle_health_request<L>(
    State(state): State<AppState<L>>,
) -> (StatusCode, Json<HealthResponse>)
where
    L: ModelLoader + Send + Sync + 'static,
{
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            model: state.summarizer.loader().base().name.clone(),
            loaded: state.summarizer.is_loaded(),
        }),
    )
}
