//! # API REST
//!
//! REST gateway for the triage engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//! - The optional rephraser and case log around each triage call
//!
//! Uses `api-shared` for wire types and `triage-core` for decisions.

#![warn(rust_2018_idioms)]

mod recent;

pub use recent::RecentCases;

use anyhow::Context;
use api_shared::{HealthRes, HealthService, HistoryEntryRes, TriageReq, TriageRes, VitalsReq};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use triage_caselog::{CaseLog, CaseRecord, NewCaseEntry};
use triage_core::{Assessment, Case, CoreConfig, TriageService, DISCLAIMER, MAX_RECENT_CASES};
use triage_rephraser::{OllamaRephraser, RephraseRequest, Rephraser};
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Default number of case-log entries returned by `/cases/history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
/// Upper bound on `/cases/history?limit=`.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Application state for the REST API server
///
/// Shared by every handler. The rephraser and case log are optional capabilities; the gateway
/// triages normally without either.
#[derive(Clone)]
pub struct AppState {
    service: TriageService,
    recent: Arc<RecentCases>,
    case_log: Option<Arc<CaseLog>>,
    rephraser: Option<Arc<dyn Rephraser>>,
    rephrase_timeout: Duration,
}

impl AppState {
    /// State with an empty recent-results buffer and no optional capabilities.
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            service: TriageService::new(),
            recent: Arc::new(RecentCases::new(recent_capacity.min(MAX_RECENT_CASES))),
            case_log: None,
            rephraser: None,
            rephrase_timeout: Duration::ZERO,
        }
    }

    pub fn with_case_log(mut self, case_log: Arc<CaseLog>) -> Self {
        self.case_log = Some(case_log);
        self
    }

    /// Attach a rephraser; each call is abandoned after `timeout`.
    pub fn with_rephraser(mut self, rephraser: Arc<dyn Rephraser>, timeout: Duration) -> Self {
        self.rephraser = Some(rephraser);
        self.rephrase_timeout = timeout;
        self
    }

    /// Build state from startup configuration, opening the case log and creating the
    /// rephraser client when configured.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the case log database cannot be opened, or
    /// - the rephraser HTTP client cannot be built.
    pub fn from_config(cfg: &CoreConfig) -> anyhow::Result<Self> {
        let mut state = Self::new(cfg.recent_capacity());

        if let Some(path) = cfg.case_db_path() {
            let log = CaseLog::open(path)
                .with_context(|| format!("opening case log at {}", path.display()))?;
            tracing::info!("case log enabled at {}", path.display());
            state = state.with_case_log(Arc::new(log));
        }

        if let Some(settings) = cfg.rephraser() {
            let rephraser =
                OllamaRephraser::new(&settings.base_url, &settings.model, settings.timeout)
                    .context("creating rephraser client")?;
            tracing::info!(
                "rephraser enabled: {} at {} ({:?} timeout)",
                settings.model,
                settings.base_url,
                settings.timeout
            );
            state = state.with_rephraser(Arc::new(rephraser), settings.timeout);
        }

        Ok(state)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, triage, list_cases, case_history),
    components(schemas(HealthRes, TriageReq, VitalsReq, TriageRes, HistoryEntryRes))
)]
pub struct ApiDoc;

/// Build the gateway router with permissive CORS and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/triage", post(triage))
        .route("/cases", get(list_cases))
        .route("/cases/history", get(case_history))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Static liveness payload; never touches the rephraser or the case log.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = TriageReq,
    responses(
        (status = 200, description = "Triage result", body = TriageRes),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Body does not match the request schema")
    )
)]
/// Triage one case
///
/// Evaluates the case with the rule engine, asks the rephraser for a one-sentence explanation
/// (falling back to the rule reasoning), records the result in the recent buffer and, when
/// configured, the case log.
#[axum::debug_handler]
async fn triage(State(state): State<AppState>, Json(req): Json<TriageReq>) -> Json<TriageRes> {
    let case = Case::new(req.description.clone(), req.vitals());
    let assessment = state.service.assess(&case);
    let reasoning = explain(&state, &case, &assessment).await;
    let ts = Utc::now();

    let result = TriageRes {
        triage_level: assessment.decision.level,
        reason_code: assessment.decision.reason.as_str().to_string(),
        actions: assessment.actions.iter().map(|a| a.to_string()).collect(),
        reasoning,
        disclaimer: DISCLAIMER.to_string(),
        confidence: round_confidence(assessment.confidence),
        ts: ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        input: req,
    };

    state.recent.push(result.clone());

    if let Some(log) = state.case_log.clone() {
        record_case(log, ts, case, &result).await;
    }

    Json(result)
}

#[utoipa::path(
    get,
    path = "/cases",
    responses(
        (status = 200, description = "Most recent triage results, newest first", body = [TriageRes])
    )
)]
/// List the most recent triage results held in memory
#[axum::debug_handler]
async fn list_cases(State(state): State<AppState>) -> Json<Vec<TriageRes>> {
    Json(state.recent.snapshot())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Maximum entries to return (default 20, capped at 500)
    limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/cases/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Persisted case-log entries, newest first", body = [HistoryEntryRes]),
        (status = 500, description = "Internal server error"),
        (status = 503, description = "No case log configured")
    )
)]
/// Read persisted case-log entries
///
/// # Errors
/// Returns `503 Service Unavailable` if no case log is configured, and
/// `500 Internal Server Error` if the log cannot be read.
#[axum::debug_handler]
async fn case_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntryRes>>, (StatusCode, &'static str)> {
    let Some(log) = state.case_log.clone() else {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "Case log not configured"));
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let records = tokio::task::spawn_blocking(move || log.recent(limit))
        .await
        .map_err(|e| {
            tracing::error!("Case history task error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?
        .map_err(|e| {
            tracing::error!("Case history read error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?;

    Ok(Json(records.into_iter().map(history_entry).collect()))
}

/// Rephrased explanation if one arrives in time, otherwise the rule reasoning.
async fn explain(state: &AppState, case: &Case, assessment: &Assessment) -> String {
    let fallback = assessment.rule_reasoning.to_string();
    let Some(rephraser) = &state.rephraser else {
        return fallback;
    };

    let request = RephraseRequest {
        level: assessment.decision.level,
        description: case.description.clone(),
        vitals: case.vitals.clone(),
    };

    match tokio::time::timeout(state.rephrase_timeout, rephraser.rephrase(&request)).await {
        Ok(Some(sentence)) => sentence,
        Ok(None) => fallback,
        Err(_) => {
            tracing::warn!(
                "rephraser exceeded {:?}; using rule reasoning",
                state.rephrase_timeout
            );
            fallback
        }
    }
}

/// Append to the case log off the async runtime. Failures are logged and swallowed.
async fn record_case(log: Arc<CaseLog>, ts: DateTime<Utc>, case: Case, result: &TriageRes) {
    let entry = NewCaseEntry {
        ts,
        description: case.description,
        vitals: case.vitals,
        triage_level: result.triage_level,
        reason_code: result.reason_code.clone(),
        reasoning: result.reasoning.clone(),
        confidence: result.confidence,
    };

    match tokio::task::spawn_blocking(move || log.append(&entry)).await {
        Ok(Ok(case_id)) => tracing::debug!("logged case {case_id}"),
        Ok(Err(e)) => tracing::warn!("case log append failed: {e}"),
        Err(e) => tracing::warn!("case log task failed: {e}"),
    }
}

fn history_entry(record: CaseRecord) -> HistoryEntryRes {
    HistoryEntryRes {
        id: record.id,
        case_id: record.case_id.to_string(),
        ts: record.ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        description: record.description,
        resp_rate: record.resp_rate,
        pulse: record.pulse,
        cap_refill: record.cap_refill,
        triage_level: record.triage_level,
        reason_code: record.reason_code,
        reasoning: record.reasoning,
        confidence: record.confidence,
    }
}

/// Two decimal places, so penalties like `0.90 - 0.03` read as `0.87`.
fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
