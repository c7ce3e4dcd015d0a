use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::contracts::NumberStore;
use crate::processor::{ProcessOutcome, Processor};

/// Server metrics for monitoring.
#[derive(Default)]
pub struct Metrics {
    pub accepted_total: AtomicU64,
    pub rejected_total: AtomicU64,
    pub invalid_total: AtomicU64,
    pub start_time: std::sync::OnceLock<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        let m = Self::default();
        let _ = m.start_time.set(Instant::now());
        m
    }

    pub fn record_accepted(&self) {
        self.accepted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_total.fetch_add(1, Ordering::Relaxed);
    }
}

/// Application state shared across handlers.
pub struct AppState<S: NumberStore> {
    pub processor: Processor<S>,
    pub metrics: Arc<Metrics>,
}

impl<S: NumberStore> AppState<S> {
    pub fn new(store: Arc<S>, metrics: Arc<Metrics>) -> Self {
        Self {
            processor: Processor::new(store),
            metrics,
        }
    }
}

/// Response for an accepted number.
#[derive(Debug, Serialize)]
pub struct ProcessNumberResponse {
    pub message: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API error type.
#[allow(dead_code)]
pub enum ApiError {
    /// Request never reached the processor (malformed body).
    BadRequest(String),
    /// The processor refused the number (business rule or store failure).
    Rejected(String),
    /// Anything else; detail stays in the server log.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) | ApiError::Rejected(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".into(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// POST /process_number
/// Validates the JSON body `{"number": <integer>}` and runs the number
/// through the processor. Validation failures never reach the processor.
pub async fn process_number<S: NumberStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<ProcessNumberResponse>, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        state.metrics.record_invalid();
        ApiError::BadRequest(format!("invalid JSON: {e}"))
    })?;

    let Some(raw) = value.get("number") else {
        state.metrics.record_invalid();
        return Err(ApiError::BadRequest("missing field 'number'".into()));
    };

    // as_i64 weeds out floats and oversized integers; the upper bound
    // keeps the successor within SQLite's 64-bit INTEGER.
    let number = match raw.as_i64() {
        Some(n) if (0..i64::MAX).contains(&n) => n,
        _ => {
            state.metrics.record_invalid();
            return Err(ApiError::BadRequest(
                "field 'number' must be a non-negative integer".into(),
            ));
        }
    };

    match state.processor.process(number) {
        ProcessOutcome::Accepted(message) => {
            state.metrics.record_accepted();
            Ok(Json(ProcessNumberResponse { message }))
        }
        ProcessOutcome::Rejected(message) => {
            state.metrics.record_rejected();
            Err(ApiError::Rejected(message))
        }
    }
}

/// GET /health
/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy"
    }))
}

/// Response for stats endpoint.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub uptime_secs: f64,
    pub accepted_total: u64,
    pub rejected_total: u64,
    pub invalid_total: u64,
}

/// GET /stats
/// Process-local request counters.
pub async fn get_stats<S: NumberStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let metrics = &state.metrics;

    let uptime_secs = metrics
        .start_time
        .get()
        .map(|t| t.elapsed().as_secs_f64())
        .unwrap_or(0.0);

    Json(StatsResponse {
        uptime_secs,
        accepted_total: metrics.accepted_total.load(Ordering::Relaxed),
        rejected_total: metrics.rejected_total.load(Ordering::Relaxed),
        invalid_total: metrics.invalid_total.load(Ordering::Relaxed),
    })
}
