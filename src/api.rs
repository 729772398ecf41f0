//! REST API for generating, exporting and verifying mortgage ledgers
//!
//! Each request builds its own ledger; nothing is shared or kept between
//! requests apart from request statistics.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{self, header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::amortization::{build_ledger, LoanSummary, LoanTerms};
use crate::blockchain::verify_records;
use crate::error::LedgerError;
use crate::export::{to_csv, BlockRecord, DEFAULT_HASH_PREVIEW_LEN};

/// Shared server state
#[derive(Clone)]
pub struct ApiState {
    hash_preview_len: usize,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    ledgers_generated: u64,
    ledgers_verified: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl ApiState {
    pub fn new(hash_preview_len: usize) -> Self {
        Self {
            hash_preview_len,
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_PREVIEW_LEN)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    LedgerError(LedgerError),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::LedgerError(e @ LedgerError::InvalidLoanTerms(_))
            | ApiError::LedgerError(e @ LedgerError::NonFiniteValue { .. })
            | ApiError::LedgerError(e @ LedgerError::InvalidPayload(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::LedgerError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::LedgerError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid loan terms: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct LedgerResponse {
    pub summary: LoanSummary,
    pub blocks: Vec<BlockRecord>,
}

#[derive(Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub ledgers_generated: u64,
    pub ledgers_verified: u64,
    pub uptime_seconds: u64,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    state.api_stats.write().await.record_request(success);

    response
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        .route("/ledger", post(generate_ledger))
        .route("/ledger/csv", post(generate_ledger_csv))
        .route("/ledger/verify", post(verify_ledger))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), stats_middleware))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Serve the API on `0.0.0.0:port` until the process exits.
pub async fn run_api_server(state: ApiState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "api.listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_api_stats(State(state): State<ApiState>) -> impl IntoResponse {
    let stats = state.api_stats.read().await;
    Json(ApiStatsResponse {
        total_requests: stats.total_requests,
        successful_requests: stats.successful_requests,
        failed_requests: stats.failed_requests,
        ledgers_generated: stats.ledgers_generated,
        ledgers_verified: stats.ledgers_verified,
        uptime_seconds: stats.start_time.map_or(0, |t| t.elapsed().as_secs()),
    })
}

/// Amortize and seal off the async runtime; hashing a long schedule is
/// CPU-bound.
async fn seal(terms: LoanTerms) -> Result<(Vec<BlockRecord>, LoanSummary), ApiError> {
    let (ledger, summary) = tokio::task::spawn_blocking(move || build_ledger(&terms))
        .await
        .map_err(|e| ApiError::InternalError(format!("ledger task failed: {}", e)))??;
    Ok((ledger.records(), summary))
}

async fn generate_ledger(
    State(state): State<ApiState>,
    body: Result<Json<LoanTerms>, JsonRejection>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let Json(terms) = body?;
    let (blocks, summary) = seal(terms).await?;
    state.api_stats.write().await.ledgers_generated += 1;
    Ok(Json(LedgerResponse { summary, blocks }))
}

async fn generate_ledger_csv(
    State(state): State<ApiState>,
    body: Result<Json<LoanTerms>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(terms) = body?;
    let (blocks, _) = seal(terms).await?;
    state.api_stats.write().await.ledgers_generated += 1;

    let csv = to_csv(&blocks, state.hash_preview_len);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"mortgage_ledger.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

async fn verify_ledger(
    State(state): State<ApiState>,
    Json(records): Json<Vec<BlockRecord>>,
) -> Json<VerifyResponse> {
    state.api_stats.write().await.ledgers_verified += 1;

    let length = records.len();
    match verify_records(&records) {
        Ok(_) => Json(VerifyResponse {
            valid: true,
            length,
            error: None,
        }),
        Err(e) => Json(VerifyResponse {
            valid: false,
            length,
            error: Some(e.to_string()),
        }),
    }
}
