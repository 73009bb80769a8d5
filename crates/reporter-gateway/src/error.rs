//! Gateway error types.
//!
//! [`GatewayError`] covers startup and serving; [`ApiError`] is what handlers
//! return and maps to HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chainhook_reporter::{
    PipelineError, PipelineStatus, PipelineSummary, ProposalId, ReportStage,
};
use serde::Serialize;
use thiserror::Error;

/// Gateway startup / runtime errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// An outbound adapter could not be built
    #[error("adapter setup failed: {0}")]
    Adapter(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Logging could not be initialised
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// The server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Message returned whenever a delivery could not be fully reported.
pub const REPORTING_FAILED_MESSAGE: &str = "Internal Server Error during Chainhook processing.";

/// HTTP-facing errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    /// At least one proposal report failed.
    #[error("{}", REPORTING_FAILED_MESSAGE)]
    Reporting(ReportingFailure),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// One failed proposal in a [`ReportingFailure`].
#[derive(Debug, Clone, Serialize)]
pub struct FailedReport {
    pub proposal_id: ProposalId,
    pub stage: ReportStage,
    pub transient: bool,
    pub error: String,
}

/// Body of a `500` for a delivery with failed reports.
#[derive(Debug, Clone, Serialize)]
pub struct ReportingFailure {
    pub status: PipelineStatus,
    pub summary: PipelineSummary,
    pub failures: Vec<FailedReport>,
}

impl ReportingFailure {
    /// Describe a failed delivery from its aggregate error.
    pub fn new(summary: PipelineSummary, error: &PipelineError) -> Self {
        let status = match error {
            PipelineError::PartialFailure { .. } => PipelineStatus::PartialFailure,
            PipelineError::Failed { .. } => PipelineStatus::Failed,
        };
        Self {
            status,
            summary,
            failures: error
                .failures()
                .iter()
                .map(|err| FailedReport {
                    proposal_id: err.proposal_id(),
                    stage: err.stage(),
                    transient: err.is_transient(),
                    error: err.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ReportingFailureBody<'a> {
    error: &'static str,
    code: &'static str,
    #[serde(flatten)]
    detail: &'a ReportingFailure,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized => {
                let body = ErrorResponse {
                    error: "Unauthorized".to_string(),
                    code: "UNAUTHORIZED".to_string(),
                };
                let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Reporting(detail) => {
                let code = match detail.status {
                    PipelineStatus::PartialFailure => "PARTIAL_FAILURE",
                    _ => "REPORTING_FAILED",
                };
                let body = ReportingFailureBody {
                    error: REPORTING_FAILED_MESSAGE,
                    code,
                    detail: &detail,
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;
