//! Reporter Gateway - HTTP surface for the chainhook proposal reporter.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    REPORTER GATEWAY                        │
//! ├───────────────────────────────────────────────────────────┤
//! │  POST /chainhook        GET /api/voting-topics             │
//! │  GET  /health           GET /metrics                       │
//! │                                                            │
//! │  Middleware: Trace → BodyLimit → WebhookSecret (webhook)   │
//! └──────────────┬───────────────────────────┬────────────────┘
//!                │                           │
//!          ReportingApi                  TopicsApi
//!                │                           │
//!      WebhookPipeline ──→ ReportGenerator   TopicsService
//!                │                │                │
//!        Stacks read-only    Sheets append    Sheets values
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use reporter_gateway::{GatewayConfig, GatewayService};
//! use chainhook_reporter::ReporterConfig;
//!
//! let service = GatewayService::new(GatewayConfig::from_env()?, ReporterConfig::from_env()?)?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod telemetry;

// Re-exports
pub use config::{GatewayConfig, LogConfig, DEFAULT_MAX_BODY_BYTES};
pub use error::{ApiError, ApiResult, ErrorResponse, GatewayError, ReportingFailure};
pub use metrics::ReporterMetrics;
pub use middleware::{WebhookSecretLayer, SECRET_HEADER};
pub use routes::AppState;
pub use service::{build_router, GatewayService};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
