//! Reporter gateway service - wires adapters into the reporter and serves HTTP.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::metrics::ReporterMetrics;
use crate::middleware::WebhookSecretLayer;
use crate::routes::{chainhook, health, topics, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chainhook_reporter::adapters::{token_provider, SheetsClient, StacksLedgerReader};
use chainhook_reporter::{
    AccessTokenProvider, ReportGenerator, ReporterConfig, SystemTimeSource, TopicsService,
    WebhookPipeline,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Reporter gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayService {
    /// Build the service with the Stacks and Google Sheets adapters.
    pub fn new(config: GatewayConfig, reporter: ReporterConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GatewayError::Adapter(e.to_string()))?;

        let ledger = Arc::new(StacksLedgerReader::with_client(
            client.clone(),
            reporter.stacks.clone(),
        ));

        let tokens: Option<Arc<dyn AccessTokenProvider>> = match &reporter.sheets.credentials {
            Some(credentials) => Some(
                token_provider(client.clone(), credentials)
                    .map_err(|e| GatewayError::Adapter(e.to_string()))?,
            ),
            None => {
                warn!("No Google credentials configured - Sheets requests will be unauthenticated");
                None
            }
        };
        let sheets = Arc::new(SheetsClient::new(client, reporter.sheets.clone(), tokens));

        let generator = ReportGenerator::new(
            ledger,
            sheets.clone(),
            Arc::new(SystemTimeSource),
            reporter.reporting.clone(),
        );

        let contract = format!(
            "{}.{}",
            reporter.stacks.contract_address, reporter.stacks.contract_name
        );
        info!(
            network = ?reporter.stacks.network,
            contract = %contract,
            reports_range = %reporter.sheets.reports_range,
            concurrency = reporter.reporting.max_concurrent_reports,
            dedupe = reporter.reporting.dedupe_reported,
            "Reporter configured"
        );

        let state = AppState::new(
            Arc::new(WebhookPipeline::new(Arc::new(generator))),
            Arc::new(TopicsService::new(sheets)),
        );
        Ok(Self::with_state(config, state))
    }

    /// Build the service around existing ports.
    pub fn with_state(config: GatewayConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<ReporterMetrics> {
        Arc::clone(&self.state.metrics)
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        build_router(&self.config, self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn start(self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.config.webhook_secret.is_none() {
            warn!("CHAINHOOK_WEBHOOK_SECRET not set - webhook secret check disabled");
        }

        let addr = listener.local_addr()?;
        info!(addr = %addr, "Starting HTTP server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Reporter gateway stopped");
        Ok(())
    }
}

/// Build the router for `state`.
///
/// The webhook secret only guards `POST /chainhook`.
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let secret_layer = WebhookSecretLayer::new(config.webhook_secret.clone())
        .with_metrics(Arc::clone(&state.metrics));

    let webhook = Router::new()
        .route("/chainhook", post(chainhook::handle_chainhook))
        .route_layer(secret_layer);

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    Router::new()
        .merge(webhook)
        .route("/api/voting-topics", get(topics::list_voting_topics))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .layer(middleware)
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
