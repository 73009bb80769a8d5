//! # Webhook Pipeline
//!
//! Handles one chainhook delivery: extract executed proposal ids, report each
//! one, and aggregate the outcomes.
//!
//! Every extracted id is attempted even when earlier ones fail. Reports run
//! sequentially unless `max_concurrent_reports` is raised; outcomes keep
//! payload order either way.

use crate::algorithms::extract_executed_proposal_ids;
use crate::domain::{
    PipelineResult, PipelineStatus, ProposalId, ProposalOutcome, ReportError, ReportOutcome,
};
use crate::ports::inbound::ReportingApi;
use crate::service::ReportGenerator;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Chainhook webhook pipeline.
#[derive(Clone)]
pub struct WebhookPipeline {
    generator: Arc<ReportGenerator>,
}

impl WebhookPipeline {
    pub fn new(generator: Arc<ReportGenerator>) -> Self {
        Self { generator }
    }

    fn concurrency(&self) -> usize {
        self.generator.config().max_concurrent_reports.max(1)
    }
}

#[async_trait]
impl ReportingApi for WebhookPipeline {
    async fn handle_webhook(&self, payload: &Value) -> PipelineResult {
        let proposal_ids = extract_executed_proposal_ids(payload);

        if proposal_ids.is_empty() {
            debug!("no executed proposals in delivery");
            return PipelineResult::default();
        }

        info!(count = proposal_ids.len(), "detected executed proposals");

        let outcomes: Vec<ProposalOutcome> = stream::iter(proposal_ids)
            .map(|proposal_id| async move {
                ProposalOutcome {
                    proposal_id,
                    result: self.generator.generate(proposal_id).await,
                }
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        for outcome in &outcomes {
            match &outcome.result {
                Ok(ReportOutcome::Reported(_)) => {}
                Ok(ReportOutcome::AlreadyReported) => {
                    debug!(proposal_id = %outcome.proposal_id, "skipped duplicate report")
                }
                Err(err) => error!(
                    proposal_id = %outcome.proposal_id,
                    stage = %err.stage(),
                    transient = err.is_transient(),
                    error = %err,
                    "proposal report failed"
                ),
            }
        }

        let result = PipelineResult::new(outcomes);
        match result.status() {
            PipelineStatus::Success => info!("delivery processed"),
            status => warn!(
                ?status,
                failed = result.failures().count(),
                total = result.outcomes().len(),
                "delivery processed with failures"
            ),
        }
        result
    }

    async fn generate_report(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ReportOutcome, ReportError> {
        self.generator.generate(proposal_id).await
    }
}
