//! # Inbound Ports
//!
//! API traits defining what the reporter can do for the HTTP layer.

use crate::domain::{
    PipelineResult, ProposalId, ReportError, ReportOutcome, TopicFetchError, VotingTopic,
};
use async_trait::async_trait;
use serde_json::Value;

/// Chainhook reporting API - inbound port.
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Process one webhook delivery. Never fails; failures are in the result.
    async fn handle_webhook(&self, payload: &Value) -> PipelineResult;

    /// Report a single proposal (read, shape, append).
    async fn generate_report(&self, proposal_id: ProposalId)
        -> Result<ReportOutcome, ReportError>;
}

/// Voting topics API - inbound port.
#[async_trait]
pub trait TopicsApi: Send + Sync {
    /// Topics below the header row of the topics sheet.
    async fn list_topics(&self) -> Result<Vec<VotingTopic>, TopicFetchError>;
}
