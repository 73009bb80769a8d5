//! # Outbound Ports
//!
//! Traits for external collaborators: the ledger, the record sink, the topics
//! sheet, OAuth tokens and wall-clock time.

use crate::domain::{
    AuthError, LedgerReadError, ProposalId, ProposalRecord, ReportRow, SinkWriteError,
    TopicFetchError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Side-effect-free ledger query for proposal totals.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Read the finalized state of a proposal.
    async fn read_proposal(&self, proposal_id: ProposalId)
        -> Result<ProposalRecord, LedgerReadError>;
}

/// Durable tabular store receiving one row per reported proposal.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append a row.
    async fn append(&self, row: &ReportRow) -> Result<(), SinkWriteError>;
}

/// Source of the raw voting topic rows (header row first).
#[async_trait]
pub trait TopicSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, TopicFetchError>;
}

/// Bearer token provider for Google APIs.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source_is_current() {
        let before = Utc::now();
        let now = SystemTimeSource.now();
        assert!(now >= before);
        assert!(now - before < chrono::Duration::seconds(5));
    }
}
