//! # Domain Errors
//!
//! Error types for ledger reads, sink writes, topic fetches and report generation.

use crate::domain::ProposalId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Ledger Reader failures.
#[derive(Debug, Clone, Error)]
pub enum LedgerReadError {
    /// Transport failure talking to the Stacks node.
    #[error("Network error: {0}")]
    Network(String),

    /// Node answered with a non-success HTTP status.
    #[error("Node returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The read-only call was rejected by the contract (`okay: false`).
    #[error("Contract call failed: {0}")]
    Contract(String),

    /// The result could not be decoded into a proposal record.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The contract returned `none` or `(err ...)` for the proposal.
    #[error("Proposal {0} not found on ledger")]
    NotFound(ProposalId),

    /// The call did not finish in time.
    #[error("Ledger read timed out after {0:?}")]
    Timeout(Duration),
}

impl LedgerReadError {
    /// Whether a redelivery of the same event may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Contract(_) | Self::Decode(_) | Self::NotFound(_) => false,
        }
    }
}

/// Record Sink failures.
#[derive(Debug, Clone, Error)]
pub enum SinkWriteError {
    /// Transport failure talking to the sink.
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials were missing, expired or rejected.
    #[error("Sink authentication failed: {0}")]
    Auth(String),

    /// The sink answered with a non-success HTTP status.
    #[error("Sink rejected append with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The append did not finish in time.
    #[error("Sink append timed out after {0:?}")]
    Timeout(Duration),
}

impl SinkWriteError {
    /// Whether a redelivery of the same event may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Auth(_) => false,
        }
    }
}

/// Topic listing failures.
#[derive(Debug, Clone, Error)]
pub enum TopicFetchError {
    /// The sheet has no data rows below the header.
    #[error("No active voting topics found")]
    Empty,

    /// The source could not be read.
    #[error("Topic source unavailable: {0}")]
    Unavailable(String),
}

/// Access token acquisition failures.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The configured credentials are unusable.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The token endpoint refused the assertion or answered garbage.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The token endpoint could not be reached or is overloaded.
    #[error("Token endpoint unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Whether a later attempt may obtain a token.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<AuthError> for SinkWriteError {
    fn from(err: AuthError) -> Self {
        if err.is_transient() {
            Self::Network(err.to_string())
        } else {
            Self::Auth(err.to_string())
        }
    }
}

/// Report pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    /// Step 1: read-only ledger query.
    LedgerRead,
    /// Step 3: append to the record sink.
    SinkWrite,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LedgerRead => write!(f, "ledger_read"),
            Self::SinkWrite => write!(f, "sink_write"),
        }
    }
}

/// Failure of a single proposal report.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// Step 1 failed; the sink was never touched.
    #[error("proposal {proposal_id}: ledger read failed: {source}")]
    LedgerRead {
        /// Proposal being reported
        proposal_id: ProposalId,
        /// Underlying reader error
        #[source]
        source: LedgerReadError,
    },

    /// Step 3 failed after a successful read; the read result was discarded.
    #[error("proposal {proposal_id}: sink write failed: {source}")]
    SinkWrite {
        /// Proposal being reported
        proposal_id: ProposalId,
        /// Underlying sink error
        #[source]
        source: SinkWriteError,
    },
}

impl ReportError {
    /// Proposal the failure belongs to.
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            Self::LedgerRead { proposal_id, .. } | Self::SinkWrite { proposal_id, .. } => {
                *proposal_id
            }
        }
    }

    /// Stage that failed.
    pub fn stage(&self) -> ReportStage {
        match self {
            Self::LedgerRead { .. } => ReportStage::LedgerRead,
            Self::SinkWrite { .. } => ReportStage::SinkWrite,
        }
    }

    /// Whether the failing stage reported a transient condition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LedgerRead { source, .. } => source.is_transient(),
            Self::SinkWrite { source, .. } => source.is_transient(),
        }
    }
}

/// Aggregate failure of a webhook delivery.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Some proposals were reported, others failed.
    #[error("{} proposal reports failed, {reported} reported", .failed.len())]
    PartialFailure {
        /// Number of proposals whose side effects were committed
        reported: usize,
        /// Failed reports in payload order
        failed: Vec<ReportError>,
    },

    /// Every extracted proposal failed.
    #[error("all {} proposal reports failed", .failed.len())]
    Failed {
        /// Failed reports in payload order
        failed: Vec<ReportError>,
    },
}

impl PipelineError {
    /// Failed reports in payload order.
    pub fn failures(&self) -> &[ReportError] {
        match self {
            Self::PartialFailure { failed, .. } | Self::Failed { failed } => failed,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Required variable is not set.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// Variable is set but unusable.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Setting name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
