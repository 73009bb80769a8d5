//! # Chainhook Proposal Reporter
//!
//! Turns chainhook deliveries into proposal report rows.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! When the vote manager contract prints a `PROPOSAL_EXECUTED` event, the
//! reporter:
//! - extracts the executed proposal ids from the delivery payload
//! - reads each proposal's final totals from the ledger (read-only call)
//! - appends one timestamped row per proposal to the record sink
//!
//! Partial failures are reported, never swallowed: every extracted id is
//! attempted and the delivery result says which ones failed and at which stage.
//!
//! ## Module Structure
//!
//! ```text
//! chainhook-reporter/
//! ├── domain/          # ProposalId, ReportRow, errors, outcomes, config
//! ├── algorithms/      # Event extraction, Clarity codec, c32 addresses
//! ├── ports/           # ReportingApi, TopicsApi, LedgerReader, RecordSink
//! ├── service/         # ReportGenerator, WebhookPipeline, TopicsService
//! └── adapters/        # Stacks node, Google Sheets, in-memory fakes
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{coerce_proposal_id, extract_executed_proposal_ids, ClarityValue};
pub use domain::{
    ConfigError, GoogleCredentials, LedgerReadError, PipelineError, PipelineResult,
    PipelineStatus, PipelineSummary, ProposalId, ProposalOutcome, ProposalRecord,
    ReportError, ReportOutcome, ReportRow, ReportStage, ReporterConfig, ReportingConfig,
    SheetsConfig, SinkWriteError, StacksConfig, StacksNetwork, TopicFetchError, VotingTopic,
};
pub use ports::{
    AccessTokenProvider, LedgerReader, RecordSink, ReportingApi, SystemTimeSource, TimeSource,
    TopicSource, TopicsApi,
};
pub use service::{ReportGenerator, ReportedProposals, TopicsService, WebhookPipeline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
