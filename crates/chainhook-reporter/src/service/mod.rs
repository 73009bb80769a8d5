//! # Services
//!
//! Inbound port implementations wired to the outbound ports.

pub mod dedup;
pub mod pipeline;
pub mod report_generator;
pub mod topics;

pub use dedup::{ClaimGuard, ReportedProposals};
pub use pipeline::WebhookPipeline;
pub use report_generator::ReportGenerator;
pub use topics::TopicsService;
