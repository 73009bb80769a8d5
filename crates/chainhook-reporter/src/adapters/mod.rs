//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports against the Stacks node API, Google Sheets
//! and in-memory fakes.

pub mod google_auth;
mod memory;
mod sheets;
mod stacks_reader;
#[cfg(test)]
mod test_server;

pub use google_auth::{token_provider, ServiceAccountTokenProvider, StaticTokenProvider};
pub use memory::{InMemoryRecordSink, StaticLedgerReader, StaticTopicSource};
pub use sheets::{SheetsClient, ValueRange};
pub use stacks_reader::{decode_proposal, ReadOnlyResponse, StacksLedgerReader};

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Cut an upstream response body down for error messages.
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
