//! # Domain Entities
//!
//! Proposal identifiers, ledger snapshots, report rows and voting topics.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Proposal identifier assigned by the vote-manager contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl ProposalId {
    /// Raw integer value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProposalId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Snapshot of a proposal as returned by `get-proposal-data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRecord {
    /// Proposal the snapshot belongs to.
    pub proposal_id: ProposalId,
    /// Proposer principal, rendered as a Stacks address.
    pub proposer: String,
    /// Total yes votes.
    pub yes_votes: u128,
    /// Total no votes.
    pub no_votes: u128,
}

/// One durable output row per reported proposal.
///
/// Column order on the wire: `[proposalId, proposer, yesVotes, noVotes, reportedAt]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub proposal_id: ProposalId,
    pub proposer: String,
    pub yes_votes: u128,
    pub no_votes: u128,
    pub reported_at: DateTime<Utc>,
}

impl ReportRow {
    /// Shape a ledger snapshot into a row stamped with `reported_at`.
    pub fn from_record(record: ProposalRecord, reported_at: DateTime<Utc>) -> Self {
        Self {
            proposal_id: record.proposal_id,
            proposer: record.proposer,
            yes_votes: record.yes_votes,
            no_votes: record.no_votes,
            reported_at,
        }
    }

    /// Row cells in sink column order.
    ///
    /// Vote counts that do not fit a JSON number are written as decimal strings.
    pub fn to_cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.proposal_id.get()),
            Value::from(self.proposer.clone()),
            uint_cell(self.yes_votes),
            uint_cell(self.no_votes),
            Value::from(self.reported_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ]
    }
}

fn uint_cell(value: u128) -> Value {
    match u64::try_from(value) {
        Ok(v) => Value::from(v),
        Err(_) => Value::from(value.to_string()),
    }
}

/// A voting topic published from the topics sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingTopic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` when the sheet cell is not an integer.
    pub duration_blocks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VotingTopic {
    /// Map a sheet row laid out as `[Title, Duration (blocks), Category, Description]`.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |idx: usize| row.get(idx).cloned();
        Self {
            title: cell(0),
            duration_blocks: row.get(1).and_then(|v| parse_leading_integer(v)),
            category: cell(2),
            description: cell(3),
        }
    }
}

/// Parse the leading decimal digits of a cell ("144 blocks" -> 144).
fn parse_leading_integer(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
