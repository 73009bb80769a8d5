//! # Event Extractor
//!
//! Walks an untrusted chainhook payload (blocks -> transactions -> events) and
//! yields the ids of executed proposals, in document order.
//!
//! Every level is navigated through `Option`: a missing or wrongly typed field
//! is a non-match, never an error.

use crate::domain::ProposalId;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Event type carrying contract logs.
pub const CONTRACT_EVENT_TYPE: &str = "contract_event";

/// Topic used by Clarity `print`.
pub const PRINT_TOPIC: &str = "print";

/// Print payload tag emitted by `execute-proposal`.
pub const PROPOSAL_EXECUTED: &str = "PROPOSAL_EXECUTED";

/// A matched event whose id could not be turned into a [`ProposalId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("proposal id is missing")]
    Missing,

    #[error("proposal id {0} is not an unsigned integer")]
    NotAnInteger(String),
}

/// Extract executed proposal ids from a chainhook payload.
///
/// Duplicates are preserved; deduplication is the report generator's concern.
pub fn extract_executed_proposal_ids(payload: &Value) -> Vec<ProposalId> {
    let mut ids = Vec::new();

    for (block_idx, block) in array_at(payload.get("chainhook"), "blocks").enumerate() {
        for (tx_idx, tx) in array_at(Some(block), "transactions").enumerate() {
            for event in array_at(Some(tx), "events") {
                let Some(raw_id) = executed_proposal_id(event) else {
                    continue;
                };

                match coerce_proposal_id(raw_id) {
                    Ok(id) => {
                        debug!(proposal_id = %id, block = block_idx, tx = tx_idx, "Matched PROPOSAL_EXECUTED");
                        ids.push(id);
                    }
                    Err(e) => {
                        warn!(block = block_idx, tx = tx_idx, error = %e, "Dropping PROPOSAL_EXECUTED event");
                    }
                }
            }
        }
    }

    ids
}

/// Iterate `parent[key]` when it is an array; anything else is empty.
fn array_at<'a>(parent: Option<&'a Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    parent
        .and_then(|p| p.get(key))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Return `contract_event.value.id.value` when the event is a PROPOSAL_EXECUTED print.
///
/// `Some(&Value::Null)` is returned for a match that carries no id so the caller
/// can log the dropped match.
fn executed_proposal_id(event: &Value) -> Option<&Value> {
    if event.get("type")?.as_str()? != CONTRACT_EVENT_TYPE {
        return None;
    }
    let contract_event = event.get("contract_event")?;
    if contract_event.get("topic")?.as_str()? != PRINT_TOPIC {
        return None;
    }
    let value = contract_event.get("value")?;
    if value.get("event")?.as_str()? != PROPOSAL_EXECUTED {
        return None;
    }

    Some(
        value
            .get("id")
            .and_then(|id| id.get("value"))
            .unwrap_or(&Value::Null),
    )
}

/// Coerce a JSON id into a [`ProposalId`].
///
/// Accepts unsigned integers, integral floats, decimal strings and Clarity
/// uint literals (`"u42"`).
pub fn coerce_proposal_id(raw: &Value) -> Result<ProposalId, CoercionError> {
    match raw {
        Value::Null => Err(CoercionError::Missing),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(ProposalId(v));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                    Ok(ProposalId(f as u64))
                }
                _ => Err(CoercionError::NotAnInteger(n.to_string())),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix('u').unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoercionError::NotAnInteger(format!("{s:?}")));
            }
            digits
                .parse()
                .map(ProposalId)
                .map_err(|_| CoercionError::NotAnInteger(format!("{s:?}")))
        }
        other => Err(CoercionError::NotAnInteger(other.to_string())),
    }
}
