//! # Algorithms
//!
//! Pure logic: payload extraction and the Stacks wire formats.

pub mod c32;
pub mod clarity;
pub mod extractor;

pub use c32::{c32_address, c32_encode};
pub use clarity::{ClarityError, ClarityValue, StandardPrincipal};
pub use extractor::{coerce_proposal_id, extract_executed_proposal_ids, CoercionError};
