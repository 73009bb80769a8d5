//! Stacks node ledger reader.
//!
//! Calls the vote manager's `get-proposal-data` read-only function through
//! the node's `/v2/contracts/call-read` endpoint and decodes the Clarity
//! result into a [`ProposalRecord`].

use super::truncate_body;
use crate::algorithms::ClarityValue;
use crate::domain::{
    LedgerReadError, ProposalId, ProposalRecord, StacksConfig, PROPOSAL_DATA_FUNCTION,
};
use crate::ports::outbound::LedgerReader;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ReadOnlyRequest<'a> {
    sender: &'a str,
    arguments: Vec<String>,
}

/// Body returned by `/v2/contracts/call-read`.
#[derive(Debug, Deserialize)]
pub struct ReadOnlyResponse {
    pub okay: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
}

/// Ledger reader backed by a Stacks node HTTP API.
pub struct StacksLedgerReader {
    client: Client,
    config: StacksConfig,
}

impl StacksLedgerReader {
    pub fn new(config: StacksConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: StacksConfig) -> Self {
        Self { client, config }
    }

    fn call_read_url(&self) -> String {
        format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.config.node_url,
            self.config.contract_address,
            self.config.contract_name,
            PROPOSAL_DATA_FUNCTION
        )
    }
}

#[async_trait]
impl LedgerReader for StacksLedgerReader {
    async fn read_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ProposalRecord, LedgerReadError> {
        let request = ReadOnlyRequest {
            sender: &self.config.sender_address,
            arguments: vec![ClarityValue::UInt(u128::from(proposal_id.get())).to_hex()],
        };

        let response = self
            .client
            .post(self.call_read_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerReadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerReadError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body: ReadOnlyResponse = response
            .json()
            .await
            .map_err(|e| LedgerReadError::Decode(e.to_string()))?;

        debug!(proposal_id = %proposal_id, okay = body.okay, "read-only call returned");
        decode_proposal(proposal_id, &body)
    }
}

/// Decode a read-only call response into a proposal record.
///
/// The result must be `(ok|some { proposer, yes-votes, no-votes })`, possibly
/// nested; `none` and `(err ..)` mean the proposal is unknown.
pub fn decode_proposal(
    proposal_id: ProposalId,
    response: &ReadOnlyResponse,
) -> Result<ProposalRecord, LedgerReadError> {
    if !response.okay {
        let cause = response
            .cause
            .clone()
            .unwrap_or_else(|| "read-only call rejected".to_string());
        return Err(LedgerReadError::Contract(cause));
    }

    let raw = response
        .result
        .as_deref()
        .ok_or_else(|| LedgerReadError::Decode("missing result".to_string()))?;
    let value =
        ClarityValue::from_hex(raw).map_err(|e| LedgerReadError::Decode(e.to_string()))?;

    let data = value
        .unwrap_ok_or_some()
        .ok_or(LedgerReadError::NotFound(proposal_id))?;

    let field = |name: &str| {
        data.field(name)
            .ok_or_else(|| LedgerReadError::Decode(format!("missing field `{name}`")))
    };

    let proposer = field("proposer")?
        .as_principal_address()
        .ok_or_else(|| LedgerReadError::Decode("`proposer` is not a principal".to_string()))?;
    let yes_votes = field("yes-votes")?
        .as_uint()
        .ok_or_else(|| LedgerReadError::Decode("`yes-votes` is not a uint".to_string()))?;
    let no_votes = field("no-votes")?
        .as_uint()
        .ok_or_else(|| LedgerReadError::Decode("`no-votes` is not a uint".to_string()))?;

    Ok(ProposalRecord {
        proposal_id,
        proposer,
        yes_votes,
        no_votes,
    })
}
