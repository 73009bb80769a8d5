//! # Report Generator
//!
//! Reports one executed proposal: read its final totals from the ledger,
//! shape them into a [`ReportRow`] stamped with the current time, and append
//! the row to the record sink.
//!
//! The sink is only touched after a successful read. Each stage runs under
//! its own timeout.

use crate::domain::{
    LedgerReadError, ProposalId, ReportError, ReportOutcome, ReportRow, ReportingConfig,
    SinkWriteError,
};
use crate::ports::outbound::{LedgerReader, RecordSink, TimeSource};
use crate::service::ReportedProposals;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Per-proposal reporting service.
pub struct ReportGenerator {
    ledger: Arc<dyn LedgerReader>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn TimeSource>,
    config: ReportingConfig,
    reported: Option<Arc<ReportedProposals>>,
}

impl ReportGenerator {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        sink: Arc<dyn RecordSink>,
        clock: Arc<dyn TimeSource>,
        config: ReportingConfig,
    ) -> Self {
        let reported = config
            .dedupe_reported
            .then(|| Arc::new(ReportedProposals::new()));
        Self {
            ledger,
            sink,
            clock,
            config,
            reported,
        }
    }

    pub fn config(&self) -> &ReportingConfig {
        &self.config
    }

    /// Read, shape and append the report for `proposal_id`.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn generate(&self, proposal_id: ProposalId) -> Result<ReportOutcome, ReportError> {
        // Held across the awaits below: failure or cancellation drops it and
        // releases the claim.
        let claim = match &self.reported {
            Some(reported) => match reported.try_claim(proposal_id) {
                Some(claim) => Some(claim),
                None => {
                    debug!("proposal already reported, skipping");
                    return Ok(ReportOutcome::AlreadyReported);
                }
            },
            None => None,
        };

        let row = self.read_and_append(proposal_id).await?;
        if let Some(claim) = claim {
            claim.commit();
        }

        Ok(ReportOutcome::Reported(row))
    }

    async fn read_and_append(&self, proposal_id: ProposalId) -> Result<ReportRow, ReportError> {
        let ledger_timeout = self.config.ledger_timeout;
        let record = tokio::time::timeout(ledger_timeout, self.ledger.read_proposal(proposal_id))
            .await
            .map_err(|_| LedgerReadError::Timeout(ledger_timeout))
            .and_then(|read| read)
            .map_err(|source| {
                warn!(error = %source, "ledger read failed");
                ReportError::LedgerRead {
                    proposal_id,
                    source,
                }
            })?;

        // Totals are taken from the ledger, never from the event payload.
        let row = ReportRow::from_record(record, self.clock.now());
        if row.proposal_id != proposal_id {
            debug!(returned = %row.proposal_id, "ledger returned a different proposal id");
        }
        let row = ReportRow { proposal_id, ..row };

        let sink_timeout = self.config.sink_timeout;
        tokio::time::timeout(sink_timeout, self.sink.append(&row))
            .await
            .map_err(|_| SinkWriteError::Timeout(sink_timeout))
            .and_then(|append| append)
            .map_err(|source| {
                warn!(error = %source, "sink append failed");
                ReportError::SinkWrite {
                    proposal_id,
                    source,
                }
            })?;

        info!(
            proposer = %row.proposer,
            yes_votes = %row.yes_votes,
            no_votes = %row.no_votes,
            "proposal reported"
        );
        Ok(row)
    }
}
