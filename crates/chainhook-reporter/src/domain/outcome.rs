//! # Report Outcomes
//!
//! Per-proposal results and the aggregated result of one webhook delivery.

use crate::domain::{PipelineError, ProposalId, ReportError, ReportRow};
use serde::Serialize;

/// Successful end state of one report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Ledger read and sink append both completed.
    Reported(ReportRow),
    /// Skipped because the proposal was already claimed by the dedup set.
    AlreadyReported,
}

/// Outcome of one extracted proposal id.
#[derive(Clone, Debug)]
pub struct ProposalOutcome {
    pub proposal_id: ProposalId,
    pub result: Result<ReportOutcome, ReportError>,
}

impl ProposalOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Overall status of a delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Every proposal succeeded (vacuously true for zero proposals).
    Success,
    /// At least one proposal succeeded and at least one failed.
    PartialFailure,
    /// Every proposal failed.
    Failed,
}

/// Aggregated result of [`crate::WebhookPipeline::handle_webhook`].
#[derive(Clone, Debug, Default)]
pub struct PipelineResult {
    outcomes: Vec<ProposalOutcome>,
}

impl PipelineResult {
    pub fn new(outcomes: Vec<ProposalOutcome>) -> Self {
        Self { outcomes }
    }

    /// Outcomes in payload traversal order.
    pub fn outcomes(&self) -> &[ProposalOutcome] {
        &self.outcomes
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ProposalOutcome::is_success)
    }

    pub fn status(&self) -> PipelineStatus {
        let failed = self.failures().count();
        if failed == 0 {
            PipelineStatus::Success
        } else if failed == self.outcomes.len() {
            PipelineStatus::Failed
        } else {
            PipelineStatus::PartialFailure
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// Rows appended during this delivery.
    pub fn reported_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(ReportOutcome::Reported(row)) => Some(row),
            _ => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ReportOutcome::AlreadyReported)))
            .count()
    }

    /// Collapse into success or an aggregate [`PipelineError`].
    pub fn into_result(self) -> Result<PipelineSummary, PipelineError> {
        let summary = PipelineSummary::from(&self);
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        let failed: Vec<ReportError> = self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.err())
            .collect();

        if failed.is_empty() {
            Ok(summary)
        } else if succeeded == 0 {
            Err(PipelineError::Failed { failed })
        } else {
            Err(PipelineError::PartialFailure {
                reported: succeeded,
                failed,
            })
        }
    }
}

/// Counts for logging and responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub detected: usize,
    pub reported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl From<&PipelineResult> for PipelineSummary {
    fn from(result: &PipelineResult) -> Self {
        Self {
            detected: result.outcomes.len(),
            reported: result.reported_rows().count(),
            skipped: result.skipped_count(),
            failed: result.failures().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LedgerReadError, ReportRow};
    use chrono::Utc;

    fn ok(id: u64) -> ProposalOutcome {
        ProposalOutcome {
            proposal_id: ProposalId(id),
            result: Ok(ReportOutcome::Reported(ReportRow {
                proposal_id: ProposalId(id),
                proposer: "SP1".into(),
                yes_votes: 1,
                no_votes: 0,
                reported_at: Utc::now(),
            })),
        }
    }

    fn failed(id: u64) -> ProposalOutcome {
        ProposalOutcome {
            proposal_id: ProposalId(id),
            result: Err(ReportError::LedgerRead {
                proposal_id: ProposalId(id),
                source: LedgerReadError::Network("down".into()),
            }),
        }
    }

    #[test]
    fn test_empty_result_is_success() {
        let result = PipelineResult::default();
        assert!(result.is_success());
        assert_eq!(result.status(), PipelineStatus::Success);
        assert_eq!(result.into_result().unwrap().detected, 0);
    }

    #[test]
    fn test_partial_failure() {
        let result = PipelineResult::new(vec![ok(1), failed(2)]);
        assert!(!result.is_success());
        assert_eq!(result.status(), PipelineStatus::PartialFailure);

        match result.into_result() {
            Err(PipelineError::PartialFailure { reported, failed }) => {
                assert_eq!(reported, 1);
                assert_eq!(failed[0].proposal_id(), ProposalId(2));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_all_failed() {
        let result = PipelineResult::new(vec![failed(1), failed(2)]);
        assert_eq!(result.status(), PipelineStatus::Failed);
        assert!(matches!(
            result.into_result(),
            Err(PipelineError::Failed { ref failed }) if failed.len() == 2
        ));
    }

    #[test]
    fn test_summary_counts_skips() {
        let result = PipelineResult::new(vec![
            ok(1),
            ProposalOutcome {
                proposal_id: ProposalId(1),
                result: Ok(ReportOutcome::AlreadyReported),
            },
        ]);
        let summary = PipelineSummary::from(&result);
        assert_eq!(summary.detected, 2);
        assert_eq!(summary.reported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }
}
