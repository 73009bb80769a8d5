//! Reporter counters, exported as JSON at `/metrics`.

use chainhook_reporter::{PipelineResult, ReportStage};
use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery and report counters
#[derive(Default)]
pub struct ReporterMetrics {
    // Delivery counters
    pub deliveries_total: AtomicU64,
    pub deliveries_failed: AtomicU64,
    pub deliveries_rejected: AtomicU64,

    // Per-proposal counters
    pub proposals_detected: AtomicU64,
    pub proposals_reported: AtomicU64,
    pub proposals_skipped: AtomicU64,
    pub ledger_read_failures: AtomicU64,
    pub sink_write_failures: AtomicU64,

    // Topics endpoint
    pub topic_requests: AtomicU64,
    pub topic_errors: AtomicU64,
}

impl ReporterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed delivery
    pub fn record_delivery(&self, result: &PipelineResult) {
        self.deliveries_total.fetch_add(1, Ordering::Relaxed);
        if !result.is_success() {
            self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
        }

        self.proposals_detected
            .fetch_add(result.outcomes().len() as u64, Ordering::Relaxed);
        self.proposals_reported
            .fetch_add(result.reported_rows().count() as u64, Ordering::Relaxed);
        self.proposals_skipped
            .fetch_add(result.skipped_count() as u64, Ordering::Relaxed);

        for failure in result.failures() {
            match failure.stage() {
                ReportStage::LedgerRead => &self.ledger_read_failures,
                ReportStage::SinkWrite => &self.sink_write_failures,
            }
            .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a delivery refused before processing (bad secret, unparsable body)
    pub fn record_rejected_delivery(&self) {
        self.deliveries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_topic_request(&self, success: bool) {
        self.topic_requests.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.topic_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "deliveries": {
                "total": self.deliveries_total.load(Ordering::Relaxed),
                "failed": self.deliveries_failed.load(Ordering::Relaxed),
                "rejected": self.deliveries_rejected.load(Ordering::Relaxed),
            },
            "proposals": {
                "detected": self.proposals_detected.load(Ordering::Relaxed),
                "reported": self.proposals_reported.load(Ordering::Relaxed),
                "skipped": self.proposals_skipped.load(Ordering::Relaxed),
                "ledger_read_failures": self.ledger_read_failures.load(Ordering::Relaxed),
                "sink_write_failures": self.sink_write_failures.load(Ordering::Relaxed),
            },
            "topics": {
                "requests": self.topic_requests.load(Ordering::Relaxed),
                "errors": self.topic_errors.load(Ordering::Relaxed),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainhook_reporter::{
        ProposalId, ProposalOutcome, ReportError, ReportOutcome, SinkWriteError,
    };

    #[test]
    fn test_record_delivery() {
        let metrics = ReporterMetrics::new();
        let result = PipelineResult::new(vec![
            ProposalOutcome {
                proposal_id: ProposalId(1),
                result: Ok(ReportOutcome::AlreadyReported),
            },
            ProposalOutcome {
                proposal_id: ProposalId(2),
                result: Err(ReportError::SinkWrite {
                    proposal_id: ProposalId(2),
                    source: SinkWriteError::Network("reset".into()),
                }),
            },
        ]);

        metrics.record_delivery(&result);
        metrics.record_delivery(&PipelineResult::default());

        let json = metrics.to_json();
        assert_eq!(json["deliveries"]["total"], 2);
        assert_eq!(json["deliveries"]["failed"], 1);
        assert_eq!(json["proposals"]["detected"], 2);
        assert_eq!(json["proposals"]["skipped"], 1);
        assert_eq!(json["proposals"]["sink_write_failures"], 1);
        assert_eq!(json["proposals"]["ledger_read_failures"], 0);
    }

    #[test]
    fn test_topic_counters() {
        let metrics = ReporterMetrics::new();
        metrics.record_topic_request(true);
        metrics.record_topic_request(false);
        assert_eq!(metrics.topic_requests.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.topic_errors.load(Ordering::Relaxed), 1);
    }
}
