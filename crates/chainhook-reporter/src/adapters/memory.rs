//! In-memory adapters.
//!
//! Used by tests and local dry runs; each keeps call counters so callers can
//! assert which collaborators were touched.

use crate::domain::{
    LedgerReadError, ProposalId, ProposalRecord, ReportRow, SinkWriteError, TopicFetchError,
};
use crate::ports::outbound::{LedgerReader, RecordSink, TopicSource};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Ledger reader answering from a fixed table.
#[derive(Default)]
pub struct StaticLedgerReader {
    records: RwLock<HashMap<ProposalId, ProposalRecord>>,
    failures: RwLock<HashMap<ProposalId, LedgerReadError>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<ProposalId>>,
}

impl StaticLedgerReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader that knows the given records.
    pub fn with_records(records: impl IntoIterator<Item = ProposalRecord>) -> Self {
        let reader = Self::new();
        for record in records {
            reader.insert(record);
        }
        reader
    }

    /// Delay every read, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&self, record: ProposalRecord) {
        self.records.write().insert(record.proposal_id, record);
    }

    /// Make reads of `proposal_id` fail with `error`.
    pub fn fail_with(&self, proposal_id: ProposalId, error: LedgerReadError) {
        self.failures.write().insert(proposal_id, error);
    }

    /// Stop failing reads of `proposal_id`.
    pub fn recover(&self, proposal_id: ProposalId) {
        self.failures.write().remove(&proposal_id);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Proposal ids read so far, in call order.
    pub fn calls(&self) -> Vec<ProposalId> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LedgerReader for StaticLedgerReader {
    async fn read_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ProposalRecord, LedgerReadError> {
        self.calls.lock().push(proposal_id);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failures.read().get(&proposal_id) {
            return Err(err.clone());
        }

        self.records
            .read()
            .get(&proposal_id)
            .cloned()
            .ok_or(LedgerReadError::NotFound(proposal_id))
    }
}

/// Record sink collecting rows in memory.
#[derive(Default)]
pub struct InMemoryRecordSink {
    rows: Mutex<Vec<ReportRow>>,
    failures: RwLock<HashMap<ProposalId, SinkWriteError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make appends for `proposal_id` fail with `error`.
    pub fn fail_with(&self, proposal_id: ProposalId, error: SinkWriteError) {
        self.failures.write().insert(proposal_id, error);
    }

    /// Number of append attempts, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rows appended successfully.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordSink {
    async fn append(&self, row: &ReportRow) -> Result<(), SinkWriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failures.read().get(&row.proposal_id) {
            return Err(err.clone());
        }

        self.rows.lock().push(row.clone());
        Ok(())
    }
}

/// Topic source serving fixed rows.
pub struct StaticTopicSource {
    rows: Result<Vec<Vec<String>>, TopicFetchError>,
}

impl StaticTopicSource {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows: Ok(rows) }
    }

    pub fn failing(error: TopicFetchError) -> Self {
        Self { rows: Err(error) }
    }
}

#[async_trait]
impl TopicSource for StaticTopicSource {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, TopicFetchError> {
        self.rows.clone()
    }
}
