//! # Reported Proposals
//!
//! Process-local record of proposals already reported, used to suppress
//! duplicate rows when the same execution event is delivered twice.
//!
//! A proposal is claimed before the ledger read and only marked reported
//! after the sink append succeeds. A report that fails or is cancelled
//! releases its claim when the [`ClaimGuard`] drops, so a redelivery can
//! retry it.

use crate::domain::ProposalId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimState {
    InFlight,
    Reported,
}

/// Concurrent set of claimed and reported proposal ids.
#[derive(Debug, Default)]
pub struct ReportedProposals {
    states: DashMap<ProposalId, ClaimState>,
}

impl ReportedProposals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a proposal for reporting.
    ///
    /// Returns `false` if it is already in flight or reported.
    pub fn claim(&self, proposal_id: ProposalId) -> bool {
        match self.states.entry(proposal_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ClaimState::InFlight);
                true
            }
        }
    }

    /// Claim a proposal, returning a guard that releases the claim on drop
    /// unless it is committed.
    pub fn try_claim(self: &Arc<Self>, proposal_id: ProposalId) -> Option<ClaimGuard> {
        self.claim(proposal_id).then(|| ClaimGuard {
            set: Arc::clone(self),
            proposal_id,
            committed: false,
        })
    }

    /// Drop an in-flight claim after a failed report.
    pub fn release(&self, proposal_id: ProposalId) {
        self.states
            .remove_if(&proposal_id, |_, state| *state == ClaimState::InFlight);
    }

    pub fn mark_reported(&self, proposal_id: ProposalId) {
        self.states.insert(proposal_id, ClaimState::Reported);
    }

    pub fn is_reported(&self, proposal_id: ProposalId) -> bool {
        self.states
            .get(&proposal_id)
            .is_some_and(|state| *state == ClaimState::Reported)
    }

    /// Number of proposals marked reported.
    pub fn reported_count(&self) -> usize {
        self.states
            .iter()
            .filter(|entry| *entry.value() == ClaimState::Reported)
            .count()
    }
}

/// In-flight claim on one proposal.
#[must_use = "dropping the guard releases the claim"]
#[derive(Debug)]
pub struct ClaimGuard {
    set: Arc<ReportedProposals>,
    proposal_id: ProposalId,
    committed: bool,
}

impl ClaimGuard {
    /// Mark the proposal reported and keep the claim.
    pub fn commit(mut self) {
        self.set.mark_reported(self.proposal_id);
        self.committed = true;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.committed {
            self.set.release(self.proposal_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let set = ReportedProposals::new();
        assert!(set.claim(ProposalId(1)));
        assert!(!set.claim(ProposalId(1)));
        assert!(set.claim(ProposalId(2)));
    }

    #[test]
    fn test_release_allows_retry() {
        let set = ReportedProposals::new();
        assert!(set.claim(ProposalId(1)));
        set.release(ProposalId(1));
        assert!(set.claim(ProposalId(1)));
    }

    #[test]
    fn test_release_keeps_reported() {
        let set = ReportedProposals::new();
        assert!(set.claim(ProposalId(4)));
        set.mark_reported(ProposalId(4));
        set.release(ProposalId(4));

        assert!(set.is_reported(ProposalId(4)));
        assert!(!set.claim(ProposalId(4)));
        assert_eq!(set.reported_count(), 1);
    }

    #[test]
    fn test_dropped_guard_releases_claim() {
        let set = Arc::new(ReportedProposals::new());
        let guard = set.try_claim(ProposalId(6)).unwrap();
        assert!(set.try_claim(ProposalId(6)).is_none());

        drop(guard);
        assert!(!set.is_reported(ProposalId(6)));
        assert!(set.try_claim(ProposalId(6)).is_some());
    }

    #[test]
    fn test_committed_guard_keeps_claim() {
        let set = Arc::new(ReportedProposals::new());
        set.try_claim(ProposalId(6)).unwrap().commit();

        assert!(set.is_reported(ProposalId(6)));
        assert!(set.try_claim(ProposalId(6)).is_none());
    }
}
