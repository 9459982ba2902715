//! Proposal records, voting state machine, and the proposal store.
//!
//! A proposal moves from `Open` to exactly one of the terminal states
//! `Executed` or `Expired`. Vote counts are public plaintext by
//! design; the requested and executed amounts stay ciphertext-side.

use crate::ciphertext::CiphertextHandle;
use crate::error::{Result, TreasuryError};
use crate::types::{PrincipalId, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Status of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Open for voting and execution
    Open,
    /// Executed through the branchless homomorphic path; terminal.
    /// Whether funds actually moved is only knowable after an
    /// authorized decrypt.
    Executed,
    /// Voting window elapsed without execution; terminal
    Expired,
}

/// A disbursement proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique monotonically increasing identifier
    pub id: ProposalId,
    /// The member who created the proposal
    pub proposer: PrincipalId,
    /// The disbursement recipient; need not be a member
    pub recipient: PrincipalId,
    /// Requested amount, validated at creation
    pub requested_amount: CiphertextHandle,
    /// End of the voting window
    pub deadline: Timestamp,
    /// Number of yes votes cast
    pub yes_votes: u32,
    /// Number of no votes cast
    pub no_votes: u32,
    /// Members who have already voted
    voted: HashSet<PrincipalId>,
    /// Current status
    pub status: ProposalStatus,
    /// Encrypted zero until execution, then the homomorphically
    /// computed disbursed amount. Set exactly once.
    pub executed_amount: CiphertextHandle,
}

impl Proposal {
    fn new(
        id: ProposalId,
        proposer: PrincipalId,
        recipient: PrincipalId,
        requested_amount: CiphertextHandle,
        deadline: Timestamp,
        executed_amount: CiphertextHandle,
    ) -> Self {
        Self {
            id,
            proposer,
            recipient,
            requested_amount,
            deadline,
            yes_votes: 0,
            no_votes: 0,
            voted: HashSet::new(),
            status: ProposalStatus::Open,
            executed_amount,
        }
    }

    /// Whether the proposal is still open
    pub fn is_open(&self) -> bool {
        self.status == ProposalStatus::Open
    }

    /// Whether a member has already voted on this proposal
    pub fn has_voted(&self, member: &PrincipalId) -> bool {
        self.voted.contains(member)
    }

    /// Advance an open proposal past its deadline to `Expired`.
    /// Idempotent: returns true only on the transition itself.
    pub fn expire_if_stale(&mut self, now: Timestamp) -> bool {
        if self.status == ProposalStatus::Open && now > self.deadline {
            self.status = ProposalStatus::Expired;
            return true;
        }
        false
    }

    /// Count a vote. Double voting is prevented structurally by the
    /// voted set, not by timing.
    pub fn register_vote(&mut self, voter: PrincipalId, approve: bool) -> Result<()> {
        if !self.voted.insert(voter.clone()) {
            return Err(TreasuryError::AlreadyVoted(voter.to_string()));
        }
        if approve {
            self.yes_votes += 1;
        } else {
            self.no_votes += 1;
        }
        Ok(())
    }

    /// Public view of the proposal: everything except the ciphertext
    /// handles, which are read through their own accessors
    pub fn snapshot(&self) -> ProposalSnapshot {
        ProposalSnapshot {
            id: self.id,
            status: self.status,
            yes_votes: self.yes_votes,
            no_votes: self.no_votes,
            deadline: self.deadline,
            proposer: self.proposer.clone(),
            recipient: self.recipient.clone(),
        }
    }
}

/// Publicly observable proposal metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    /// Proposal identifier
    pub id: ProposalId,
    /// Current status
    pub status: ProposalStatus,
    /// Number of yes votes cast
    pub yes_votes: u32,
    /// Number of no votes cast
    pub no_votes: u32,
    /// End of the voting window
    pub deadline: Timestamp,
    /// The member who created the proposal
    pub proposer: PrincipalId,
    /// The disbursement recipient
    pub recipient: PrincipalId,
}

/// Store of all proposals, keyed by id
#[derive(Debug, Default)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: ProposalId,
}

impl ProposalStore {
    /// Create an empty store; the first proposal gets id 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new open proposal and return its id
    pub fn create(
        &mut self,
        proposer: PrincipalId,
        recipient: PrincipalId,
        requested_amount: CiphertextHandle,
        deadline: Timestamp,
        executed_amount: CiphertextHandle,
    ) -> ProposalId {
        let id = self.next_id;
        self.next_id += 1;
        self.proposals.insert(
            id,
            Proposal::new(
                id,
                proposer,
                recipient,
                requested_amount,
                deadline,
                executed_amount,
            ),
        );
        id
    }

    /// Look up a proposal
    pub fn get(&self, id: ProposalId) -> Result<&Proposal> {
        self.proposals
            .get(&id)
            .ok_or(TreasuryError::UnknownProposal(id))
    }

    /// Look up a proposal for mutation
    pub fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal> {
        self.proposals
            .get_mut(&id)
            .ok_or(TreasuryError::UnknownProposal(id))
    }

    /// Number of proposals ever created
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Whether any proposal has been created
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn open_proposal(store: &mut ProposalStore, window_secs: i64) -> ProposalId {
        store.create(
            PrincipalId::new("alice"),
            PrincipalId::new("carol"),
            CiphertextHandle::new(10),
            Utc::now() + Duration::seconds(window_secs),
            CiphertextHandle::new(11),
        )
    }

    #[test]
    fn test_ids_are_monotonic_from_zero() {
        let mut store = ProposalStore::new();
        assert_eq!(open_proposal(&mut store, 3600), 0);
        assert_eq!(open_proposal(&mut store, 3600), 1);
        assert_eq!(open_proposal(&mut store, 3600), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unknown_proposal() {
        let store = ProposalStore::new();
        assert_eq!(
            store.get(42).unwrap_err(),
            TreasuryError::UnknownProposal(42)
        );
    }

    #[test]
    fn test_register_vote_counts_once() {
        let mut store = ProposalStore::new();
        let id = open_proposal(&mut store, 3600);
        let proposal = store.get_mut(id).unwrap();
        let bob = PrincipalId::new("bob");

        proposal.register_vote(bob.clone(), true).unwrap();
        assert_eq!(proposal.yes_votes, 1);
        assert_eq!(proposal.no_votes, 0);

        let result = proposal.register_vote(bob, false);
        assert!(matches!(result, Err(TreasuryError::AlreadyVoted(_))));
        assert_eq!(proposal.yes_votes, 1);
        assert_eq!(proposal.no_votes, 0);
    }

    #[test]
    fn test_expire_is_idempotent() {
        let mut store = ProposalStore::new();
        let id = open_proposal(&mut store, -1);
        let proposal = store.get_mut(id).unwrap();
        let now = Utc::now();

        assert!(proposal.expire_if_stale(now));
        assert_eq!(proposal.status, ProposalStatus::Expired);
        assert!(!proposal.expire_if_stale(now));
        assert_eq!(proposal.status, ProposalStatus::Expired);
    }

    #[test]
    fn test_fresh_proposal_not_expired() {
        let mut store = ProposalStore::new();
        let id = open_proposal(&mut store, 3600);
        let proposal = store.get_mut(id).unwrap();

        assert!(!proposal.expire_if_stale(Utc::now()));
        assert!(proposal.is_open());
    }
}
