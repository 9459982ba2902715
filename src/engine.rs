//! The treasury proposal/execution engine.
//!
//! Ties the ciphertext layer, membership registry, balance ledger,
//! proposal store, and grant log together into a single serialized
//! state machine. The execution step is branchless on everything
//! confidential: every execution performs the same homomorphic
//! sequence regardless of outcome, and the outcome is only knowable
//! through an authorized decrypt afterwards.

use crate::access::AccessLog;
use crate::ciphertext::{CiphertextEngine, CiphertextHandle, EncryptedInput};
use crate::error::{Result, TreasuryError};
use crate::event::TreasuryEvent;
use crate::ledger::TreasuryLedger;
use crate::membership::MembershipRegistry;
use crate::proposal::{ProposalSnapshot, ProposalStatus, ProposalStore};
use crate::types::{PrincipalId, ProposalId};
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Default voting window when a proposal does not specify one
pub const DEFAULT_VOTING_WINDOW_SECS: i64 = 86_400;

/// Configuration for a treasury instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryConfig {
    /// The instance owner; holds a standing decryption grant on every
    /// balance handle
    pub owner: PrincipalId,
    /// Initial members; fixed for the lifetime of the instance
    pub members: Vec<PrincipalId>,
    /// Minimum number of yes votes to authorize execution
    pub quorum: usize,
    /// Voting window applied when `create_proposal` is not given one
    pub default_voting_window_secs: i64,
}

impl TreasuryConfig {
    /// Create a configuration with the default voting window
    pub fn new(
        owner: PrincipalId,
        members: impl IntoIterator<Item = PrincipalId>,
        quorum: usize,
    ) -> Self {
        Self {
            owner,
            members: members.into_iter().collect(),
            quorum,
            default_voting_window_secs: DEFAULT_VOTING_WINDOW_SECS,
        }
    }
}

/// The confidential treasury engine
pub struct TreasuryEngine {
    /// External homomorphic arithmetic engine
    fhe: Arc<dyn CiphertextEngine>,
    /// Instance configuration
    config: TreasuryConfig,
    /// Fixed member set and quorum
    membership: MembershipRegistry,
    /// Encrypted balance cell
    ledger: RwLock<TreasuryLedger>,
    /// All proposals, keyed by id
    proposals: RwLock<ProposalStore>,
    /// Decryption-grant effect log
    access: RwLock<AccessLog>,
    /// Observable event log
    events: RwLock<Vec<TreasuryEvent>>,
}

impl TreasuryEngine {
    /// Create a new treasury. Fails with `EmptyMembership` or
    /// `InvalidQuorum` before any state exists.
    pub fn new(fhe: Arc<dyn CiphertextEngine>, config: TreasuryConfig) -> Result<Self> {
        let membership = MembershipRegistry::new(config.members.iter().cloned(), config.quorum)?;
        info!(
            "treasury initialized: {} members, quorum {}",
            membership.len(),
            membership.quorum()
        );

        Ok(Self {
            fhe,
            config,
            membership,
            ledger: RwLock::new(TreasuryLedger::new()),
            proposals: RwLock::new(ProposalStore::new()),
            access: RwLock::new(AccessLog::new()),
            events: RwLock::new(Vec::new()),
        })
    }

    /// The membership registry
    pub fn membership(&self) -> &MembershipRegistry {
        &self.membership
    }

    /// The instance owner
    pub fn owner(&self) -> &PrincipalId {
        &self.config.owner
    }

    /// Fold an encrypted deposit into the balance. Any principal may
    /// deposit; the proof must bind the input to the depositor. On
    /// success the depositor and the owner are granted decryption
    /// rights on the new balance handle.
    pub fn deposit(
        &self,
        depositor: &PrincipalId,
        input: &EncryptedInput,
    ) -> Result<CiphertextHandle> {
        // Proof validation happens before any state is touched; a bad
        // input leaves the balance unchanged.
        let amount = self.fhe.validate(input, depositor)?;

        let new_balance = {
            let mut ledger = self
                .ledger
                .write()
                .map_err(|_| TreasuryError::Internal("ledger lock poisoned".to_string()))?;
            ledger.deposit(self.fhe.as_ref(), amount)?
        };

        {
            let mut access = self
                .access
                .write()
                .map_err(|_| TreasuryError::Internal("access log lock poisoned".to_string()))?;
            access.record(depositor.clone(), new_balance);
            access.record(self.config.owner.clone(), new_balance);
        }

        self.push_event(TreasuryEvent::DepositRecorded {
            depositor: depositor.clone(),
            balance: new_balance,
            at: Utc::now(),
        })?;
        debug!("deposit from {} committed as {}", depositor, new_balance);

        Ok(new_balance)
    }

    /// Current balance handle, or `None` before the first deposit
    pub fn current_balance(&self) -> Result<Option<CiphertextHandle>> {
        let ledger = self
            .ledger
            .read()
            .map_err(|_| TreasuryError::Internal("ledger lock poisoned".to_string()))?;
        Ok(ledger.current_balance())
    }

    /// Create a disbursement proposal. The proposer must be a member;
    /// the requested amount arrives encrypted with a proof bound to
    /// the proposer. Returns the new id, which is also the first field
    /// of the emitted `ProposalCreated` event.
    pub fn create_proposal(
        &self,
        proposer: &PrincipalId,
        recipient: &PrincipalId,
        input: &EncryptedInput,
        voting_window_secs: Option<i64>,
    ) -> Result<ProposalId> {
        if !self.membership.is_member(proposer) {
            return Err(TreasuryError::NotAMember(proposer.to_string()));
        }

        let requested = self.fhe.validate(input, proposer)?;
        // Fresh encrypted zero per proposal, never shared
        let executed_zero = self.fhe.zero()?;

        let window = voting_window_secs.unwrap_or(self.config.default_voting_window_secs);
        let deadline = Utc::now() + Duration::seconds(window);

        let id = {
            let mut proposals = self
                .proposals
                .write()
                .map_err(|_| TreasuryError::Internal("proposal store lock poisoned".to_string()))?;
            proposals.create(
                proposer.clone(),
                recipient.clone(),
                requested,
                deadline,
                executed_zero,
            )
        };

        self.push_event(TreasuryEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            recipient: recipient.clone(),
            deadline,
        })?;
        info!("proposal {} created by {} for {}", id, proposer, recipient);

        Ok(id)
    }

    /// Cast a yes vote on an open proposal
    pub fn vote_yes(&self, id: ProposalId, voter: &PrincipalId) -> Result<()> {
        self.cast_vote(id, voter, true)
    }

    /// Cast a no vote on an open proposal
    pub fn vote_no(&self, id: ProposalId, voter: &PrincipalId) -> Result<()> {
        self.cast_vote(id, voter, false)
    }

    fn cast_vote(&self, id: ProposalId, voter: &PrincipalId, approve: bool) -> Result<()> {
        let expired_at = {
            let mut proposals = self
                .proposals
                .write()
                .map_err(|_| TreasuryError::Internal("proposal store lock poisoned".to_string()))?;
            let proposal = proposals.get_mut(id)?;

            if !proposal.is_open() {
                return Err(TreasuryError::ProposalNotOpen(id));
            }
            if !self.membership.is_member(voter) {
                return Err(TreasuryError::NotAMember(voter.to_string()));
            }
            if proposal.has_voted(voter) {
                return Err(TreasuryError::AlreadyVoted(voter.to_string()));
            }

            let now = Utc::now();
            if proposal.expire_if_stale(now) {
                Some(now)
            } else {
                proposal.register_vote(voter.clone(), approve)?;
                None
            }
        };

        if let Some(at) = expired_at {
            warn!("vote on proposal {} after deadline; marking expired", id);
            self.push_event(TreasuryEvent::ProposalExpired { id, at })?;
            return Err(TreasuryError::VotingClosed(id));
        }

        self.push_event(TreasuryEvent::VoteCast {
            id,
            voter: voter.clone(),
            approve,
        })?;
        debug!(
            "vote recorded on proposal {}: {} votes {}",
            id,
            voter,
            if approve { "yes" } else { "no" }
        );

        Ok(())
    }

    /// Execute an open proposal. Callable by any principal; the
    /// authorization policy belongs to the wrapping access-control
    /// layer.
    ///
    /// Expiry is decided on public data and short-circuits without
    /// touching the treasury. Otherwise the confidential decision is
    /// made without a single plaintext branch: affordability is an
    /// encrypted comparison, the public quorum flag is trivially
    /// encrypted into the conjunction, and both the disbursed amount
    /// and the new balance come out of homomorphic selects. The ledger
    /// and record are committed before any decryption grant is
    /// recorded.
    pub fn execute(&self, id: ProposalId) -> Result<ProposalStatus> {
        let mut proposals = self
            .proposals
            .write()
            .map_err(|_| TreasuryError::Internal("proposal store lock poisoned".to_string()))?;
        let proposal = proposals.get_mut(id)?;

        if !proposal.is_open() {
            return Err(TreasuryError::ProposalNotOpen(id));
        }

        let now = Utc::now();
        if proposal.expire_if_stale(now) {
            drop(proposals);
            info!("proposal {} expired unexecuted", id);
            self.push_event(TreasuryEvent::ProposalExpired { id, at: now })?;
            return Ok(ProposalStatus::Expired);
        }

        let quorum_met = proposal.yes_votes as usize >= self.membership.quorum();
        let requested = proposal.requested_amount;

        let mut ledger = self
            .ledger
            .write()
            .map_err(|_| TreasuryError::Internal("ledger lock poisoned".to_string()))?;
        let balance = ledger.balance_for_execution(self.fhe.as_ref())?;

        // Branchless confidential decision. Both outcomes are computed
        // in full; the selects pick one under encryption.
        let affordable = self.fhe.ge(balance, requested)?;
        let quorum_flag = self.fhe.as_bool(quorum_met)?;
        let approved = self.fhe.and(affordable, quorum_flag)?;
        let debited = self.fhe.subtract(balance, requested)?;
        let encrypted_zero = self.fhe.zero()?;
        let executed = self.fhe.select(approved, requested, encrypted_zero)?;
        let new_balance = self.fhe.select(approved, debited, balance)?;

        // Commit ledger and record before any grant is recorded
        ledger.commit(new_balance);
        proposal.executed_amount = executed;
        proposal.status = ProposalStatus::Executed;
        let proposer = proposal.proposer.clone();
        let recipient = proposal.recipient.clone();
        drop(ledger);
        drop(proposals);

        {
            let mut access = self
                .access
                .write()
                .map_err(|_| TreasuryError::Internal("access log lock poisoned".to_string()))?;
            access.record(self.config.owner.clone(), new_balance);
            access.record(proposer, new_balance);
            access.record(recipient.clone(), executed);
        }

        self.push_event(TreasuryEvent::ProposalExecuted {
            id,
            recipient,
            at: now,
        })?;
        info!("proposal {} executed", id);

        Ok(ProposalStatus::Executed)
    }

    /// Public metadata of a proposal
    pub fn proposal(&self, id: ProposalId) -> Result<ProposalSnapshot> {
        let proposals = self
            .proposals
            .read()
            .map_err(|_| TreasuryError::Internal("proposal store lock poisoned".to_string()))?;
        Ok(proposals.get(id)?.snapshot())
    }

    /// Handle of a proposal's executed amount: encrypted zero before
    /// execution, the disbursed amount after
    pub fn executed_amount_handle(&self, id: ProposalId) -> Result<CiphertextHandle> {
        let proposals = self
            .proposals
            .read()
            .map_err(|_| TreasuryError::Internal("proposal store lock poisoned".to_string()))?;
        Ok(proposals.get(id)?.executed_amount)
    }

    /// Whether a principal holds a decryption grant for a handle
    pub fn may_decrypt(&self, principal: &PrincipalId, handle: CiphertextHandle) -> Result<bool> {
        let access = self
            .access
            .read()
            .map_err(|_| TreasuryError::Internal("access log lock poisoned".to_string()))?;
        Ok(access.is_authorized(principal, handle))
    }

    /// Snapshot of the decryption-grant log
    pub fn access_log(&self) -> Result<AccessLog> {
        let access = self
            .access
            .read()
            .map_err(|_| TreasuryError::Internal("access log lock poisoned".to_string()))?;
        Ok(access.clone())
    }

    /// Snapshot of the event log, oldest first
    pub fn events(&self) -> Result<Vec<TreasuryEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| TreasuryError::Internal("event log lock poisoned".to_string()))?;
        Ok(events.clone())
    }

    fn push_event(&self, event: TreasuryEvent) -> Result<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| TreasuryError::Internal("event log lock poisoned".to_string()))?;
        events.push(event);
        Ok(())
    }
}
