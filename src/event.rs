//! Observable treasury events.
//!
//! Events carry only public metadata and ciphertext handles, never
//! cleartext amounts. `ProposalCreated` carries the id as its first
//! field; callers recover new proposal ids from it without a separate
//! read.

use crate::ciphertext::CiphertextHandle;
use crate::types::{PrincipalId, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

/// An externally observable state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryEvent {
    /// A deposit was folded into the balance
    DepositRecorded {
        /// The depositing principal
        depositor: PrincipalId,
        /// The new balance handle
        balance: CiphertextHandle,
        /// When the deposit was recorded
        at: Timestamp,
    },
    /// A proposal was created
    ProposalCreated {
        /// The newly allocated proposal id
        id: ProposalId,
        /// The proposing member
        proposer: PrincipalId,
        /// The disbursement recipient
        recipient: PrincipalId,
        /// End of the voting window
        deadline: Timestamp,
    },
    /// A member cast a vote
    VoteCast {
        /// The proposal voted on
        id: ProposalId,
        /// The voting member
        voter: PrincipalId,
        /// Whether the vote was a yes
        approve: bool,
    },
    /// A proposal went through the branchless execution path
    ProposalExecuted {
        /// The executed proposal
        id: ProposalId,
        /// The disbursement recipient
        recipient: PrincipalId,
        /// When execution committed
        at: Timestamp,
    },
    /// A proposal passed its deadline without execution
    ProposalExpired {
        /// The expired proposal
        id: ProposalId,
        /// When the expiry was observed
        at: Timestamp,
    },
}
