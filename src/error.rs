//! Error types for the confidential treasury.

use crate::types::ProposalId;
use thiserror::Error;

/// Errors that can occur in the confidential treasury
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreasuryError {
    /// Ciphertext input was malformed or its proof did not verify
    #[error("Invalid ciphertext proof: {0}")]
    InvalidCiphertextProof(String),

    /// Caller is not part of the fixed membership set
    #[error("Not a member: {0}")]
    NotAMember(String),

    /// No proposal exists with the given id
    #[error("Unknown proposal: {0}")]
    UnknownProposal(ProposalId),

    /// Proposal is no longer open for voting or execution
    #[error("Proposal is not open: {0}")]
    ProposalNotOpen(ProposalId),

    /// Member has already cast a vote on this proposal
    #[error("Already voted: {0}")]
    AlreadyVoted(String),

    /// Voting window for the proposal has closed
    #[error("Voting closed for proposal: {0}")]
    VotingClosed(ProposalId),

    /// Quorum is zero or larger than the membership set
    #[error("Invalid quorum: {0}")]
    InvalidQuorum(String),

    /// Membership set is empty
    #[error("Membership set is empty")]
    EmptyMembership,

    /// Principal holds no decryption grant for the requested handle
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error (lock poisoning, engine handle misuse)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for treasury operations
pub type Result<T> = std::result::Result<T, TreasuryError>;
