//! Confidentially-balanced collective treasury.
//!
//! A shared fund whose balance never appears in cleartext on the
//! ledger, governed by member voting. Disbursement proposals carry
//! encrypted request amounts; execution combines a public quorum check
//! with an encrypted affordability comparison and commits the result
//! through homomorphic selects, so neither the balance, the requested
//! amount, nor the outcome of the affordability check leaks through
//! control flow. Cleartext is only reachable through explicitly
//! recorded decryption grants, resolved by an external harness.

mod access;
mod ciphertext;
mod engine;
mod error;
mod event;
mod ledger;
mod membership;
mod proposal;
mod simulated;
mod types;

pub use access::{AccessLog, DecryptionGrant};
pub use ciphertext::{CiphertextEngine, CiphertextHandle, EncryptedInput};
pub use engine::{TreasuryConfig, TreasuryEngine, DEFAULT_VOTING_WINDOW_SECS};
pub use error::{Result, TreasuryError};
pub use event::TreasuryEvent;
pub use ledger::TreasuryLedger;
pub use membership::MembershipRegistry;
pub use proposal::{Proposal, ProposalSnapshot, ProposalStatus, ProposalStore};
pub use simulated::SimulatedCiphertextEngine;
pub use types::{PrincipalId, ProposalId, Timestamp};

/// Version of the confidential treasury implementation
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
