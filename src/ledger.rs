//! Treasury balance ledger.
//!
//! A single encrypted balance cell. The cell starts uninitialized,
//! which is a distinguished sentinel and not the same thing as an
//! encrypted zero. The balance is only ever produced by homomorphic
//! operations; no plaintext assignment path exists.

use crate::ciphertext::{CiphertextEngine, CiphertextHandle};
use crate::error::Result;

/// The encrypted treasury balance cell
#[derive(Debug, Default)]
pub struct TreasuryLedger {
    /// Current balance handle; `None` until the first deposit
    balance: Option<CiphertextHandle>,
}

impl TreasuryLedger {
    /// Create a ledger with an uninitialized balance
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance handle, or `None` if no deposit has occurred
    pub fn current_balance(&self) -> Option<CiphertextHandle> {
        self.balance
    }

    /// Fold a validated deposit into the balance. The first deposit
    /// adopts the validated handle directly (add to an implicit zero);
    /// later deposits go through a homomorphic add. The balance handle
    /// changes identity on every call.
    pub fn deposit(
        &mut self,
        engine: &dyn CiphertextEngine,
        amount: CiphertextHandle,
    ) -> Result<CiphertextHandle> {
        let new_balance = match self.balance {
            Some(balance) => engine.add(balance, amount)?,
            None => amount,
        };
        self.balance = Some(new_balance);
        Ok(new_balance)
    }

    /// Balance handle to feed into an execution. An uninitialized
    /// treasury executes against a fresh encrypted zero, so requests
    /// against an unfunded treasury fail closed.
    pub fn balance_for_execution(
        &self,
        engine: &dyn CiphertextEngine,
    ) -> Result<CiphertextHandle> {
        match self.balance {
            Some(balance) => Ok(balance),
            None => engine.zero(),
        }
    }

    /// Commit the post-execution balance produced by the homomorphic
    /// select
    pub fn commit(&mut self, new_balance: CiphertextHandle) {
        self.balance = Some(new_balance);
    }
}
