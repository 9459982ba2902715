//! Ciphertext handle layer.
//!
//! The treasury never sees cleartext amounts. Encrypted values are
//! referenced through opaque handles, and all arithmetic on them is
//! delegated to an external homomorphic engine behind the
//! [`CiphertextEngine`] trait. Every operation returns a fresh handle;
//! a handle's referent is never mutated in place.

use crate::error::Result;
use crate::types::PrincipalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to an encrypted 64-bit value held by the engine.
///
/// Handles are cheap value types. Equality means "same ciphertext
/// object", not "same underlying cleartext".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(u64);

impl CiphertextHandle {
    /// Create a handle from an engine-assigned identifier
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the engine-assigned identifier
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:{}", self.0)
    }
}

/// An encrypted input as submitted by a caller: sealed ciphertext
/// bytes plus a proof binding them to the submitting principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    /// Sealed ciphertext bytes
    pub sealed: Vec<u8>,
    /// Well-formedness proof over the sealed bytes and the submitter
    pub proof: Vec<u8>,
}

/// The external homomorphic arithmetic engine.
///
/// All operations are synchronous and, apart from handle allocation,
/// stateless from the treasury's perspective. Implementations must not
/// reveal anything about operand cleartexts through errors or timing
/// beyond what the handle identifiers already expose.
pub trait CiphertextEngine: Send + Sync {
    /// Validate an encrypted input against its proof and admit it as a
    /// handle. Fails with `InvalidCiphertextProof` on any mismatch.
    fn validate(&self, input: &EncryptedInput, submitter: &PrincipalId) -> Result<CiphertextHandle>;

    /// Homomorphic addition of two encrypted u64 values
    fn add(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle>;

    /// Homomorphic wrapping subtraction of two encrypted u64 values
    fn subtract(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle>;

    /// Homomorphic greater-or-equal comparison, producing an encrypted boolean
    fn ge(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle>;

    /// Homomorphic conjunction of two encrypted booleans
    fn and(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle>;

    /// Trivially encrypt a public boolean so it can enter homomorphic
    /// expressions without a plaintext branch
    fn as_bool(&self, value: bool) -> Result<CiphertextHandle>;

    /// Homomorphic select: `cond ? if_true : if_false`, entirely under
    /// encryption
    fn select(
        &self,
        cond: CiphertextHandle,
        if_true: CiphertextHandle,
        if_false: CiphertextHandle,
    ) -> Result<CiphertextHandle>;

    /// A freshly allocated encrypted zero
    fn zero(&self) -> Result<CiphertextHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        let a = CiphertextHandle::new(7);
        let b = CiphertextHandle::new(7);
        let c = CiphertextHandle::new(8);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.id(), 7);
        assert_eq!(a.to_string(), "ct:7");
    }
}
