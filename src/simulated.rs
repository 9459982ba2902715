//! Simulated ciphertext engine.
//!
//! A cleartext-backed stand-in for the external homomorphic engine,
//! used by the test suite and demos. Handles index into a private slot
//! table; the sealed-input format and its proof binding are simulated
//! with hashing rather than real encryption, so this engine must never
//! be used outside of development.

use crate::access::AccessLog;
use crate::ciphertext::{CiphertextEngine, CiphertextHandle, EncryptedInput};
use crate::error::{Result, TreasuryError};
use crate::types::PrincipalId;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

const SEAL_DOMAIN: &[u8] = b"confidential-treasury/seal";
const PROOF_DOMAIN: &[u8] = b"confidential-treasury/input-proof";
const NONCE_LEN: usize = 16;

/// A cleartext value sitting behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearValue {
    /// An encrypted-u64 slot
    Uint(u64),
    /// An encrypted-boolean slot
    Bool(bool),
}

/// Simulated homomorphic engine backed by a cleartext slot table
#[derive(Debug, Default)]
pub struct SimulatedCiphertextEngine {
    /// Slot table mapping handle ids to their cleartext referents
    slots: RwLock<HashMap<u64, ClearValue>>,
    /// Next handle id to allocate
    next_id: AtomicU64,
}

impl SimulatedCiphertextEngine {
    /// Create a new engine with an empty slot table
    pub fn new() -> Self {
        Self::default()
    }

    /// Client-side encryption of a u64 value, producing an input whose
    /// proof binds the sealed bytes to the submitting principal.
    pub fn encrypt_u64(&self, value: u64, submitter: &PrincipalId) -> EncryptedInput {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let pad = Sha256::new()
            .chain_update(SEAL_DOMAIN)
            .chain_update(nonce)
            .finalize();

        let mut sealed = Vec::with_capacity(NONCE_LEN + 8);
        sealed.extend_from_slice(&nonce);
        for (i, byte) in value.to_le_bytes().iter().enumerate() {
            sealed.push(byte ^ pad[i]);
        }

        let proof = Self::input_proof(&sealed, submitter);
        EncryptedInput { sealed, proof }
    }

    /// Reveal the cleartext behind a u64 handle. This is the raw
    /// engine-side decryption; access control lives in [`user_decrypt`].
    ///
    /// [`user_decrypt`]: SimulatedCiphertextEngine::user_decrypt
    pub fn reveal_u64(&self, handle: CiphertextHandle) -> Result<u64> {
        self.get_uint(handle)
    }

    /// Decrypt a handle on behalf of a principal, honoring the grant
    /// log. This is the external decryption harness; the treasury core
    /// only ever records grants, it never decrypts.
    pub fn user_decrypt(
        &self,
        handle: CiphertextHandle,
        principal: &PrincipalId,
        access: &AccessLog,
    ) -> Result<u64> {
        if !access.is_authorized(principal, handle) {
            return Err(TreasuryError::Unauthorized(format!(
                "{} holds no decryption grant for {}",
                principal, handle
            )));
        }
        self.get_uint(handle)
    }

    fn input_proof(sealed: &[u8], submitter: &PrincipalId) -> Vec<u8> {
        Sha256::new()
            .chain_update(PROOF_DOMAIN)
            .chain_update(sealed)
            .chain_update(submitter.as_str().as_bytes())
            .finalize()
            .to_vec()
    }

    fn alloc(&self, value: ClearValue) -> Result<CiphertextHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut slots = self
            .slots
            .write()
            .map_err(|_| TreasuryError::Internal("slot table lock poisoned".to_string()))?;
        slots.insert(id, value);
        Ok(CiphertextHandle::new(id))
    }

    fn get(&self, handle: CiphertextHandle) -> Result<ClearValue> {
        let slots = self
            .slots
            .read()
            .map_err(|_| TreasuryError::Internal("slot table lock poisoned".to_string()))?;
        slots
            .get(&handle.id())
            .copied()
            .ok_or_else(|| TreasuryError::Internal(format!("unknown handle {}", handle)))
    }

    fn get_uint(&self, handle: CiphertextHandle) -> Result<u64> {
        match self.get(handle)? {
            ClearValue::Uint(v) => Ok(v),
            ClearValue::Bool(_) => Err(TreasuryError::Internal(format!(
                "handle {} is a boolean, expected u64",
                handle
            ))),
        }
    }

    fn get_bool(&self, handle: CiphertextHandle) -> Result<bool> {
        match self.get(handle)? {
            ClearValue::Bool(v) => Ok(v),
            ClearValue::Uint(_) => Err(TreasuryError::Internal(format!(
                "handle {} is a u64, expected boolean",
                handle
            ))),
        }
    }
}

impl CiphertextEngine for SimulatedCiphertextEngine {
    fn validate(&self, input: &EncryptedInput, submitter: &PrincipalId) -> Result<CiphertextHandle> {
        if input.sealed.len() != NONCE_LEN + 8 {
            return Err(TreasuryError::InvalidCiphertextProof(format!(
                "sealed input has length {}, expected {}",
                input.sealed.len(),
                NONCE_LEN + 8
            )));
        }

        let expected = Self::input_proof(&input.sealed, submitter);
        if input.proof != expected {
            return Err(TreasuryError::InvalidCiphertextProof(format!(
                "proof {} does not bind input to {}",
                hex::encode(&input.proof[..input.proof.len().min(8)]),
                submitter
            )));
        }

        let (nonce, body) = input.sealed.split_at(NONCE_LEN);
        let pad = Sha256::new()
            .chain_update(SEAL_DOMAIN)
            .chain_update(nonce)
            .finalize();
        let mut bytes = [0u8; 8];
        for i in 0..8 {
            bytes[i] = body[i] ^ pad[i];
        }

        self.alloc(ClearValue::Uint(u64::from_le_bytes(bytes)))
    }

    fn add(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle> {
        let value = self.get_uint(a)?.wrapping_add(self.get_uint(b)?);
        self.alloc(ClearValue::Uint(value))
    }

    fn subtract(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle> {
        // Wraps on underflow, as the real scheme does; an underflowed
        // result is only ever selected away.
        let value = self.get_uint(a)?.wrapping_sub(self.get_uint(b)?);
        self.alloc(ClearValue::Uint(value))
    }

    fn ge(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle> {
        let value = self.get_uint(a)? >= self.get_uint(b)?;
        self.alloc(ClearValue::Bool(value))
    }

    fn and(&self, a: CiphertextHandle, b: CiphertextHandle) -> Result<CiphertextHandle> {
        let value = self.get_bool(a)? && self.get_bool(b)?;
        self.alloc(ClearValue::Bool(value))
    }

    fn as_bool(&self, value: bool) -> Result<CiphertextHandle> {
        self.alloc(ClearValue::Bool(value))
    }

    fn select(
        &self,
        cond: CiphertextHandle,
        if_true: CiphertextHandle,
        if_false: CiphertextHandle,
    ) -> Result<CiphertextHandle> {
        let cond = self.get_bool(cond)?;
        // Both branches are fetched regardless of the condition
        let when_true = self.get(if_true)?;
        let when_false = self.get(if_false)?;
        match (when_true, when_false) {
            (ClearValue::Uint(_), ClearValue::Uint(_))
            | (ClearValue::Bool(_), ClearValue::Bool(_)) => {}
            _ => {
                return Err(TreasuryError::Internal(format!(
                    "select branches {} and {} have mismatched kinds",
                    if_true, if_false
                )))
            }
        }
        self.alloc(if cond { when_true } else { when_false })
    }

    fn zero(&self) -> Result<CiphertextHandle> {
        self.alloc(ClearValue::Uint(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_validate_roundtrip() {
        let engine = SimulatedCiphertextEngine::new();
        let alice = PrincipalId::new("alice");

        let input = engine.encrypt_u64(1234, &alice);
        let handle = engine.validate(&input, &alice).unwrap();

        assert_eq!(engine.reveal_u64(handle).unwrap(), 1234);
    }

    #[test]
    fn test_validate_rejects_wrong_submitter() {
        let engine = SimulatedCiphertextEngine::new();
        let alice = PrincipalId::new("alice");
        let bob = PrincipalId::new("bob");

        let input = engine.encrypt_u64(1234, &alice);
        let result = engine.validate(&input, &bob);

        assert!(matches!(
            result,
            Err(TreasuryError::InvalidCiphertextProof(_))
        ));
    }

    #[test]
    fn test_validate_rejects_tampered_input() {
        let engine = SimulatedCiphertextEngine::new();
        let alice = PrincipalId::new("alice");

        let mut input = engine.encrypt_u64(1234, &alice);
        input.sealed[NONCE_LEN] ^= 0x01;

        assert!(matches!(
            engine.validate(&input, &alice),
            Err(TreasuryError::InvalidCiphertextProof(_))
        ));
    }

    #[test]
    fn test_homomorphic_arithmetic() {
        let engine = SimulatedCiphertextEngine::new();
        let alice = PrincipalId::new("alice");

        let a = engine
            .validate(&engine.encrypt_u64(100, &alice), &alice)
            .unwrap();
        let b = engine
            .validate(&engine.encrypt_u64(40, &alice), &alice)
            .unwrap();

        let sum = engine.add(a, b).unwrap();
        assert_eq!(engine.reveal_u64(sum).unwrap(), 140);

        let diff = engine.subtract(a, b).unwrap();
        assert_eq!(engine.reveal_u64(diff).unwrap(), 60);

        // Each operation allocates a fresh handle
        assert_ne!(sum, a);
        assert_ne!(sum, diff);
    }

    #[test]
    fn test_select_follows_condition() {
        let engine = SimulatedCiphertextEngine::new();
        let alice = PrincipalId::new("alice");

        let a = engine
            .validate(&engine.encrypt_u64(7, &alice), &alice)
            .unwrap();
        let b = engine.zero().unwrap();

        let yes = engine.as_bool(true).unwrap();
        let no = engine.as_bool(false).unwrap();

        let picked_a = engine.select(yes, a, b).unwrap();
        let picked_b = engine.select(no, a, b).unwrap();

        assert_eq!(engine.reveal_u64(picked_a).unwrap(), 7);
        assert_eq!(engine.reveal_u64(picked_b).unwrap(), 0);
    }

    #[test]
    fn test_kind_mismatch_is_internal() {
        let engine = SimulatedCiphertextEngine::new();
        let flag = engine.as_bool(true).unwrap();
        let zero = engine.zero().unwrap();

        assert!(matches!(
            engine.add(flag, zero),
            Err(TreasuryError::Internal(_))
        ));
    }
}
