//! Decryption-grant effect log.
//!
//! The treasury core never decrypts anything. It records which
//! principal may request cleartext disclosure of which handle, and the
//! external access-control mechanism consumes that log. Grants are
//! recorded only after the state transition that produced the handle
//! has been committed.

use crate::ciphertext::CiphertextHandle;
use crate::types::{PrincipalId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single decryption authorization: `principal` may obtain the
/// cleartext of `handle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionGrant {
    /// The authorized principal
    pub principal: PrincipalId,
    /// The handle the principal may decrypt
    pub handle: CiphertextHandle,
    /// When the grant was recorded
    pub granted_at: Timestamp,
}

/// Append-only log of decryption grants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLog {
    grants: Vec<DecryptionGrant>,
}

impl AccessLog {
    /// Create an empty grant log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grant. Recording the same (principal, handle) pair
    /// twice is a no-op.
    pub fn record(&mut self, principal: PrincipalId, handle: CiphertextHandle) {
        if self.is_authorized(&principal, handle) {
            return;
        }
        self.grants.push(DecryptionGrant {
            principal,
            handle,
            granted_at: Utc::now(),
        });
    }

    /// Check whether a principal holds a grant for a handle
    pub fn is_authorized(&self, principal: &PrincipalId, handle: CiphertextHandle) -> bool {
        self.grants
            .iter()
            .any(|g| g.handle == handle && g.principal == *principal)
    }

    /// All handles a principal may decrypt
    pub fn grants_for(&self, principal: &PrincipalId) -> Vec<CiphertextHandle> {
        self.grants
            .iter()
            .filter(|g| g.principal == *principal)
            .map(|g| g.handle)
            .collect()
    }

    /// The full grant log, oldest first
    pub fn grants(&self) -> &[DecryptionGrant] {
        &self.grants
    }

    /// Number of grants recorded
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether any grants have been recorded
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_query() {
        let mut log = AccessLog::new();
        let alice = PrincipalId::new("alice");
        let bob = PrincipalId::new("bob");
        let handle = CiphertextHandle::new(1);

        assert!(!log.is_authorized(&alice, handle));

        log.record(alice.clone(), handle);
        assert!(log.is_authorized(&alice, handle));
        assert!(!log.is_authorized(&bob, handle));
        assert_eq!(log.grants_for(&alice), vec![handle]);
        assert!(log.grants_for(&bob).is_empty());
    }

    #[test]
    fn test_duplicate_grant_is_noop() {
        let mut log = AccessLog::new();
        let alice = PrincipalId::new("alice");
        let handle = CiphertextHandle::new(1);

        log.record(alice.clone(), handle);
        log.record(alice.clone(), handle);

        assert_eq!(log.len(), 1);
    }
}
