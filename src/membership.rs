//! Membership and quorum registry.
//!
//! The member set and quorum threshold are fixed at construction and
//! read-only afterwards; there is no mutation path. Dynamic membership
//! belongs to a versioned external component, not this registry.

use crate::error::{Result, TreasuryError};
use crate::types::PrincipalId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Immutable registry of treasury members and the quorum threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRegistry {
    /// The fixed member set
    members: HashSet<PrincipalId>,
    /// Minimum number of yes votes required to authorize execution
    quorum: usize,
}

impl MembershipRegistry {
    /// Create a new registry from the initial members and quorum.
    ///
    /// Fails with `EmptyMembership` if no members are given and with
    /// `InvalidQuorum` unless `0 < quorum <= |members|`.
    pub fn new(
        members: impl IntoIterator<Item = PrincipalId>,
        quorum: usize,
    ) -> Result<Self> {
        let members: HashSet<PrincipalId> = members.into_iter().collect();

        if members.is_empty() {
            return Err(TreasuryError::EmptyMembership);
        }
        if quorum == 0 || quorum > members.len() {
            return Err(TreasuryError::InvalidQuorum(format!(
                "quorum {} must be within 1..={}",
                quorum,
                members.len()
            )));
        }

        Ok(Self { members, quorum })
    }

    /// Check whether a principal belongs to the member set
    pub fn is_member(&self, principal: &PrincipalId) -> bool {
        self.members.contains(principal)
    }

    /// Get the quorum threshold
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Get the number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the registry is empty; always false for a constructed
    /// registry
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<PrincipalId> {
        names.iter().map(|name| PrincipalId::new(*name)).collect()
    }

    #[test]
    fn test_valid_registry() {
        let registry = MembershipRegistry::new(members(&["owner", "alice", "bob"]), 2).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.quorum(), 2);
        assert!(registry.is_member(&PrincipalId::new("alice")));
        assert!(!registry.is_member(&PrincipalId::new("carol")));
    }

    #[test]
    fn test_empty_membership_rejected() {
        let result = MembershipRegistry::new(members(&[]), 1);
        assert_eq!(result.unwrap_err(), TreasuryError::EmptyMembership);
    }

    #[test]
    fn test_zero_quorum_rejected() {
        let result = MembershipRegistry::new(members(&["owner"]), 0);
        assert!(matches!(result, Err(TreasuryError::InvalidQuorum(_))));
    }

    #[test]
    fn test_oversized_quorum_rejected() {
        let result = MembershipRegistry::new(members(&["owner", "alice"]), 3);
        assert!(matches!(result, Err(TreasuryError::InvalidQuorum(_))));
    }

    #[test]
    fn test_duplicate_members_collapse() {
        // Duplicates collapse into one member, so a quorum above the
        // distinct count is invalid.
        let result = MembershipRegistry::new(members(&["owner", "owner"]), 2);
        assert!(matches!(result, Err(TreasuryError::InvalidQuorum(_))));
    }
}
