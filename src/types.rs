//! Common types used throughout the confidential treasury.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque principal identity: a member, depositor, or disbursement
/// recipient. The treasury never interprets the value beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId {
    /// The principal string, e.g. an address or DID
    value: String,
}

impl PrincipalId {
    /// Create a new principal id with the given value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the principal id as a string
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A timestamp used for deadlines and event ordering
pub type Timestamp = DateTime<Utc>;

/// Identifier of a proposal. Allocated monotonically starting at 0;
/// unique and stable for the lifetime of the store.
pub type ProposalId = u64;
