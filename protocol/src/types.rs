//! Core type definitions shared by every vault component.
//!
//! Identities are opaque to the vault: the host has already authenticated
//! the caller and hands us an [`AccountId`]. Time is a block height supplied
//! by the host alongside every invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical clock value supplied by the host. Monotonically increasing.
pub type BlockHeight = u64;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Opaque identity of a caller or payout address.
///
/// The vault never parses or validates the contents; two identities are the
/// same account iff their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps a host-supplied identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// CallContext
// ---------------------------------------------------------------------------

/// Everything the host tells us about an invocation: who is calling and at
/// which block height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Authenticated caller identity.
    pub caller: AccountId,
    /// Current block height.
    pub height: BlockHeight,
}

impl CallContext {
    /// Builds a context for `caller` at `height`.
    pub fn new(caller: impl Into<AccountId>, height: BlockHeight) -> Self {
        Self {
            caller: caller.into(),
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_equality_is_string_equality() {
        assert_eq!(AccountId::from("alice"), AccountId::new("alice".to_string()));
        assert_ne!(AccountId::from("alice"), AccountId::from("Alice"));
    }

    #[test]
    fn account_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountId::from("bastion:owner")).unwrap();
        assert_eq!(json, "\"bastion:owner\"");
    }

    #[test]
    fn account_id_displays_its_string() {
        let id = AccountId::from("heir");
        assert_eq!(id.as_str(), "heir");
        assert_eq!(id.to_string(), "heir");
    }

    #[test]
    fn call_context_from_str_caller() {
        let ctx = CallContext::new("guardian-1", 42);
        assert_eq!(ctx.caller, AccountId::from("guardian-1"));
        assert_eq!(ctx.height, 42);
    }
}
