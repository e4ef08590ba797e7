//! # Access Control
//!
//! Owner identity and the guardian registry. Every administrative vault
//! operation goes through [`AccessControl::ensure_owner`] before it touches
//! anything else.
//!
//! Guardian membership is a plain set: present means active. Adding an
//! existing guardian or removing a stranger succeeds without changing
//! anything.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::VaultError;
use crate::types::AccountId;

/// Owner and guardian registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: AccountId,
    guardians: BTreeSet<AccountId>,
}

impl AccessControl {
    /// The deployer becomes the owner. No guardians yet.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            guardians: BTreeSet::new(),
        }
    }

    /// Current owner.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Whether `caller` is the current owner.
    pub fn is_owner(&self, caller: &AccountId) -> bool {
        *caller == self.owner
    }

    /// The single-owner permission gate.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), VaultError> {
        if !self.is_owner(caller) {
            tracing::warn!(caller = %caller, owner = %self.owner, "owner-only operation rejected");
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Hands the vault to `new_owner`. The new identity is not validated
    /// beyond being present.
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        tracing::info!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Registers `account` as a guardian. Idempotent.
    pub fn add_guardian(&mut self, caller: &AccountId, account: AccountId) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        let added = self.guardians.insert(account.clone());
        tracing::info!(guardian = %account, added, "guardian registered");
        Ok(())
    }

    /// Deregisters `account`. Idempotent. Signatures it already cast stay
    /// with their round.
    pub fn remove_guardian(&mut self, caller: &AccountId, account: &AccountId) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        let removed = self.guardians.remove(account);
        tracing::info!(guardian = %account, removed, "guardian deregistered");
        Ok(())
    }

    /// Whether `account` is a registered guardian.
    pub fn is_guardian(&self, account: &AccountId) -> bool {
        self.guardians.contains(account)
    }

    /// Registered guardians in a stable order.
    pub fn guardians(&self) -> impl Iterator<Item = &AccountId> {
        self.guardians.iter()
    }
}
