//! # Timelock & Heir Gate
//!
//! Answers one question: do the time and inheritance rules currently allow
//! value to leave the vault?
//!
//! - The **timelock** is armed exactly once, by `configure`, at
//!   `configure_height + duration`. A zero expiry means "never configured".
//!   Once armed it can never be moved, even if it was set badly.
//! - The **heir** may be changed by the owner at any time. The heir's
//!   emergency path opens strictly after `expiry + EMERGENCY_GRACE_BLOCKS`
//!   and bypasses the guardian quorum entirely.

use serde::{Deserialize, Serialize};

use super::error::VaultError;
use crate::config::EMERGENCY_GRACE_BLOCKS;
use crate::types::{AccountId, BlockHeight};

/// Timelock expiry and designated heir.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockGate {
    /// 0 until configured.
    expiry_height: BlockHeight,
    heir: Option<AccountId>,
}

impl TimelockGate {
    /// An unconfigured gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured expiry height, or 0.
    pub fn expiry(&self) -> BlockHeight {
        self.expiry_height
    }

    /// Whether `configure` has run.
    pub fn is_configured(&self) -> bool {
        self.expiry_height != 0
    }

    /// The designated heir, if any.
    pub fn heir(&self) -> Option<&AccountId> {
        self.heir.as_ref()
    }

    /// Validates a one-time configuration request.
    ///
    /// # Errors
    ///
    /// [`VaultError::AlreadyConfigured`] if the timelock is already armed,
    /// then [`VaultError::InvalidDuration`] for a zero duration.
    pub fn ensure_configurable(&self, duration_blocks: u64) -> Result<(), VaultError> {
        if self.is_configured() {
            return Err(VaultError::AlreadyConfigured {
                expiry: self.expiry_height,
            });
        }
        if duration_blocks == 0 {
            return Err(VaultError::InvalidDuration);
        }
        Ok(())
    }

    /// Computes the expiry a configuration at `height` would produce.
    pub fn expiry_for(height: BlockHeight, duration_blocks: u64) -> Result<BlockHeight, VaultError> {
        height
            .checked_add(duration_blocks)
            .ok_or(VaultError::AmountOverflow)
    }

    /// Arms the timelock. Callers validate with
    /// [`ensure_configurable`](Self::ensure_configurable) first.
    pub fn arm(&mut self, expiry: BlockHeight, heir: Option<AccountId>) {
        self.expiry_height = expiry;
        self.heir = heir;
    }

    /// Replaces (or clears) the designated heir.
    pub fn set_heir(&mut self, heir: Option<AccountId>) {
        self.heir = heir;
    }

    /// `height >= expiry`. An unconfigured gate reads as expired.
    pub fn is_expired(&self, height: BlockHeight) -> bool {
        height >= self.expiry_height
    }

    /// First height at which the heir emergency path is open.
    pub fn emergency_opens_at(&self) -> BlockHeight {
        self.expiry_height
            .saturating_add(EMERGENCY_GRACE_BLOCKS)
            .saturating_add(1)
    }

    /// Whether `caller` is the heir and the grace period has fully elapsed.
    pub fn is_heir_emergency_eligible(&self, caller: &AccountId, height: BlockHeight) -> bool {
        match &self.heir {
            Some(heir) => {
                heir == caller && height > self.expiry_height.saturating_add(EMERGENCY_GRACE_BLOCKS)
            }
            None => false,
        }
    }
}
