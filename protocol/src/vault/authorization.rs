//! # Guardian Authorization Rounds
//!
//! Guardians approve withdrawals by signing the current round. A round is a
//! numbered collection of signatures; the owner starts a fresh one whenever
//! authorization should be collected again. Withdrawals do not consume a
//! round, so one quorum can back several withdrawals.
//!
//! Membership is checked when a signature is cast, never afterwards: a
//! guardian removed mid-round keeps its signature counted for that round.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::access::AccessControl;
use super::error::VaultError;
use crate::types::AccountId;

/// The current round and the quorum it is measured against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianRound {
    round_id: u64,
    /// Signatures required; 0 until the vault is configured.
    threshold: u32,
    /// Guardians that signed `round_id`.
    signers: BTreeSet<AccountId>,
    signature_count: u32,
}

impl GuardianRound {
    /// Round 0, no signatures, no threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects a zero threshold with [`VaultError::InvalidThreshold`].
    pub fn validate_threshold(threshold: u32) -> Result<(), VaultError> {
        if threshold == 0 {
            return Err(VaultError::InvalidThreshold);
        }
        Ok(())
    }

    /// Sets the quorum size. Only called from `configure`.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn signature_count(&self) -> u32 {
        self.signature_count
    }

    /// Whether `guardian` signed the current round.
    pub fn has_signed(&self, guardian: &AccountId) -> bool {
        self.signers.contains(guardian)
    }

    /// `signature_count >= threshold`.
    pub fn has_met_threshold(&self) -> bool {
        self.signature_count >= self.threshold
    }

    /// Starts a new round: increments the id and forgets every signature.
    /// Returns the new round id.
    pub fn begin(&mut self) -> Result<u64, VaultError> {
        let next = self
            .round_id
            .checked_add(1)
            .ok_or(VaultError::AmountOverflow)?;
        self.round_id = next;
        self.signers.clear();
        self.signature_count = 0;
        Ok(next)
    }

    /// Records `guardian`'s approval of the current round. Returns the new
    /// signature count.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] if `guardian` is not registered in
    /// `registry`, [`VaultError::DuplicateSignature`] if it already signed.
    pub fn sign(&mut self, registry: &AccessControl, guardian: &AccountId) -> Result<u32, VaultError> {
        if !registry.is_guardian(guardian) {
            tracing::warn!(caller = %guardian, round = self.round_id, "signature from non-guardian rejected");
            return Err(VaultError::Unauthorized {
                caller: guardian.clone(),
            });
        }
        if self.has_signed(guardian) {
            return Err(VaultError::DuplicateSignature {
                guardian: guardian.clone(),
                round: self.round_id,
            });
        }
        let count = self
            .signature_count
            .checked_add(1)
            .ok_or(VaultError::AmountOverflow)?;

        self.signers.insert(guardian.clone());
        self.signature_count = count;
        Ok(count)
    }
}
