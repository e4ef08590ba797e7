//! # Withdrawal Controller
//!
//! Composes the timelock/heir gate with the guardian round. A withdrawal is
//! admitted when either
//!
//! 1. the timelock has expired **and** the current round has met its
//!    threshold, or
//! 2. the caller is the heir and the emergency grace period is over.
//!
//! The guardian path is checked first, so a heir who also has a quorum
//! behind them is reported as a guardian-quorum withdrawal. Either way the
//! funds go to the owner.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::authorization::GuardianRound;
use super::error::VaultError;
use super::timelock::TimelockGate;
use crate::types::{AccountId, BlockHeight};

/// Which rule admitted a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalPath {
    /// Timelock expired and the guardian threshold is met.
    GuardianQuorum,
    /// Designated heir after the emergency grace period.
    HeirEmergency,
}

impl fmt::Display for WithdrawalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuardianQuorum => write!(f, "GuardianQuorum"),
            Self::HeirEmergency => write!(f, "HeirEmergency"),
        }
    }
}

/// Result of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Amount released from the vault.
    pub amount: u64,
    /// Who received it: always the owner at the time of withdrawal.
    pub recipient: AccountId,
    /// Rule that admitted the withdrawal.
    pub path: WithdrawalPath,
    /// Guardian round in force when the withdrawal happened.
    pub round_id: u64,
}

/// The gate rule, as a pure question. `None` means locked.
pub fn admitting_path(
    timelock: &TimelockGate,
    round: &GuardianRound,
    caller: &AccountId,
    height: BlockHeight,
) -> Option<WithdrawalPath> {
    if timelock.is_expired(height) && round.has_met_threshold() {
        Some(WithdrawalPath::GuardianQuorum)
    } else if timelock.is_heir_emergency_eligible(caller, height) {
        Some(WithdrawalPath::HeirEmergency)
    } else {
        None
    }
}

/// Like [`admitting_path`], but a locked gate is an error.
///
/// # Errors
///
/// [`VaultError::TimelockActive`] when neither path is open.
pub fn authorize(
    timelock: &TimelockGate,
    round: &GuardianRound,
    caller: &AccountId,
    height: BlockHeight,
) -> Result<WithdrawalPath, VaultError> {
    admitting_path(timelock, round, caller, height).ok_or_else(|| {
        tracing::warn!(
            caller = %caller,
            height,
            expiry = timelock.expiry(),
            signatures = round.signature_count(),
            threshold = round.threshold(),
            "withdrawal gate closed"
        );
        VaultError::TimelockActive {
            height,
            expiry: timelock.expiry(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EMERGENCY_GRACE_BLOCKS;
    use crate::vault::access::AccessControl;

    const EXPIRY: BlockHeight = 1_000;

    fn gate() -> TimelockGate {
        let mut gate = TimelockGate::new();
        gate.arm(EXPIRY, Some("heir".into()));
        gate
    }

    fn round_with(signatures: &[&str], threshold: u32) -> GuardianRound {
        let owner = AccountId::from("owner");
        let mut acl = AccessControl::new(owner.clone());
        let mut round = GuardianRound::new();
        round.set_threshold(threshold);
        for g in signatures {
            acl.add_guardian(&owner, AccountId::from(*g)).unwrap();
            round.sign(&acl, &AccountId::from(*g)).unwrap();
        }
        round
    }

    #[test]
    fn locked_before_expiry_even_with_quorum() {
        let round = round_with(&["g1", "g2"], 2);
        let err = authorize(&gate(), &round, &"owner".into(), EXPIRY - 1).unwrap_err();
        assert_eq!(err, VaultError::TimelockActive { height: EXPIRY - 1, expiry: EXPIRY });
    }

    #[test]
    fn locked_after_expiry_without_quorum() {
        let round = round_with(&["g1"], 2);
        assert!(authorize(&gate(), &round, &"owner".into(), EXPIRY).is_err());
    }

    #[test]
    fn open_after_expiry_with_quorum() {
        let round = round_with(&["g1", "g2"], 2);
        assert_eq!(
            authorize(&gate(), &round, &"anyone".into(), EXPIRY),
            Ok(WithdrawalPath::GuardianQuorum)
        );
    }

    #[test]
    fn heir_bypasses_quorum_after_grace() {
        let round = round_with(&[], 3);
        let height = EXPIRY + EMERGENCY_GRACE_BLOCKS + 1;
        assert_eq!(
            authorize(&gate(), &round, &"heir".into(), height),
            Ok(WithdrawalPath::HeirEmergency)
        );
        assert!(authorize(&gate(), &round, &"owner".into(), height).is_err());
    }

    #[test]
    fn quorum_path_reported_first() {
        let round = round_with(&["g1"], 1);
        let height = EXPIRY + EMERGENCY_GRACE_BLOCKS + 1;
        assert_eq!(
            admitting_path(&gate(), &round, &"heir".into(), height),
            Some(WithdrawalPath::GuardianQuorum)
        );
    }
}
