//! Error types for the custody vault.
//!
//! Every vault operation that can fail returns a [`VaultError`]. All of them
//! are terminal for the invoking operation: the operation's effects are
//! rolled back and the caller decides whether to retry with different
//! inputs.

use thiserror::Error;

use crate::host::TransferError;
use crate::types::{AccountId, BlockHeight};

/// Errors that can occur while operating the vault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The caller lacks the role this operation requires (owner or guardian).
    #[error("unauthorized: {caller} may not perform this operation")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// `configure` has already run; the timelock can be set exactly once.
    #[error("vault already configured (timelock expires at height {expiry})")]
    AlreadyConfigured {
        /// The expiry height set by the earlier configuration.
        expiry: BlockHeight,
    },

    /// The timelock duration must be at least one block.
    #[error("timelock duration must be non-zero")]
    InvalidDuration,

    /// At least one guardian signature must be required.
    #[error("guardian threshold must be non-zero")]
    InvalidThreshold,

    /// Deposits and stakes must move a non-zero amount.
    #[error("amount must be non-zero")]
    InvalidAmount,

    /// The request exceeds the vault's available (unstaked) balance.
    #[error("insufficient vault balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount the caller asked for.
        requested: u64,
        /// Available balance at the time of the request.
        available: u64,
    },

    /// The caller already has a live yield stake.
    #[error("{0} already has an active yield position")]
    PositionExists(AccountId),

    /// The caller has no live stake, or no blocks have passed since the
    /// last harvest.
    #[error("no active yield position to settle for {0}")]
    NoActivePosition(AccountId),

    /// The guardian has already signed the current round.
    #[error("{guardian} already signed round {round}")]
    DuplicateSignature {
        /// The guardian signing twice.
        guardian: AccountId,
        /// The round in question.
        round: u64,
    },

    /// Neither the timelock-plus-quorum gate nor the heir emergency gate
    /// admits this withdrawal.
    #[error("withdrawal locked at height {height} (timelock expiry {expiry})")]
    TimelockActive {
        /// Height at which the withdrawal was attempted.
        height: BlockHeight,
        /// Configured timelock expiry.
        expiry: BlockHeight,
    },

    /// Yield rates are whole percentages between 0 and 100.
    #[error("invalid yield rate: {0}% (must be 0-100)")]
    InvalidPercentage(u32),

    /// Checked arithmetic would wrap. Nobody holds 18.4 quintillion units;
    /// this is a bug or an attack.
    #[error("amount overflow: operation would exceed u64 bounds")]
    AmountOverflow,

    /// The host's transfer primitive refused to move the funds.
    #[error("native transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl VaultError {
    /// Stable numeric code, reported to hosts and printed by the CLI.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unauthorized { .. } => 100,
            Self::AlreadyConfigured { .. } => 101,
            Self::InvalidDuration => 102,
            Self::InvalidThreshold => 103,
            Self::InvalidAmount => 104,
            Self::InsufficientBalance { .. } => 105,
            Self::PositionExists(_) => 106,
            Self::NoActivePosition(_) => 107,
            Self::DuplicateSignature { .. } => 108,
            Self::TimelockActive { .. } => 109,
            Self::InvalidPercentage(_) => 110,
            Self::AmountOverflow => 111,
            Self::Transfer(_) => 112,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let errors = [
            VaultError::Unauthorized { caller: "x".into() },
            VaultError::AlreadyConfigured { expiry: 1 },
            VaultError::InvalidDuration,
            VaultError::InvalidThreshold,
            VaultError::InvalidAmount,
            VaultError::InsufficientBalance { requested: 2, available: 1 },
            VaultError::PositionExists("x".into()),
            VaultError::NoActivePosition("x".into()),
            VaultError::DuplicateSignature { guardian: "g".into(), round: 0 },
            VaultError::TimelockActive { height: 0, expiry: 1 },
            VaultError::InvalidPercentage(101),
            VaultError::AmountOverflow,
            VaultError::Transfer(TransferError::SelfTransfer("x".into())),
        ];
        let mut codes: Vec<u32> = errors.iter().map(VaultError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn display_carries_context() {
        let err = VaultError::InsufficientBalance { requested: 10, available: 3 };
        assert_eq!(err.to_string(), "insufficient vault balance: requested 10, available 3");
    }
}
