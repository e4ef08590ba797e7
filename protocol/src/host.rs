//! # Native Transfer Primitive
//!
//! The vault never moves native currency itself. It asks the host to move
//! value between accounts through [`NativeTransfer`], which is assumed to be
//! atomic, irreversible and all-or-nothing: a transfer either fully happens
//! or leaves every balance untouched.
//!
//! [`HostLedger`] is an in-memory implementation with exactly those
//! semantics. The node binary persists it next to the vault so a devnet
//! operator can exercise deposits and withdrawals end to end, and the test
//! suites use it as the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons the host refuses a transfer. A refused transfer changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The sender does not hold enough to cover the transfer.
    #[error("insufficient funds: {account} holds {available}, transfer needs {requested}")]
    InsufficientFunds {
        /// The account being debited.
        account: AccountId,
        /// What the account currently holds.
        available: u64,
        /// What the transfer asked for.
        requested: u64,
    },

    /// Sender and recipient are the same account.
    #[error("cannot transfer from {0} to itself")]
    SelfTransfer(AccountId),

    /// Crediting the recipient would exceed `u64::MAX`.
    #[error("balance overflow crediting {0}")]
    Overflow(AccountId),
}

// ---------------------------------------------------------------------------
// NativeTransfer
// ---------------------------------------------------------------------------

/// The host's value-transfer primitive.
pub trait NativeTransfer {
    /// Moves `amount` from `from` to `to`, or fails without side effects.
    fn transfer(&mut self, amount: u64, from: &AccountId, to: &AccountId)
        -> Result<(), TransferError>;

    /// Current native balance of `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> u64;
}

// ---------------------------------------------------------------------------
// HostLedger
// ---------------------------------------------------------------------------

/// In-memory native-currency ledger.
///
/// Balances default to zero; an account appears in the map once it has
/// held value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLedger {
    balances: BTreeMap<AccountId, u64>,
}

impl HostLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates value out of thin air for `account`. Devnet faucet only.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Overflow`] if the balance would wrap.
    pub fn mint(&mut self, account: &AccountId, amount: u64) -> Result<u64, TransferError> {
        let current = self.balance_of(account);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(account.clone()))?;
        self.balances.insert(account.clone(), updated);
        tracing::debug!(account = %account, amount, balance = updated, "host mint");
        Ok(updated)
    }

    /// Iterates over every account that has ever held value.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, u64)> {
        self.balances.iter().map(|(id, bal)| (id, *bal))
    }

    /// Rebuilds a ledger from persisted `(account, balance)` pairs.
    pub fn from_balances(balances: impl IntoIterator<Item = (AccountId, u64)>) -> Self {
        Self {
            balances: balances.into_iter().collect(),
        }
    }

    /// Sum of every balance. Saturates rather than wrapping.
    pub fn total_supply(&self) -> u64 {
        self.balances
            .values()
            .fold(0u64, |acc, bal| acc.saturating_add(*bal))
    }
}

impl NativeTransfer for HostLedger {
    fn transfer(
        &mut self,
        amount: u64,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<(), TransferError> {
        if from == to {
            return Err(TransferError::SelfTransfer(from.clone()));
        }
        if amount == 0 {
            return Ok(());
        }

        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientFunds {
                account: from.clone(),
                available,
                requested: amount,
            })?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(to.clone()))?;

        // Both sides validated; apply together.
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);

        tracing::debug!(from = %from, to = %to, amount, "host transfer");
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::from(s)
    }

    #[test]
    fn unknown_account_holds_zero() {
        let ledger = HostLedger::new();
        assert_eq!(ledger.balance_of(&acct("nobody")), 0);
    }

    #[test]
    fn transfer_moves_value() {
        let mut ledger = HostLedger::new();
        ledger.mint(&acct("alice"), 1_000).unwrap();
        ledger.transfer(400, &acct("alice"), &acct("vault")).unwrap();
        assert_eq!(ledger.balance_of(&acct("alice")), 600);
        assert_eq!(ledger.balance_of(&acct("vault")), 400);
        assert_eq!(ledger.total_supply(), 1_000);
    }

    #[test]
    fn insufficient_funds_leaves_balances_untouched() {
        let mut ledger = HostLedger::new();
        ledger.mint(&acct("alice"), 100).unwrap();
        let before = ledger.clone();

        let err = ledger.transfer(101, &acct("alice"), &acct("vault")).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                account: acct("alice"),
                available: 100,
                requested: 101,
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn self_transfer_rejected() {
        let mut ledger = HostLedger::new();
        ledger.mint(&acct("alice"), 100).unwrap();
        assert!(matches!(
            ledger.transfer(10, &acct("alice"), &acct("alice")),
            Err(TransferError::SelfTransfer(_))
        ));
    }

    #[test]
    fn recipient_overflow_rejected_without_debit() {
        let mut ledger = HostLedger::new();
        ledger.mint(&acct("alice"), 10).unwrap();
        ledger.mint(&acct("whale"), u64::MAX).unwrap();

        let err = ledger.transfer(10, &acct("alice"), &acct("whale")).unwrap_err();
        assert_eq!(err, TransferError::Overflow(acct("whale")));
        assert_eq!(ledger.balance_of(&acct("alice")), 10);
    }

    #[test]
    fn zero_transfer_is_noop() {
        let mut ledger = HostLedger::new();
        ledger.transfer(0, &acct("a"), &acct("b")).unwrap();
        assert_eq!(ledger.accounts().count(), 0);
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut ledger = HostLedger::new();
        ledger.mint(&acct("a"), u64::MAX).unwrap();
        assert!(ledger.mint(&acct("a"), 1).is_err());
    }
}
