//! # Vault Ledger
//!
//! The pooled, unstaked balance the vault holds on behalf of its owner, and
//! the running total of yield ever credited. This is the only place where
//! pooled value is mutated; every other component asks the ledger to credit
//! or debit.
//!
//! Every mutator validates before it writes: a call that returns `Err`
//! leaves the ledger exactly as it was.

use serde::{Deserialize, Serialize};

use super::error::VaultError;

/// Aggregate balance bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultLedger {
    /// Available, unstaked value held by the vault.
    total_balance: u64,
    /// Total yield ever credited. Never decreases.
    cumulative_yield: u64,
}

impl VaultLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Available (unstaked) balance.
    pub fn total_balance(&self) -> u64 {
        self.total_balance
    }

    /// Total yield credited over the vault's lifetime.
    pub fn cumulative_yield(&self) -> u64 {
        self.cumulative_yield
    }

    /// Fails with [`VaultError::InsufficientBalance`] if `amount` exceeds
    /// the available balance.
    pub fn ensure_available(&self, amount: u64) -> Result<(), VaultError> {
        if amount > self.total_balance {
            return Err(VaultError::InsufficientBalance {
                requested: amount,
                available: self.total_balance,
            });
        }
        Ok(())
    }

    /// Fails with [`VaultError::AmountOverflow`] if crediting `amount` would
    /// wrap the balance.
    pub fn ensure_can_credit(&self, amount: u64) -> Result<(), VaultError> {
        self.total_balance
            .checked_add(amount)
            .map(|_| ())
            .ok_or(VaultError::AmountOverflow)
    }

    /// Adds `amount` to the available balance. Returns the new balance.
    pub fn credit(&mut self, amount: u64) -> Result<u64, VaultError> {
        self.total_balance = self
            .total_balance
            .checked_add(amount)
            .ok_or(VaultError::AmountOverflow)?;
        Ok(self.total_balance)
    }

    /// Removes `amount` from the available balance. Returns the new balance.
    pub fn debit(&mut self, amount: u64) -> Result<u64, VaultError> {
        self.ensure_available(amount)?;
        self.total_balance -= amount;
        Ok(self.total_balance)
    }

    /// Credits newly created yield: both the available balance and the
    /// cumulative counter grow by `amount`, or neither does.
    pub fn credit_yield(&mut self, amount: u64) -> Result<(), VaultError> {
        self.settle_stake(0, amount)
    }

    /// Returns a stake's principal to the pool together with its final
    /// yield. Only `yield_amount` counts as new value.
    pub fn settle_stake(&mut self, principal: u64, yield_amount: u64) -> Result<(), VaultError> {
        let returned = principal
            .checked_add(yield_amount)
            .ok_or(VaultError::AmountOverflow)?;
        let balance = self
            .total_balance
            .checked_add(returned)
            .ok_or(VaultError::AmountOverflow)?;
        let cumulative = self
            .cumulative_yield
            .checked_add(yield_amount)
            .ok_or(VaultError::AmountOverflow)?;

        self.total_balance = balance;
        self.cumulative_yield = cumulative;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_debit() {
        let mut ledger = VaultLedger::new();
        assert_eq!(ledger.credit(500).unwrap(), 500);
        assert_eq!(ledger.debit(200).unwrap(), 300);
        assert_eq!(ledger.total_balance(), 300);
        assert_eq!(ledger.cumulative_yield(), 0);
    }

    #[test]
    fn debit_beyond_balance_rejected() {
        let mut ledger = VaultLedger::new();
        ledger.credit(100).unwrap();
        let err = ledger.debit(101).unwrap_err();
        assert_eq!(err, VaultError::InsufficientBalance { requested: 101, available: 100 });
        assert_eq!(ledger.total_balance(), 100);
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut ledger = VaultLedger::new();
        ledger.credit(u64::MAX).unwrap();
        assert_eq!(ledger.ensure_can_credit(1), Err(VaultError::AmountOverflow));
        assert_eq!(ledger.credit(1), Err(VaultError::AmountOverflow));
        assert_eq!(ledger.total_balance(), u64::MAX);
    }

    #[test]
    fn yield_counts_toward_both_totals() {
        let mut ledger = VaultLedger::new();
        ledger.credit(1_000).unwrap();
        ledger.credit_yield(25).unwrap();
        assert_eq!(ledger.total_balance(), 1_025);
        assert_eq!(ledger.cumulative_yield(), 25);
    }

    #[test]
    fn settle_stake_only_counts_yield_as_new_value() {
        let mut ledger = VaultLedger::new();
        ledger.settle_stake(500, 7).unwrap();
        assert_eq!(ledger.total_balance(), 507);
        assert_eq!(ledger.cumulative_yield(), 7);
    }

    #[test]
    fn failed_settlement_writes_nothing() {
        let mut ledger = VaultLedger::new();
        ledger.credit(u64::MAX - 5).unwrap();
        let before = ledger.clone();
        assert_eq!(ledger.settle_stake(5, 1), Err(VaultError::AmountOverflow));
        assert_eq!(ledger, before);
    }
}
