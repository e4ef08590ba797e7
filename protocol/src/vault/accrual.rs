//! # Yield Accrual
//!
//! Simple, time-proportional interest on staked principal:
//!
//! ```text
//! yield = floor(principal * rate_percent * blocks_elapsed / (BLOCKS_PER_YEAR * 100))
//! ```
//!
//! Integer arithmetic throughout, truncating toward zero. [`accrue`] is the
//! only place a yield amount is ever computed; harvest and stake completion
//! both go through it.
//!
//! Each account holds at most one live [`YieldStake`]. The stake's
//! `last_harvest_height` is the start of the next accrual interval.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::VaultError;
use crate::config::{is_valid_yield_rate, BLOCKS_PER_YEAR, PERCENT_DENOMINATOR};
use crate::types::{AccountId, BlockHeight};

/// Yield earned by `principal` over `blocks_elapsed` blocks at
/// `annual_rate_percent`.
///
/// Pure. The product is formed in `u128`; anything beyond `u64::MAX`,
/// including a product too large for `u128`, saturates.
pub fn accrue(principal: u64, blocks_elapsed: u64, annual_rate_percent: u32) -> u64 {
    let denominator = u128::from(BLOCKS_PER_YEAR) * u128::from(PERCENT_DENOMINATOR);
    u128::from(principal)
        .checked_mul(u128::from(annual_rate_percent))
        .and_then(|n| n.checked_mul(u128::from(blocks_elapsed)))
        .and_then(|n| u64::try_from(n / denominator).ok())
        .unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// YieldStake
// ---------------------------------------------------------------------------

/// One account's live yield position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldStake {
    /// Principal removed from the pool while the stake is live.
    pub staked_amount: u64,
    /// Height the stake was opened.
    pub stake_start_height: BlockHeight,
    /// Height of the last harvest (or of opening, before any harvest).
    pub last_harvest_height: BlockHeight,
}

/// The outcome of pricing a stake at some height, before anything is
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualQuote {
    /// The stake's principal.
    pub principal: u64,
    /// Blocks since the last harvest.
    pub blocks_elapsed: u64,
    /// Yield over that interval.
    pub yield_amount: u64,
}

// ---------------------------------------------------------------------------
// YieldBook
// ---------------------------------------------------------------------------

/// Every live stake, the vault-wide rate, and the coarse "yield active" flag.
///
/// The flag is set whenever any stake opens and cleared whenever any stake
/// completes, even if other stakes are still live. It is not an "any stakes
/// outstanding" indicator; use [`YieldBook::stake_count`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldBook {
    stakes: BTreeMap<AccountId, YieldStake>,
    rate_percent: u32,
    active: bool,
}

impl YieldBook {
    /// No stakes, the given annual rate, flag cleared.
    pub fn new(rate_percent: u32) -> Self {
        Self {
            stakes: BTreeMap::new(),
            rate_percent,
            active: false,
        }
    }

    /// Current annual rate, whole percent.
    pub fn rate_percent(&self) -> u32 {
        self.rate_percent
    }

    /// Replaces the annual rate. Applies to every live stake from the next
    /// harvest on, including blocks already elapsed.
    pub fn set_rate(&mut self, rate_percent: u32) -> Result<(), VaultError> {
        if !is_valid_yield_rate(rate_percent) {
            return Err(VaultError::InvalidPercentage(rate_percent));
        }
        self.rate_percent = rate_percent;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stake_of(&self, account: &AccountId) -> Option<&YieldStake> {
        self.stakes.get(account)
    }

    /// Principal staked by `account`; zero without a stake.
    pub fn staked_amount(&self, account: &AccountId) -> u64 {
        self.stakes.get(account).map_or(0, |s| s.staked_amount)
    }

    /// Sum of every live principal.
    pub fn total_staked(&self) -> u64 {
        self.stakes
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.staked_amount))
    }

    pub fn stake_count(&self) -> usize {
        self.stakes.len()
    }

    /// Fails with [`VaultError::PositionExists`] if `account` has a stake.
    pub fn ensure_no_position(&self, account: &AccountId) -> Result<(), VaultError> {
        if self.stakes.contains_key(account) {
            return Err(VaultError::PositionExists(account.clone()));
        }
        Ok(())
    }

    /// Opens a stake for `account`. Callers check
    /// [`ensure_no_position`](Self::ensure_no_position) and debit the
    /// ledger first.
    pub fn open(&mut self, account: AccountId, amount: u64, height: BlockHeight) {
        self.stakes.insert(
            account,
            YieldStake {
                staked_amount: amount,
                stake_start_height: height,
                last_harvest_height: height,
            },
        );
        self.active = true;
    }

    /// Prices `account`'s stake at `height` without touching it.
    ///
    /// A height before the last harvest counts as zero elapsed blocks.
    pub fn quote(&self, account: &AccountId, height: BlockHeight) -> Result<AccrualQuote, VaultError> {
        let stake = self
            .stakes
            .get(account)
            .ok_or_else(|| VaultError::NoActivePosition(account.clone()))?;
        let blocks_elapsed = height.saturating_sub(stake.last_harvest_height);
        let yield_amount = accrue(stake.staked_amount, blocks_elapsed, self.rate_percent);

        tracing::debug!(
            account = %account,
            principal = stake.staked_amount,
            blocks_elapsed,
            rate = self.rate_percent,
            yield_amount,
            "accrual quoted"
        );

        Ok(AccrualQuote {
            principal: stake.staked_amount,
            blocks_elapsed,
            yield_amount,
        })
    }

    /// Moves the start of `account`'s next accrual interval to `height`.
    pub fn mark_harvested(&mut self, account: &AccountId, height: BlockHeight) -> Result<(), VaultError> {
        let stake = self
            .stakes
            .get_mut(account)
            .ok_or_else(|| VaultError::NoActivePosition(account.clone()))?;
        stake.last_harvest_height = height;
        Ok(())
    }

    /// Destroys `account`'s stake and clears the vault-wide flag.
    pub fn close(&mut self, account: &AccountId) -> Result<YieldStake, VaultError> {
        let stake = self
            .stakes
            .remove(account)
            .ok_or_else(|| VaultError::NoActivePosition(account.clone()))?;
        self.active = false;
        Ok(stake)
    }
}
