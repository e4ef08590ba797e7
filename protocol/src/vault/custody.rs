//! # Custody Vault
//!
//! The single state aggregate behind every vault operation. Each mutating
//! operation takes the host's [`CallContext`] (authenticated caller and
//! current block height), validates every precondition, and only then
//! mutates. On top of that it runs inside [`CustodyVault::atomically`],
//! which restores a snapshot if the operation fails, so no partial write is
//! ever observable.
//!
//! Value only crosses the vault boundary through the host's
//! [`NativeTransfer`] primitive, and that transfer is always the last
//! fallible step of an operation.
//!
//! ## Operation Surface
//!
//! | Operation | Caller | Failures |
//! |---|---|---|
//! | [`configure`](CustodyVault::configure) | owner | Unauthorized, AlreadyConfigured, InvalidDuration, InvalidThreshold |
//! | [`add_guardian`](CustodyVault::add_guardian) / [`remove_guardian`](CustodyVault::remove_guardian) | owner | Unauthorized |
//! | [`deposit`](CustodyVault::deposit) | any | InvalidAmount |
//! | [`initiate_stake`](CustodyVault::initiate_stake) | any | InvalidAmount, InsufficientBalance, PositionExists |
//! | [`harvest`](CustodyVault::harvest) | stake holder | NoActivePosition |
//! | [`complete_stake`](CustodyVault::complete_stake) | stake holder | NoActivePosition |
//! | [`sign`](CustodyVault::sign) | guardian | Unauthorized, DuplicateSignature |
//! | [`begin_round`](CustodyVault::begin_round) | owner | Unauthorized |
//! | [`withdraw`](CustodyVault::withdraw) | any | InsufficientBalance, TimelockActive |
//! | [`update_heir`](CustodyVault::update_heir) | owner | Unauthorized |
//! | [`transfer_ownership`](CustodyVault::transfer_ownership) | owner | Unauthorized |
//! | [`adjust_yield_rate`](CustodyVault::adjust_yield_rate) | owner | Unauthorized, InvalidPercentage |

use serde::{Deserialize, Serialize};

use super::access::AccessControl;
use super::accrual::{YieldBook, YieldStake};
use super::authorization::GuardianRound;
use super::error::VaultError;
use super::ledger::VaultLedger;
use super::timelock::TimelockGate;
use super::withdrawal::{self, WithdrawalPath, WithdrawalReceipt};
use crate::config::{blocks_to_duration, DEFAULT_YIELD_RATE_PERCENT};
use crate::host::NativeTransfer;
use crate::types::{AccountId, BlockHeight, CallContext};

/// The vault: access control, timelock, guardian round, yield book and
/// ledger, plus the host account that holds the custodied funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyVault {
    /// Host account holding the vault's funds.
    custody: AccountId,
    access: AccessControl,
    timelock: TimelockGate,
    round: GuardianRound,
    yields: YieldBook,
    ledger: VaultLedger,
}

/// Point-in-time view of every vault field, for queries and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSummary {
    pub height: BlockHeight,
    pub owner: AccountId,
    pub custody: AccountId,
    pub configured: bool,
    pub timelock_expiry: BlockHeight,
    pub timelock_expired: bool,
    pub heir: Option<AccountId>,
    pub heir_emergency_opens_at: Option<BlockHeight>,
    pub guardians: Vec<AccountId>,
    pub guardian_threshold: u32,
    pub round_id: u64,
    pub signature_count: u32,
    pub threshold_met: bool,
    pub total_balance: u64,
    pub total_staked: u64,
    pub cumulative_yield: u64,
    pub yield_rate_percent: u32,
    pub yield_active: bool,
    pub active_stakes: usize,
}

impl CustodyVault {
    /// Deploys a vault. The deployer becomes the owner; `custody` is the
    /// host account that will hold deposits.
    pub fn deploy(owner: AccountId, custody: AccountId) -> Self {
        tracing::info!(owner = %owner, custody = %custody, "vault deployed");
        Self {
            custody,
            access: AccessControl::new(owner),
            timelock: TimelockGate::new(),
            round: GuardianRound::new(),
            yields: YieldBook::new(DEFAULT_YIELD_RATE_PERCENT),
            ledger: VaultLedger::new(),
        }
    }

    /// Runs `op` against the vault and restores the prior state if it fails.
    fn atomically<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, VaultError>,
    ) -> Result<R, VaultError> {
        let snapshot = self.clone();
        let result = op(self);
        if let Err(err) = &result {
            tracing::debug!(error = %err, code = err.code(), "operation rolled back");
            *self = snapshot;
        }
        result
    }

    // -- Configuration ------------------------------------------------------

    /// One-time setup: arms the timelock at `height + duration_blocks`, sets
    /// the guardian threshold and the (optional) heir.
    pub fn configure(
        &mut self,
        ctx: &CallContext,
        duration_blocks: u64,
        guardian_threshold: u32,
        heir: Option<AccountId>,
    ) -> Result<BlockHeight, VaultError> {
        self.atomically(|v| {
            v.access.ensure_owner(&ctx.caller)?;
            v.timelock.ensure_configurable(duration_blocks)?;
            GuardianRound::validate_threshold(guardian_threshold)?;
            let expiry = TimelockGate::expiry_for(ctx.height, duration_blocks)?;

            v.timelock.arm(expiry, heir);
            v.round.set_threshold(guardian_threshold);

            tracing::info!(
                height = ctx.height,
                expiry,
                lock = ?blocks_to_duration(duration_blocks),
                threshold = guardian_threshold,
                heir = ?v.timelock.heir().map(AccountId::as_str),
                "vault configured"
            );
            Ok(expiry)
        })
    }

    /// Replaces or clears the heir. Allowed at any time, unlike the timelock.
    pub fn update_heir(&mut self, ctx: &CallContext, heir: Option<AccountId>) -> Result<(), VaultError> {
        self.atomically(|v| {
            v.access.ensure_owner(&ctx.caller)?;
            tracing::info!(heir = ?heir.as_ref().map(AccountId::as_str), "heir updated");
            v.timelock.set_heir(heir);
            Ok(())
        })
    }

    /// Hands the owner role to `new_owner`. The custody account is accepted;
    /// while it owns the vault, positive withdrawals fail with
    /// [`TransferError::SelfTransfer`](crate::host::TransferError::SelfTransfer).
    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: AccountId) -> Result<(), VaultError> {
        self.atomically(|v| v.access.transfer_ownership(&ctx.caller, new_owner))
    }

    pub fn add_guardian(&mut self, ctx: &CallContext, account: AccountId) -> Result<(), VaultError> {
        self.atomically(|v| v.access.add_guardian(&ctx.caller, account))
    }

    pub fn remove_guardian(&mut self, ctx: &CallContext, account: &AccountId) -> Result<(), VaultError> {
        self.atomically(|v| v.access.remove_guardian(&ctx.caller, account))
    }

    /// Sets the annual yield rate (whole percent, 0-100).
    pub fn adjust_yield_rate(&mut self, ctx: &CallContext, rate_percent: u32) -> Result<(), VaultError> {
        self.atomically(|v| {
            v.access.ensure_owner(&ctx.caller)?;
            let previous = v.yields.rate_percent();
            v.yields.set_rate(rate_percent)?;
            tracing::info!(previous, rate = rate_percent, "yield rate adjusted");
            Ok(())
        })
    }

    // -- Guardian rounds ----------------------------------------------------

    /// Starts a new authorization round. Returns the new round id.
    pub fn begin_round(&mut self, ctx: &CallContext) -> Result<u64, VaultError> {
        self.atomically(|v| {
            v.access.ensure_owner(&ctx.caller)?;
            let round = v.round.begin()?;
            tracing::info!(round, height = ctx.height, "authorization round started");
            Ok(round)
        })
    }

    /// Records the calling guardian's approval. Returns the signature count.
    pub fn sign(&mut self, ctx: &CallContext) -> Result<u32, VaultError> {
        self.atomically(|v| {
            let count = v.round.sign(&v.access, &ctx.caller)?;
            tracing::info!(
                guardian = %ctx.caller,
                round = v.round.round_id(),
                signatures = count,
                threshold = v.round.threshold(),
                "guardian signed"
            );
            Ok(count)
        })
    }

    // -- Funds --------------------------------------------------------------

    /// Moves `amount` from the caller's host account into custody. Returns
    /// the new available balance.
    pub fn deposit<H: NativeTransfer>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        amount: u64,
    ) -> Result<u64, VaultError> {
        self.atomically(|v| {
            if amount == 0 {
                return Err(VaultError::InvalidAmount);
            }
            v.ledger.ensure_can_credit(amount)?;

            host.transfer(amount, &ctx.caller, &v.custody)?;
            let balance = v.ledger.credit(amount)?;

            tracing::info!(depositor = %ctx.caller, amount, balance, "deposit");
            Ok(balance)
        })
    }

    /// Releases `amount` to the owner if the withdrawal gate admits the
    /// caller.
    pub fn withdraw<H: NativeTransfer>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        amount: u64,
    ) -> Result<WithdrawalReceipt, VaultError> {
        self.atomically(|v| {
            v.ledger.ensure_available(amount)?;
            let path = withdrawal::authorize(&v.timelock, &v.round, &ctx.caller, ctx.height)?;
            let recipient = v.access.owner().clone();

            let balance = v.ledger.debit(amount)?;
            if amount > 0 {
                host.transfer(amount, &v.custody, &recipient)?;
            }

            tracing::info!(
                caller = %ctx.caller,
                recipient = %recipient,
                amount,
                balance,
                %path,
                height = ctx.height,
                "withdrawal released"
            );
            Ok(WithdrawalReceipt {
                amount,
                recipient,
                path,
                round_id: v.round.round_id(),
            })
        })
    }

    // -- Yield --------------------------------------------------------------

    /// Moves `amount` of the pool into a new yield stake for the caller.
    pub fn initiate_stake(&mut self, ctx: &CallContext, amount: u64) -> Result<(), VaultError> {
        self.atomically(|v| {
            if amount == 0 {
                return Err(VaultError::InvalidAmount);
            }
            v.ledger.ensure_available(amount)?;
            v.yields.ensure_no_position(&ctx.caller)?;

            v.ledger.debit(amount)?;
            v.yields.open(ctx.caller.clone(), amount, ctx.height);

            tracing::info!(staker = %ctx.caller, amount, height = ctx.height, "stake opened");
            Ok(())
        })
    }

    /// Credits the yield accrued since the caller's last harvest. Principal
    /// stays staked. Returns the yield.
    pub fn harvest(&mut self, ctx: &CallContext) -> Result<u64, VaultError> {
        self.atomically(|v| {
            let quote = v.yields.quote(&ctx.caller, ctx.height)?;
            if quote.blocks_elapsed == 0 {
                return Err(VaultError::NoActivePosition(ctx.caller.clone()));
            }

            v.ledger.credit_yield(quote.yield_amount)?;
            v.yields.mark_harvested(&ctx.caller, ctx.height)?;

            tracing::info!(
                staker = %ctx.caller,
                blocks = quote.blocks_elapsed,
                yield_amount = quote.yield_amount,
                "yield harvested"
            );
            Ok(quote.yield_amount)
        })
    }

    /// Closes the caller's stake, returning principal plus final yield to
    /// the pool. Returns that total.
    pub fn complete_stake(&mut self, ctx: &CallContext) -> Result<u64, VaultError> {
        self.atomically(|v| {
            let quote = v.yields.quote(&ctx.caller, ctx.height)?;
            let payout = quote
                .principal
                .checked_add(quote.yield_amount)
                .ok_or(VaultError::AmountOverflow)?;

            v.ledger.settle_stake(quote.principal, quote.yield_amount)?;
            v.yields.close(&ctx.caller)?;

            tracing::info!(
                staker = %ctx.caller,
                principal = quote.principal,
                yield_amount = quote.yield_amount,
                payout,
                "stake completed"
            );
            Ok(payout)
        })
    }

    // -- Queries ------------------------------------------------------------

    pub fn owner(&self) -> &AccountId {
        self.access.owner()
    }

    pub fn is_owner(&self, account: &AccountId) -> bool {
        self.access.is_owner(account)
    }

    /// Host account holding the vault's funds.
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn is_guardian(&self, account: &AccountId) -> bool {
        self.access.is_guardian(account)
    }

    pub fn guardians(&self) -> impl Iterator<Item = &AccountId> {
        self.access.guardians()
    }

    pub fn timelock_expiry(&self) -> BlockHeight {
        self.timelock.expiry()
    }

    pub fn is_configured(&self) -> bool {
        self.timelock.is_configured()
    }

    pub fn heir(&self) -> Option<&AccountId> {
        self.timelock.heir()
    }

    pub fn guardian_threshold(&self) -> u32 {
        self.round.threshold()
    }

    pub fn is_timelock_expired(&self, height: BlockHeight) -> bool {
        self.timelock.is_expired(height)
    }

    pub fn is_heir_emergency_eligible(&self, caller: &AccountId, height: BlockHeight) -> bool {
        self.timelock.is_heir_emergency_eligible(caller, height)
    }

    pub fn round_id(&self) -> u64 {
        self.round.round_id()
    }

    pub fn signature_count(&self) -> u32 {
        self.round.signature_count()
    }

    /// Whether `guardian` signed the current round.
    pub fn has_signed(&self, guardian: &AccountId) -> bool {
        self.round.has_signed(guardian)
    }

    pub fn has_met_threshold(&self) -> bool {
        self.round.has_met_threshold()
    }

    pub fn total_balance(&self) -> u64 {
        self.ledger.total_balance()
    }

    pub fn cumulative_yield(&self) -> u64 {
        self.ledger.cumulative_yield()
    }

    pub fn yield_rate_percent(&self) -> u32 {
        self.yields.rate_percent()
    }

    pub fn is_yield_active(&self) -> bool {
        self.yields.is_active()
    }

    pub fn stake_of(&self, account: &AccountId) -> Option<&YieldStake> {
        self.yields.stake_of(account)
    }

    /// Principal staked by `account`; zero without a stake.
    pub fn staked_amount(&self, account: &AccountId) -> u64 {
        self.yields.staked_amount(account)
    }

    pub fn total_staked(&self) -> u64 {
        self.yields.total_staked()
    }

    /// What `harvest` would pay `account` at `height`; zero without a stake.
    pub fn pending_yield(&self, account: &AccountId, height: BlockHeight) -> u64 {
        self.yields
            .quote(account, height)
            .map_or(0, |quote| quote.yield_amount)
    }

    /// Which gate, if any, would admit a withdrawal by `caller` at `height`.
    pub fn withdrawal_path(&self, caller: &AccountId, height: BlockHeight) -> Option<WithdrawalPath> {
        withdrawal::admitting_path(&self.timelock, &self.round, caller, height)
    }

    /// Every field at once.
    pub fn summary(&self, height: BlockHeight) -> VaultSummary {
        VaultSummary {
            height,
            owner: self.owner().clone(),
            custody: self.custody.clone(),
            configured: self.is_configured(),
            timelock_expiry: self.timelock_expiry(),
            timelock_expired: self.is_timelock_expired(height),
            heir: self.heir().cloned(),
            heir_emergency_opens_at: self.heir().map(|_| self.timelock.emergency_opens_at()),
            guardians: self.guardians().cloned().collect(),
            guardian_threshold: self.guardian_threshold(),
            round_id: self.round_id(),
            signature_count: self.signature_count(),
            threshold_met: self.has_met_threshold(),
            total_balance: self.total_balance(),
            total_staked: self.total_staked(),
            cumulative_yield: self.cumulative_yield(),
            yield_rate_percent: self.yield_rate_percent(),
            yield_active: self.is_yield_active(),
            active_stakes: self.yields.stake_count(),
        }
    }
}
