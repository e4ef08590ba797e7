//! # Vault Module — Timelocked Guardian Custody
//!
//! The vault holds native value on behalf of a single owner. Nothing leaves
//! it unless the timelock has expired and a quorum of guardians has signed
//! the current round, or, after a long grace period, the designated heir
//! asks. Idle funds can be staked to earn simple annual yield.
//!
//! ## Architecture
//!
//! ```text
//! error.rs         — VaultError and its stable numeric codes
//! access.rs        — Owner identity and the guardian registry
//! timelock.rs      — One-shot timelock and the heir emergency window
//! authorization.rs — Numbered guardian signature rounds
//! withdrawal.rs    — The withdrawal gate composing the two above
//! accrual.rs       — Yield formula and per-account stakes
//! ledger.rs        — Pool balance and cumulative yield
//! custody.rs       — CustodyVault, the aggregate every operation runs on
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` base units.** No floating point anywhere; the
//!    yield formula widens to `u128` and truncates.
//!
//! 2. **Validate, then mutate.** Every operation checks all of its
//!    preconditions before the first write, and runs under a snapshot that
//!    is restored on failure.
//!
//! 3. **Funds always go to the owner.** Guardians and the heir can unlock a
//!    withdrawal; neither can redirect it.
//!
//! 4. **Serializable state.** [`CustodyVault`] derives `Serialize` and
//!    `Deserialize` so it can be persisted with bincode between calls.

pub mod access;
pub mod accrual;
pub mod authorization;
pub mod custody;
pub mod error;
pub mod ledger;
pub mod timelock;
pub mod withdrawal;

pub use access::AccessControl;
pub use accrual::{accrue, AccrualQuote, YieldBook, YieldStake};
pub use authorization::GuardianRound;
pub use custody::{CustodyVault, VaultSummary};
pub use error::VaultError;
pub use ledger::VaultLedger;
pub use timelock::TimelockGate;
pub use withdrawal::{WithdrawalPath, WithdrawalReceipt};
