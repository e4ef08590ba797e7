//! # Storage Module
//!
//! Persistence for the vault between calls. The vault itself is a plain
//! value; this module writes it, together with the host ledger balances it
//! moved funds through and the height of the last committed call, into a
//! sled database.
//!
//! ## Design Decisions
//!
//! 1. **One transaction per call.** Vault state, host balances and the
//!    latest height are committed together or not at all.
//!
//! 2. **Bincode for on-disk serialization.** Compact and deterministic.
//!    JSON is for the CLI; bincode is for storage.

pub mod db;

pub use db::{DbError, DbResult, VaultDB};
