// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bastion Protocol — Core Library
//!
//! A custody vault for a single owner's native funds. Value is locked until
//! a timelock expires *and* a quorum of guardians approves, with a fallback
//! that lets a designated heir unlock the funds after a year of grace. While
//! it waits, the balance can be staked for simple, block-proportional yield.
//!
//! The vault runs inside a host ledger that authenticates the caller,
//! supplies the block height, and moves native value. This crate models that
//! boundary explicitly with [`host::NativeTransfer`], so the same vault logic
//! runs against the in-memory [`host::HostLedger`] in tests and against
//! whatever ledger embeds it.
//!
//! ## Architecture
//!
//! - **vault** — Access control, timelock, guardian rounds, yield, ledger.
//! - **host** — The native-transfer primitive and an in-memory host ledger.
//! - **storage** — sled persistence for vault state and host balances.
//! - **types** — Account identifiers, block heights, call context.
//! - **config** — Protocol constants: block time, grace period, rate bounds.
//!
//! ## Design Philosophy
//!
//! 1. Every operation either succeeds completely or leaves no trace.
//! 2. Integer arithmetic only, and every addition is checked.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod host;
pub mod storage;
pub mod types;
pub mod vault;
