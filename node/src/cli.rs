//! # CLI Interface
//!
//! Defines the command-line argument structure for `bastion-node` using
//! `clap` derive. Every vault operation is reachable through `exec`, which
//! plays the host's role: it names the authenticated caller and the current
//! block height.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bastion vault operator node.
///
/// Runs a timelocked, guardian-gated custody vault against a local
/// simulated host ledger, persisting state between invocations.
#[derive(Parser, Debug)]
#[command(
    name = "bastion-node",
    about = "Bastion vault operator node",
    version,
    propagate_version = true
)]
pub struct BastionNodeCli {
    /// Path to the node configuration file (TOML).
    ///
    /// When omitted, the node looks for `config.toml` in the data directory.
    #[arg(long, short = 'c', env = "BASTION_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the vault database. Overrides the config file.
    #[arg(long, short = 'd', env = "BASTION_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log output format: `pretty` or `json`. Overrides the config file.
    #[arg(long, env = "BASTION_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Bastion node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a fresh vault into the data directory.
    Init(InitArgs),
    /// Credit external holdings in the simulated host ledger.
    Faucet(FaucetArgs),
    /// Run one vault operation as `caller` at `height`.
    Exec(ExecArgs),
    /// Print the vault summary as JSON.
    Status(StatusArgs),
    /// Print one account's view of the vault as JSON.
    Account(AccountArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Account that deploys, and therefore owns, the vault.
    #[arg(long)]
    pub owner: String,

    /// Host account that holds custodied funds. Defaults to the config value.
    #[arg(long)]
    pub custody: Option<String>,
}

/// Arguments for the `faucet` subcommand.
#[derive(Parser, Debug)]
pub struct FaucetArgs {
    #[arg(long)]
    pub account: String,

    #[arg(long)]
    pub amount: u64,
}

/// Arguments for the `exec` subcommand.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Authenticated caller of the operation.
    #[arg(long)]
    pub caller: String,

    /// Current block height. Must not be below the last committed height.
    #[arg(long)]
    pub height: u64,

    #[command(subcommand)]
    pub operation: Operation,
}

/// Vault operations, one per public entry point.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// One-time timelock, threshold and heir setup (owner).
    Configure {
        /// Lock duration in blocks from the current height.
        #[arg(long)]
        duration: u64,
        /// Guardian signatures required per round.
        #[arg(long)]
        threshold: u32,
        #[arg(long)]
        heir: Option<String>,
    },
    /// Register a guardian (owner).
    AddGuardian {
        #[arg(long)]
        guardian: String,
    },
    /// Deregister a guardian (owner).
    RemoveGuardian {
        #[arg(long)]
        guardian: String,
    },
    /// Move funds from the caller into custody.
    Deposit {
        #[arg(long)]
        amount: u64,
    },
    /// Open a yield stake from the vault balance.
    Stake {
        #[arg(long)]
        amount: u64,
    },
    /// Credit accrued yield for the caller's stake.
    Harvest,
    /// Close the caller's stake.
    CompleteStake,
    /// Sign the current authorization round (guardian).
    Sign,
    /// Start a new authorization round (owner).
    BeginRound,
    /// Release funds to the owner.
    Withdraw {
        #[arg(long)]
        amount: u64,
    },
    /// Replace the heir, or clear it when `--heir` is omitted (owner).
    UpdateHeir {
        #[arg(long)]
        heir: Option<String>,
    },
    /// Hand the vault to a new owner (owner).
    TransferOwnership {
        #[arg(long)]
        new_owner: String,
    },
    /// Set the annual yield rate in whole percent (owner).
    SetYieldRate {
        #[arg(long)]
        rate: u32,
    },
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Height to evaluate time-dependent fields at. Defaults to the last
    /// committed height.
    #[arg(long)]
    pub height: Option<u64>,
}

/// Arguments for the `account` subcommand.
#[derive(Parser, Debug)]
pub struct AccountArgs {
    #[arg(long)]
    pub account: String,

    #[arg(long)]
    pub height: Option<u64>,
}
