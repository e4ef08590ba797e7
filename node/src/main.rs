// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bastion Vault Node
//!
//! Entry point for the `bastion-node` binary. Each invocation plays the host
//! ledger for a single call: it loads the vault and the simulated host
//! balances from the data directory, runs one operation with the given
//! caller and block height, and commits the result atomically.
//!
//! - `init`    — deploy a fresh vault
//! - `faucet`  — credit an account in the simulated host ledger
//! - `exec`    — run one vault operation
//! - `status`  — print the vault summary
//! - `account` — print one account's view of the vault
//! - `version` — print build version information

mod cli;
mod commands;
mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bastion_protocol::host::HostLedger;
use bastion_protocol::storage::VaultDB;
use bastion_protocol::types::{AccountId, CallContext};
use bastion_protocol::vault::CustodyVault;

use cli::{BastionNodeCli, Commands};
use config::NodeConfig;
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = BastionNodeCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let node_config = NodeConfig::resolve(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(&node_config.logging.format);
    logging::init_logging(&node_config.logging.level, LogFormat::from_str_lossy(format));

    let db = open_db(&node_config)?;

    match cli.command {
        Commands::Init(args) => init_vault(&db, &node_config, args),
        Commands::Faucet(args) => faucet(&db, args),
        Commands::Exec(args) => exec(&db, args),
        Commands::Status(args) => status(&db, args),
        Commands::Account(args) => account(&db, args),
        Commands::Version => Ok(()),
    }
}

fn open_db(node_config: &NodeConfig) -> Result<VaultDB> {
    let db_path = node_config.db_path();
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;
    let db = VaultDB::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "database opened");
    Ok(db)
}

/// Loads the committed vault, host ledger and last height.
fn load(db: &VaultDB) -> Result<(CustodyVault, HostLedger, u64)> {
    let vault = db
        .load_vault()?
        .context("no vault in this data directory; run `bastion-node init` first")?;
    let host = db.load_host_ledger()?;
    let height = db.latest_height()?.unwrap_or(0);
    Ok((vault, host, height))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_vault(db: &VaultDB, node_config: &NodeConfig, args: cli::InitArgs) -> Result<()> {
    if db.has_vault()? {
        bail!("a vault is already deployed in this data directory");
    }
    let custody = args
        .custody
        .unwrap_or_else(|| node_config.vault.custody_account.clone());
    if custody == args.owner {
        bail!("custody account must differ from the owner");
    }

    let vault = CustodyVault::deploy(AccountId::new(args.owner), AccountId::new(custody));
    let host = db.load_host_ledger()?;
    let height = db.latest_height()?.unwrap_or(0);
    db.commit(&vault, &host, height)?;

    tracing::info!(
        owner = %vault.owner(),
        custody = %vault.custody(),
        data_dir = %node_config.data_dir().display(),
        "vault initialized"
    );
    print_json(&vault.summary(height))
}

fn faucet(db: &VaultDB, args: cli::FaucetArgs) -> Result<()> {
    let (vault, mut host, height) = load(db)?;
    let account = AccountId::new(args.account);
    let balance = host.mint(&account, args.amount)?;
    db.commit(&vault, &host, height)?;
    print_json(&serde_json::json!({ "account": account, "holdings": balance }))
}

fn exec(db: &VaultDB, args: cli::ExecArgs) -> Result<()> {
    let (mut vault, mut host, latest) = load(db)?;
    if args.height < latest {
        bail!("height {} is below the last committed height {}", args.height, latest);
    }

    let ctx = CallContext::new(args.caller, args.height);
    match commands::dispatch(&mut vault, &mut host, &ctx, &args.operation) {
        Ok(outcome) => {
            db.commit(&vault, &host, ctx.height)?;
            print_json(&outcome)
        }
        Err(err) => {
            tracing::warn!(caller = %ctx.caller, height = ctx.height, code = err.code(), error = %err, "operation failed");
            bail!("vault error {}: {}", err.code(), err)
        }
    }
}

fn status(db: &VaultDB, args: cli::StatusArgs) -> Result<()> {
    let (vault, _, latest) = load(db)?;
    print_json(&vault.summary(args.height.unwrap_or(latest)))
}

fn account(db: &VaultDB, args: cli::AccountArgs) -> Result<()> {
    let (vault, host, latest) = load(db)?;
    let id = AccountId::new(args.account);
    print_json(&commands::account_view(&vault, &host, &id, args.height.unwrap_or(latest)))
}

/// Prints version information to stdout.
fn print_version() {
    println!("bastion-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", bastion_protocol::config::PROTOCOL_VERSION);
}
