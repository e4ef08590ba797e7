//! # VaultDB — Persistent Storage Engine
//!
//! Keeps the vault and its host ledger on disk between calls, built on
//! sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                  | Value                   |
//! |------------|----------------------|-------------------------|
//! | `vault`    | `state`              | `bincode(CustodyVault)` |
//! | `accounts` | account id (UTF-8)   | balance (8B BE)         |
//! | `metadata` | key (UTF-8)          | value (bytes)           |
//!
//! Heights and balances are stored as big-endian u64.
//!
//! ## Atomicity
//!
//! [`VaultDB::commit`] writes the vault, every host balance and the latest
//! height in a single sled transaction spanning all three trees, then
//! flushes. A crash mid-commit leaves the previous call's state intact.

use sled::transaction::{ConflictableTransactionError, TransactionResult, Transactional};
use sled::{Db, Tree};
use std::path::Path;

use crate::host::HostLedger;
use crate::types::{AccountId, BlockHeight};
use crate::vault::CustodyVault;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("transaction aborted: {0}")]
    Transaction(String),

    #[error("key not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Key in the `vault` tree holding the serialized vault.
const VAULT_STATE: &[u8] = b"state";

/// Key in the `metadata` tree for the height of the last committed call.
const META_LATEST_HEIGHT: &[u8] = b"latest_height";

fn decode_u64(bytes: &[u8], what: &str) -> DbResult<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| DbError::Serialization(format!("invalid {what} bytes")))?;
    Ok(u64::from_be_bytes(raw))
}

// ---------------------------------------------------------------------------
// VaultDB
// ---------------------------------------------------------------------------

/// Persistent storage for one vault deployment.
///
/// sled is thread-safe, so a `VaultDB` can be cloned and shared freely.
#[derive(Debug, Clone)]
pub struct VaultDB {
    db: Db,
    /// The serialized vault under a single key.
    vault: Tree,
    /// Host ledger balances by account.
    accounts: Tree,
    metadata: Tree,
}

impl VaultDB {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let vault = db.open_tree("vault")?;
        let accounts = db.open_tree("accounts")?;
        let metadata = db.open_tree("metadata")?;

        Ok(Self {
            db,
            vault,
            accounts,
            metadata,
        })
    }

    // -- Reads --------------------------------------------------------------

    /// Whether a vault has been committed.
    pub fn has_vault(&self) -> DbResult<bool> {
        Ok(self.vault.contains_key(VAULT_STATE)?)
    }

    /// Load the committed vault, or `None` before the first commit.
    pub fn load_vault(&self) -> DbResult<Option<CustodyVault>> {
        match self.vault.get(VAULT_STATE)? {
            Some(bytes) => {
                let vault: CustodyVault = bincode::deserialize(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(vault))
            }
            None => Ok(None),
        }
    }

    /// Rebuild the host ledger from every stored balance.
    pub fn load_host_ledger(&self) -> DbResult<HostLedger> {
        let mut balances = Vec::with_capacity(self.accounts.len());
        for entry in self.accounts.iter() {
            let (key, value) = entry?;
            let id = std::str::from_utf8(&key)
                .map_err(|e| DbError::Serialization(format!("account key: {e}")))?;
            balances.push((AccountId::new(id), decode_u64(&value, "balance")?));
        }
        Ok(HostLedger::from_balances(balances))
    }

    /// Height of the last committed call, or `None` if nothing was
    /// committed yet.
    pub fn latest_height(&self) -> DbResult<Option<BlockHeight>> {
        match self.metadata.get(META_LATEST_HEIGHT)? {
            Some(bytes) => Ok(Some(decode_u64(&bytes, "height")?)),
            None => Ok(None),
        }
    }

    // -- Writes -------------------------------------------------------------

    /// Persist the vault, the host ledger and `height` atomically, then
    /// flush to disk.
    pub fn commit(&self, vault: &CustodyVault, ledger: &HostLedger, height: BlockHeight) -> DbResult<()> {
        let vault_bytes =
            bincode::serialize(vault).map_err(|e| DbError::Serialization(e.to_string()))?;
        let balances: Vec<(AccountId, u64)> =
            ledger.accounts().map(|(id, bal)| (id.clone(), bal)).collect();
        let height_bytes = height.to_be_bytes();

        let outcome: TransactionResult<(), ()> = (&self.vault, &self.accounts, &self.metadata)
            .transaction(|(vault_tree, accounts, metadata)| {
                vault_tree.insert(VAULT_STATE, vault_bytes.as_slice())?;
                for (id, balance) in &balances {
                    accounts.insert(id.as_str().as_bytes(), &balance.to_be_bytes()[..])?;
                }
                metadata.insert(META_LATEST_HEIGHT, &height_bytes[..])?;
                Ok::<(), ConflictableTransactionError<()>>(())
            });
        outcome.map_err(|e| DbError::Transaction(format!("{e:?}")))?;

        self.db.flush()?;
        tracing::debug!(height, accounts = balances.len(), "vault state committed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
