use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    errors::{LedgerError, Result},
    ledger::{Account, Budget, Category, Transaction},
    utils::{accounts_dir_in, app_data_dir, ensure_dir, write_atomic},
};

use super::AccountStore;

pub const ACCOUNT_SCHEMA_VERSION: u8 = 1;

/// On-disk envelope for a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDocument {
    #[serde(default = "AccountDocument::schema_version_default")]
    pub schema_version: u8,
    pub saved_at: DateTime<Utc>,
    pub account: Account,
}

impl AccountDocument {
    fn schema_version_default() -> u8 {
        ACCOUNT_SCHEMA_VERSION
    }
}

/// Stores each account as one pretty-printed JSON document under `accounts/`.
///
/// Entity-level calls load the owning document, change it and write it back.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    accounts_dir: PathBuf,
}

impl JsonStorage {
    /// `None` resolves to the application data directory.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        let accounts_dir = accounts_dir_in(&root);
        ensure_dir(&accounts_dir)?;
        Ok(Self { root, accounts_dir })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    /// Opens the store at the config's `data_dir`, falling back to `base`.
    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        Self::new(Some(config.storage_root(base)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn account_path(&self, id: Uuid) -> PathBuf {
        self.accounts_dir.join(format!("{}.json", id))
    }

    fn read_document(path: &Path) -> Result<AccountDocument> {
        let data = fs::read_to_string(path)?;
        let document: AccountDocument = serde_json::from_str(&data)?;
        if document.schema_version > ACCOUNT_SCHEMA_VERSION {
            return Err(LedgerError::Storage(format!(
                "account file `{}` is from a newer schema version",
                path.display()
            )));
        }
        Ok(document)
    }

    fn require_account(&self, id: Uuid) -> Result<Account> {
        self.load_account(id)?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Nothing is written when `change` fails.
    fn modify<R>(
        &self,
        account_id: Uuid,
        change: impl FnOnce(&mut Account) -> Result<R>,
    ) -> Result<R> {
        let mut account = self.require_account(account_id)?;
        let outcome = change(&mut account)?;
        self.save_account(&account)?;
        Ok(outcome)
    }
}

fn require_id(kind: &str, id: Uuid) -> Result<()> {
    if id.is_nil() {
        return Err(LedgerError::InvalidInput(format!(
            "cannot save a {kind} without id"
        )));
    }
    Ok(())
}

impl AccountStore for JsonStorage {
    fn save_account(&self, account: &Account) -> Result<()> {
        if account.id.is_nil() {
            return Err(LedgerError::InvalidInput(
                "cannot save an account without id".into(),
            ));
        }
        let document = AccountDocument {
            schema_version: ACCOUNT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            account: account.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        let path = self.account_path(account.id);
        write_atomic(&path, &json)?;
        debug!(account = %account.id, path = %path.display(), "account saved");
        Ok(())
    }

    fn load_account(&self, id: Uuid) -> Result<Option<Account>> {
        let path = self.account_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let document = Self::read_document(&path)?;
        if document.account.id != id {
            warn!(
                expected = %id,
                found = %document.account.id,
                "account file name does not match its contents"
            );
        }
        Ok(Some(document.account))
    }

    fn delete_account(&self, id: Uuid) -> Result<bool> {
        let path = self.account_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// Ids of every readable account document, sorted.
    fn list_accounts(&self) -> Result<Vec<Uuid>> {
        if !self.accounts_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.accounts_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok());
            match parsed {
                Some(id) => ids.push(id),
                None => warn!(path = %path.display(), "skipping unrecognised file in accounts directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn save_transaction(&self, account_id: Uuid, transaction: &Transaction) -> Result<()> {
        require_id("transaction", transaction.id())?;
        self.modify(account_id, |account| {
            match account.transaction_mut(transaction.id()) {
                Some(existing) => *existing = transaction.clone(),
                None => {
                    account.add_transaction(transaction.clone());
                }
            }
            Ok(())
        })
    }

    fn load_transactions(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self.require_account(account_id)?.transactions().to_vec())
    }

    fn delete_transaction(&self, account_id: Uuid, transaction_id: Uuid) -> Result<bool> {
        self.modify(account_id, |account| Ok(account.purge_transaction(transaction_id)))
    }

    fn save_category(&self, account_id: Uuid, category: &Category) -> Result<()> {
        require_id("category", category.id)?;
        self.modify(account_id, |account| {
            match account.category_mut(category.id) {
                Some(existing) => *existing = category.clone(),
                None => {
                    account.add_category(category.clone());
                }
            }
            Ok(())
        })
    }

    fn load_categories(&self, account_id: Uuid) -> Result<Vec<Category>> {
        Ok(self.require_account(account_id)?.categories().to_vec())
    }

    fn delete_category(&self, account_id: Uuid, category_id: Uuid) -> Result<bool> {
        self.modify(account_id, |account| Ok(account.remove_category(category_id)))
    }

    fn save_budget(&self, account_id: Uuid, budget: &Budget) -> Result<()> {
        require_id("budget", budget.id)?;
        self.modify(account_id, |account| {
            match account.budget_mut(budget.id) {
                Some(existing) => *existing = budget.clone(),
                None => {
                    account.add_budget(budget.clone());
                }
            }
            Ok(())
        })
    }

    fn load_budgets(&self, account_id: Uuid) -> Result<Vec<Budget>> {
        Ok(self.require_account(account_id)?.budgets().to_vec())
    }

    fn delete_budget(&self, account_id: Uuid, budget_id: Uuid) -> Result<bool> {
        self.modify(account_id, |account| Ok(account.remove_budget(budget_id)))
    }
}
