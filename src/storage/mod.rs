pub mod json_backend;

use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{Account, Budget, Category, Transaction};

/// Persistence collaborator for accounts and the entities they own.
///
/// Saves borrow immutably: a failed write never touches the in-memory state,
/// and callers decide whether to retry.
pub trait AccountStore: Send + Sync {
    fn save_account(&self, account: &Account) -> Result<()>;
    fn load_account(&self, id: Uuid) -> Result<Option<Account>>;
    fn delete_account(&self, id: Uuid) -> Result<bool>;
    fn list_accounts(&self) -> Result<Vec<Uuid>>;

    fn save_transaction(&self, account_id: Uuid, transaction: &Transaction) -> Result<()>;
    fn load_transactions(&self, account_id: Uuid) -> Result<Vec<Transaction>>;
    fn delete_transaction(&self, account_id: Uuid, transaction_id: Uuid) -> Result<bool>;

    fn save_category(&self, account_id: Uuid, category: &Category) -> Result<()>;
    fn load_categories(&self, account_id: Uuid) -> Result<Vec<Category>>;
    fn delete_category(&self, account_id: Uuid, category_id: Uuid) -> Result<bool>;

    fn save_budget(&self, account_id: Uuid, budget: &Budget) -> Result<()>;
    fn load_budgets(&self, account_id: Uuid) -> Result<Vec<Budget>>;
    fn delete_budget(&self, account_id: Uuid, budget_id: Uuid) -> Result<bool>;
}

pub use json_backend::JsonStorage;
