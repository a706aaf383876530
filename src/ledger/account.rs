use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{budget::Budget, category::Category, transaction::Transaction};

/// Name reported for references to categories that no longer exist.
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// The user aggregate: owns every transaction, category and budget.
///
/// Entities reference each other by id only. Adding an entity with a nil id is
/// declined; duplicate ids are accepted and lookups return the first match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    budgets: Vec<Budget>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Uses `id` unless it is nil, in which case a fresh one is generated.
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: if id.is_nil() { Uuid::new_v4() } else { id },
            name: name.into(),
            email: String::new(),
            transactions: Vec::new(),
            categories: Vec::new(),
            budgets: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    // Transactions

    pub fn add_transaction(&mut self, transaction: Transaction) -> bool {
        if transaction.id().is_nil() {
            debug!(account = %self.id, "declining transaction without id");
            return false;
        }
        self.transactions.push(transaction);
        true
    }

    /// Marks the transaction deleted; it stays in [`Account::transactions`].
    pub fn remove_transaction(&mut self, id: Uuid) -> bool {
        match self.transaction_mut(id) {
            Some(txn) => {
                txn.mark_deleted();
                true
            }
            None => false,
        }
    }

    /// Drops every transaction with `id` for good.
    pub fn purge_transaction(&mut self, id: Uuid) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id() != id);
        self.transactions.len() != before
    }

    pub fn restore_transaction(&mut self, id: Uuid) -> bool {
        self.transaction_mut(id)
            .map(|txn| txn.restore())
            .unwrap_or(false)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id() == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id() == id)
    }

    /// Every transaction, deleted ones included.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transactions_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| !txn.is_deleted())
            .filter(|txn| {
                let date = txn.date();
                date >= start && date <= end
            })
            .collect()
    }

    pub fn total_income(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.transactions_in_range(start, end)
            .into_iter()
            .filter(|txn| txn.is_income())
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn total_expense(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.transactions_in_range(start, end)
            .into_iter()
            .filter(|txn| txn.is_expense())
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn balance(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.total_income(start, end) - self.total_expense(start, end)
    }

    // Categories

    pub fn add_category(&mut self, category: Category) -> bool {
        if category.id.is_nil() {
            debug!(account = %self.id, "declining category without id");
            return false;
        }
        self.categories.push(category);
        true
    }

    pub fn remove_category(&mut self, id: Uuid) -> bool {
        let before = self.categories.len();
        self.categories.retain(|category| category.id != id);
        self.categories.len() != before
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn top_level_categories(&self) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.is_top_level())
            .collect()
    }

    pub fn sub_categories(&self, parent_id: Uuid) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.parent_id == Some(parent_id))
            .collect()
    }

    pub fn category_name(&self, id: Uuid) -> String {
        self.category(id)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }

    /// Full ancestry path such as `Living > Food > Groceries`.
    ///
    /// Parents are not required to form a tree, so the walk stops at the first
    /// id it has already visited and at parents that no longer exist.
    pub fn category_path(&self, id: Uuid) -> Option<String> {
        let mut current = self.category(id)?;
        let mut names = vec![current.name.as_str()];
        let mut visited = HashSet::from([current.id]);
        while let Some(parent_id) = current.parent_id {
            if !visited.insert(parent_id) {
                break;
            }
            match self.category(parent_id) {
                Some(parent) => {
                    names.push(parent.name.as_str());
                    current = parent;
                }
                None => break,
            }
        }
        names.reverse();
        Some(names.join(" > "))
    }

    // Budgets

    pub fn add_budget(&mut self, budget: Budget) -> bool {
        if budget.id.is_nil() {
            debug!(account = %self.id, "declining budget without id");
            return false;
        }
        self.budgets.push(budget);
        true
    }

    pub fn remove_budget(&mut self, id: Uuid) -> bool {
        let before = self.budgets.len();
        self.budgets.retain(|budget| budget.id != id);
        self.budgets.len() != before
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn budget_mut(&mut self, id: Uuid) -> Option<&mut Budget> {
        self.budgets.iter_mut().find(|budget| budget.id == id)
    }

    /// First budget attached to `category_id`.
    pub fn budget_for(&self, category_id: Uuid) -> Option<&Budget> {
        self.budgets
            .iter()
            .find(|budget| budget.category_id == category_id)
    }

    pub fn budget_for_mut(&mut self, category_id: Uuid) -> Option<&mut Budget> {
        self.budgets
            .iter_mut()
            .find(|budget| budget.category_id == category_id)
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn budgets_mut(&mut self) -> &mut [Budget] {
        &mut self.budgets
    }
}
