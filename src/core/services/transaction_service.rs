//! Business logic helpers for recording transactions against an account.

use uuid::Uuid;

use crate::ledger::{Account, Transaction};

use super::{BudgetService, ServiceError, ServiceResult};

/// Validated mutations that keep the matching budget in step with the ledger.
pub struct TransactionService;

impl TransactionService {
    /// Saves a new transaction and charges its category budget when applicable.
    pub fn add(account: &mut Account, mut transaction: Transaction) -> ServiceResult<Uuid> {
        Self::validate(&transaction)?;
        let id = transaction.id();
        transaction.mark_saved();
        if !account.add_transaction(transaction) {
            return Err(ServiceError::Invalid("Transaction was declined".into()));
        }
        BudgetService::apply_transaction(account, id)?;
        Ok(id)
    }

    /// Updates the transaction identified by `id` via the provided mutator.
    ///
    /// The previous amount is released from its budget before the mutator runs and
    /// the new amount is charged afterwards.
    pub fn update<F>(account: &mut Account, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Transaction),
    {
        BudgetService::revert_transaction(account, id)?;
        let txn = account
            .transaction_mut(id)
            .ok_or(ServiceError::TransactionNotFound(id))?;
        let snapshot = txn.clone();
        mutator(txn);
        if let Err(err) = Self::validate(txn) {
            *txn = snapshot;
            BudgetService::apply_transaction(account, id)?;
            return Err(err);
        }
        txn.mark_modified();
        BudgetService::apply_transaction(account, id)?;
        Ok(())
    }

    /// Logically deletes the transaction and releases its budget share.
    pub fn remove(account: &mut Account, id: Uuid) -> ServiceResult<()> {
        BudgetService::revert_transaction(account, id)?;
        account.remove_transaction(id);
        Ok(())
    }

    pub fn restore(account: &mut Account, id: Uuid) -> ServiceResult<()> {
        if !account.restore_transaction(id) {
            return Err(ServiceError::Invalid(format!(
                "Transaction {} is not deleted",
                id
            )));
        }
        BudgetService::apply_transaction(account, id)?;
        Ok(())
    }

    fn validate(transaction: &Transaction) -> ServiceResult<()> {
        if transaction.id().is_nil() {
            return Err(ServiceError::Invalid("Transaction id is empty".into()));
        }
        if !(transaction.amount >= 0.0) {
            return Err(ServiceError::Invalid(format!(
                "Transaction amount must be non-negative, got {}",
                transaction.amount
            )));
        }
        Ok(())
    }
}
