//! Keeps budget usage in step with the transactions recorded on an account.

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ledger::{Account, Transaction};

use super::{ServiceError, ServiceResult};

/// Stateless budgeting utilities that operate over an [`Account`].
pub struct BudgetService;

impl BudgetService {
    /// Adds the transaction's amount to the budget of its category when the
    /// transaction is a live expense dated inside that budget's window.
    pub fn apply_transaction(account: &mut Account, txn_id: Uuid) -> ServiceResult<bool> {
        let (category_id, date, amount) = Self::budget_relevant(account, txn_id)?;
        let applied = account
            .budget_for_mut(category_id)
            .filter(|budget| budget.is_active_on(date))
            .map(|budget| budget.add_expense(amount))
            .unwrap_or(false);
        if applied {
            debug!(txn = %txn_id, category = %category_id, amount, "expense applied to budget");
        }
        Ok(applied)
    }

    /// Inverse of [`BudgetService::apply_transaction`].
    pub fn revert_transaction(account: &mut Account, txn_id: Uuid) -> ServiceResult<bool> {
        let (category_id, date, amount) = Self::budget_relevant(account, txn_id)?;
        let reverted = account
            .budget_for_mut(category_id)
            .filter(|budget| budget.is_active_on(date))
            .map(|budget| budget.remove_expense(amount))
            .unwrap_or(false);
        Ok(reverted)
    }

    /// Recomputes every budget's spent amount from the live expenses in its
    /// category and window.
    pub fn recalculate(account: &mut Account) {
        let totals: Vec<(Uuid, f64)> = account
            .budgets()
            .iter()
            .map(|budget| {
                let window = budget.window();
                let spent = account
                    .transactions_in_range(window.start, window.end)
                    .into_iter()
                    .filter(|txn| txn.is_expense() && txn.category_id == budget.category_id)
                    .map(|txn| txn.amount)
                    .sum();
                (budget.id, spent)
            })
            .collect();
        for (budget_id, spent) in totals {
            if let Some(budget) = account.budget_mut(budget_id) {
                budget.set_used_amount(spent);
            }
        }
    }

    /// Starts a new cycle for every budget whose window ended before `today`.
    pub fn roll_over(account: &mut Account, today: NaiveDate) -> usize {
        let mut rolled = 0;
        for budget in account.budgets_mut() {
            if budget.end_date < today {
                budget.reset_for_new_period(today);
                rolled += 1;
            }
        }
        if rolled > 0 {
            info!(account = %account.id, rolled, "budgets rolled into a new period");
        }
        rolled
    }

    fn budget_relevant(account: &Account, txn_id: Uuid) -> ServiceResult<(Uuid, NaiveDate, f64)> {
        let txn: &Transaction = account
            .transaction(txn_id)
            .ok_or(ServiceError::TransactionNotFound(txn_id))?;
        if !txn.is_expense() || txn.is_deleted() {
            // Zero amounts are declined by the budget itself.
            return Ok((txn.category_id, txn.date(), 0.0));
        }
        Ok((txn.category_id, txn.date(), txn.amount))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::ledger::{Budget, BudgetPeriod, BudgetStatus, Category};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_opt(18, 0, 0).unwrap()
    }

    fn account_with_budget() -> (Account, Uuid, Uuid) {
        let mut account = Account::new("Budgeter");
        let food = Category::new("Food");
        let food_id = food.id;
        account.add_category(food);
        let budget = Budget::new(food_id, 200.0, BudgetPeriod::Monthly, day(2024, 1, 1));
        let budget_id = budget.id;
        account.add_budget(budget);
        (account, food_id, budget_id)
    }

    #[test]
    fn apply_and_revert_track_expenses_inside_window() {
        let (mut account, food_id, budget_id) = account_with_budget();
        let inside = Transaction::expense(170.0, food_id, at(2024, 1, 12));
        let outside = Transaction::expense(50.0, food_id, at(2024, 2, 2));
        let (inside_id, outside_id) = (inside.id(), outside.id());
        account.add_transaction(inside);
        account.add_transaction(outside);

        assert!(BudgetService::apply_transaction(&mut account, inside_id).unwrap());
        assert!(!BudgetService::apply_transaction(&mut account, outside_id).unwrap());
        let budget = account.budget(budget_id).unwrap();
        assert_eq!(budget.used_amount(), 170.0);
        assert_eq!(budget.status(), BudgetStatus::Warning);

        assert!(BudgetService::revert_transaction(&mut account, inside_id).unwrap());
        assert_eq!(account.budget(budget_id).unwrap().used_amount(), 0.0);
    }

    #[test]
    fn income_does_not_touch_budgets() {
        let (mut account, food_id, budget_id) = account_with_budget();
        let refund = Transaction::income(30.0, food_id, at(2024, 1, 3));
        let refund_id = refund.id();
        account.add_transaction(refund);
        assert!(!BudgetService::apply_transaction(&mut account, refund_id).unwrap());
        assert_eq!(account.budget(budget_id).unwrap().used_amount(), 0.0);
    }

    #[test]
    fn unknown_transaction_is_reported() {
        let (mut account, _, _) = account_with_budget();
        let missing = Uuid::new_v4();
        let err = BudgetService::apply_transaction(&mut account, missing)
            .expect_err("unknown id must fail");
        assert!(matches!(err, ServiceError::TransactionNotFound(id) if id == missing));
    }

    #[test]
    fn recalculate_ignores_deleted_and_foreign_entries() {
        let (mut account, food_id, budget_id) = account_with_budget();
        let kept = Transaction::expense(120.0, food_id, at(2024, 1, 5));
        let deleted = Transaction::expense(60.0, food_id, at(2024, 1, 6));
        let deleted_id = deleted.id();
        account.add_transaction(kept);
        account.add_transaction(deleted);
        account.add_transaction(Transaction::expense(999.0, Uuid::new_v4(), at(2024, 1, 7)));
        account.remove_transaction(deleted_id);

        BudgetService::recalculate(&mut account);
        let budget = account.budget(budget_id).unwrap();
        assert_eq!(budget.used_amount(), 120.0);
        assert_eq!(budget.status(), BudgetStatus::Active);
    }

    #[test]
    fn roll_over_resets_only_expired_budgets() {
        let (mut account, food_id, budget_id) = account_with_budget();
        let rent = Budget::new(Uuid::new_v4(), 900.0, BudgetPeriod::Yearly, day(2024, 1, 1));
        let rent_id = rent.id;
        account.add_budget(rent);
        account.add_transaction(Transaction::expense(80.0, food_id, at(2024, 1, 9)));
        BudgetService::recalculate(&mut account);

        let rolled = BudgetService::roll_over(&mut account, day(2024, 2, 1));
        assert_eq!(rolled, 1);
        let food = account.budget(budget_id).unwrap();
        assert_eq!(food.used_amount(), 0.0);
        assert_eq!(food.start_date, day(2024, 2, 1));
        assert_eq!(food.end_date, day(2024, 2, 29));
        assert_eq!(account.budget(rent_id).unwrap().start_date, day(2024, 1, 1));
    }
}
