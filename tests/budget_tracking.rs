use chrono::{NaiveDate, NaiveDateTime};
use finance_core::{
    core::services::{BudgetService, ReportService, ReportType, TransactionService},
    ledger::{
        Account, Budget, BudgetPeriod, BudgetStatus, Category, TimeDimension, Transaction,
        TransactionStatus,
    },
};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(10, 0, 0).unwrap()
}

struct Household {
    account: Account,
    salary: Uuid,
    food: Uuid,
    rent: Uuid,
}

fn household() -> Household {
    let mut account = Account::new("Household");
    let salary = Category::income("Salary");
    let food = Category::new("Food");
    let rent = Category::new("Rent");
    let ids = (salary.id, food.id, rent.id);
    account.add_category(salary);
    account.add_category(food);
    account.add_category(rent);
    account.add_budget(Budget::new(ids.1, 100.0, BudgetPeriod::Monthly, day(2024, 1, 1)));
    Household {
        account,
        salary: ids.0,
        food: ids.1,
        rent: ids.2,
    }
}

#[test]
fn january_statement_matches_recorded_activity() {
    let mut h = household();
    TransactionService::add(&mut h.account, Transaction::income(1000.0, h.salary, at(2024, 1, 5)))
        .unwrap();
    TransactionService::add(&mut h.account, Transaction::expense(400.0, h.rent, at(2024, 1, 20)))
        .unwrap();

    let stats = ReportService::generate_statistics(&h.account, day(2024, 1, 1), day(2024, 1, 31));
    assert_eq!(stats.total_income, 1000.0);
    assert_eq!(stats.total_expense, 400.0);
    assert_eq!(stats.balance, 600.0);
    assert_eq!(stats.transaction_count, 2);
    assert_eq!(stats.category_expenses.get("Rent"), Some(&400.0));

    let chart = ReportService::generate_chart_data(
        &h.account,
        ReportType::IncomeExpense,
        TimeDimension::Monthly,
        day(2024, 1, 1),
        day(2024, 1, 31),
    );
    assert_eq!(chart.values, vec![1000.0, 400.0]);
}

#[test]
fn expenses_walk_a_budget_through_its_statuses() {
    let mut h = household();
    let budget_id = h.account.budget_for(h.food).unwrap().id;

    let first =
        TransactionService::add(&mut h.account, Transaction::expense(85.0, h.food, at(2024, 1, 8)))
            .unwrap();
    let budget = h.account.budget(budget_id).unwrap();
    assert_eq!(budget.status(), BudgetStatus::Warning);
    assert!((budget.usage_percentage() - 0.85).abs() < 1e-9);

    TransactionService::add(&mut h.account, Transaction::expense(20.0, h.food, at(2024, 1, 9)))
        .unwrap();
    let budget = h.account.budget(budget_id).unwrap();
    assert_eq!(budget.status(), BudgetStatus::OverBudget);
    assert!((budget.usage_percentage() - 1.05).abs() < 1e-9);

    TransactionService::remove(&mut h.account, first).unwrap();
    let budget = h.account.budget(budget_id).unwrap();
    assert_eq!(budget.used_amount(), 20.0);
    assert_eq!(budget.status(), BudgetStatus::Active);
    assert_eq!(
        h.account.transaction(first).unwrap().status,
        TransactionStatus::Deleted
    );
    assert_eq!(h.account.transactions().len(), 2);
}

#[test]
fn editing_an_expense_moves_the_charge() {
    let mut h = household();
    let budget_id = h.account.budget_for(h.food).unwrap().id;
    let id =
        TransactionService::add(&mut h.account, Transaction::expense(30.0, h.food, at(2024, 1, 3)))
            .unwrap();

    TransactionService::update(&mut h.account, id, |txn| txn.amount = 45.0).unwrap();
    assert_eq!(h.account.budget(budget_id).unwrap().used_amount(), 45.0);

    TransactionService::update(&mut h.account, id, |txn| txn.category_id = h.rent).unwrap();
    assert_eq!(h.account.budget(budget_id).unwrap().used_amount(), 0.0);

    assert!(TransactionService::update(&mut h.account, id, |txn| txn.amount = -1.0).is_err());
    assert_eq!(h.account.transaction(id).unwrap().amount, 45.0);
}

#[test]
fn expenses_outside_the_window_do_not_count() {
    let mut h = household();
    TransactionService::add(&mut h.account, Transaction::expense(60.0, h.food, at(2024, 2, 12)))
        .unwrap();
    assert_eq!(h.account.budget_for(h.food).unwrap().used_amount(), 0.0);

    assert_eq!(BudgetService::roll_over(&mut h.account, day(2024, 2, 10)), 1);
    BudgetService::recalculate(&mut h.account);
    let budget = h.account.budget_for(h.food).unwrap();
    assert!(budget.is_active_on(day(2024, 2, 10)));
    assert_eq!(budget.used_amount(), 60.0);
}
