//! Read-only statistics and chart series computed from an [`Account`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{Account, TimeDimension, TransactionKind};

const INCOME_COLOR: &str = "#27AE60";
const EXPENSE_COLOR: &str = "#E74C3C";
const CURRENCY_UNIT: &str = "CNY";

/// Aggregated figures for a reporting window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticsData {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub avg_daily_expense: f64,
    pub category_expenses: BTreeMap<String, f64>,
    pub category_incomes: BTreeMap<String, f64>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportType {
    IncomeExpense,
    CategoryAnalysis,
    TrendAnalysis,
    BudgetPerformance,
}

/// Series handed to a chart renderer. `colors` may be shorter than `values`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub unit: String,
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
}

pub struct ReportService;

impl ReportService {
    pub fn generate_statistics(account: &Account, start: NaiveDate, end: NaiveDate) -> StatisticsData {
        let total_income = account.total_income(start, end);
        let total_expense = account.total_expense(start, end);
        StatisticsData {
            start,
            end,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            avg_daily_expense: Self::average_daily_expense(account, start, end),
            category_expenses: Self::category_expense_distribution(account, start, end),
            category_incomes: Self::category_income_distribution(account, start, end),
            transaction_count: account.transactions_in_range(start, end).len(),
        }
    }

    pub fn generate_chart_data(
        account: &Account,
        report_type: ReportType,
        dimension: TimeDimension,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ChartData {
        match report_type {
            ReportType::IncomeExpense => ChartData {
                title: "Income vs Expense".into(),
                unit: CURRENCY_UNIT.into(),
                values: vec![
                    account.total_income(start, end),
                    account.total_expense(start, end),
                ],
                labels: vec![
                    TransactionKind::Income.label().into(),
                    TransactionKind::Expense.label().into(),
                ],
                colors: vec![INCOME_COLOR.into(), EXPENSE_COLOR.into()],
            },
            ReportType::CategoryAnalysis => {
                let distribution = Self::category_expense_distribution(account, start, end);
                ChartData {
                    title: "Expenses by Category".into(),
                    unit: CURRENCY_UNIT.into(),
                    labels: distribution.keys().cloned().collect(),
                    values: distribution.into_values().collect(),
                    colors: Vec::new(),
                }
            }
            ReportType::TrendAnalysis => {
                let trend = Self::trend_by(account, TransactionKind::Expense, dimension, start, end);
                let format = dimension.label_format();
                ChartData {
                    title: "Expense Trend".into(),
                    unit: CURRENCY_UNIT.into(),
                    labels: trend
                        .keys()
                        .map(|date| date.format(format).to_string())
                        .collect(),
                    values: trend.into_values().collect(),
                    colors: vec![EXPENSE_COLOR.into()],
                }
            }
            ReportType::BudgetPerformance => {
                let usage = Self::budget_usage_report(account, end);
                ChartData {
                    title: "Budget Usage".into(),
                    unit: "%".into(),
                    labels: usage.keys().cloned().collect(),
                    values: usage.into_values().map(|ratio| ratio * 100.0).collect(),
                    colors: Vec::new(),
                }
            }
        }
    }

    pub fn expense_trend(account: &Account, start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, f64> {
        Self::trend_by(account, TransactionKind::Expense, TimeDimension::Daily, start, end)
    }

    pub fn income_trend(account: &Account, start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, f64> {
        Self::trend_by(account, TransactionKind::Income, TimeDimension::Daily, start, end)
    }

    /// Sums amounts of `kind` into buckets keyed by the first day of each bucket.
    pub fn trend_by(
        account: &Account,
        kind: TransactionKind,
        dimension: TimeDimension,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<NaiveDate, f64> {
        let mut trend = BTreeMap::new();
        for txn in account.transactions_in_range(start, end) {
            if txn.kind == kind {
                *trend.entry(dimension.bucket_start(txn.date())).or_insert(0.0) += txn.amount;
            }
        }
        trend
    }

    pub fn category_expense_distribution(
        account: &Account,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, f64> {
        Self::category_distribution(account, TransactionKind::Expense, start, end)
    }

    pub fn category_income_distribution(
        account: &Account,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, f64> {
        Self::category_distribution(account, TransactionKind::Income, start, end)
    }

    /// Usage ratio per category for every budget whose window contains `date`.
    ///
    /// Keys are category names. Budgets whose categories no longer exist all
    /// map to [`UNKNOWN_CATEGORY`](crate::ledger::UNKNOWN_CATEGORY), and the
    /// last such budget in account order wins. Budgets sharing a name collapse
    /// the same way.
    pub fn budget_usage_report(account: &Account, date: NaiveDate) -> BTreeMap<String, f64> {
        account
            .budgets()
            .iter()
            .filter(|budget| budget.is_active_on(date))
            .map(|budget| {
                (
                    account.category_name(budget.category_id),
                    budget.usage_percentage(),
                )
            })
            .collect()
    }

    pub fn average_daily_expense(account: &Account, start: NaiveDate, end: NaiveDate) -> f64 {
        let days = Self::days_in_period(start, end);
        if days <= 0 {
            return 0.0;
        }
        account.total_expense(start, end) / days as f64
    }

    pub fn days_in_period(start: NaiveDate, end: NaiveDate) -> i64 {
        (end - start).num_days() + 1
    }

    fn category_distribution(
        account: &Account,
        kind: TransactionKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, f64> {
        let mut distribution = BTreeMap::new();
        for txn in account.transactions_in_range(start, end) {
            if txn.kind == kind {
                *distribution
                    .entry(account.category_name(txn.category_id))
                    .or_insert(0.0) += txn.amount;
            }
        }
        distribution
    }
}
