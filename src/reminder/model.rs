use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReminderKind {
    BudgetWarning,
    BudgetOver,
    PeriodicReport,
    BillReminder,
}

/// Structured data attached to a reminder for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum ReminderPayload {
    #[default]
    None,
    BudgetWarning {
        category_name: String,
        used_percent: f64,
    },
    BudgetOver {
        category_name: String,
        over_amount: f64,
    },
    PeriodicReport {
        start: NaiveDate,
        end: NaiveDate,
        total_income: f64,
        total_expense: f64,
        balance: f64,
    },
}

/// An inbox entry produced by the reminder engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub id: Uuid,
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default)]
    pub payload: ReminderPayload,
}

impl Reminder {
    pub fn new(
        kind: ReminderKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp,
            is_read: false,
            payload,
        }
    }

    pub fn budget_warning(category_name: &str, used_percent: f64, at: DateTime<Utc>) -> Self {
        Self::new(
            ReminderKind::BudgetWarning,
            "Budget Warning",
            format!(
                "{} budget is {:.1}% used, keep an eye on spending.",
                category_name,
                used_percent * 100.0
            ),
            at,
            ReminderPayload::BudgetWarning {
                category_name: category_name.to_string(),
                used_percent,
            },
        )
    }

    pub fn budget_over(category_name: &str, over_amount: f64, at: DateTime<Utc>) -> Self {
        Self::new(
            ReminderKind::BudgetOver,
            "Budget Exceeded",
            format!(
                "{} budget is over by {:.2}, adjust your spending plan.",
                category_name, over_amount
            ),
            at,
            ReminderPayload::BudgetOver {
                category_name: category_name.to_string(),
                over_amount,
            },
        )
    }

    pub fn periodic_report(
        start: NaiveDate,
        end: NaiveDate,
        total_income: f64,
        total_expense: f64,
        at: DateTime<Utc>,
    ) -> Self {
        let balance = total_income - total_expense;
        Self::new(
            ReminderKind::PeriodicReport,
            "Periodic Report",
            format!(
                "Your report for {} to {} is ready: income {:.2}, expense {:.2}, balance {:.2}.",
                start, end, total_income, total_expense, balance
            ),
            at,
            ReminderPayload::PeriodicReport {
                start,
                end,
                total_income,
                total_expense,
                balance,
            },
        )
    }
}
