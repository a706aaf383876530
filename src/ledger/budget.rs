use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::period::{BudgetPeriod, DateWindow};

pub const DEFAULT_ALERT_PERCENT: f64 = 0.8;

/// A spending cap for one category over one period.
///
/// `status` is derived from [`Budget::usage_percentage`] and recomputed after every
/// change to the amounts or the alert threshold. Deserialising goes through
/// [`BudgetRecord`], so stored amounts and status are normalised on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "BudgetRecord")]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    total_amount: f64,
    used_amount: f64,
    alert_percent: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    status: BudgetStatus,
}

impl Budget {
    /// Creates a budget whose first cycle starts on `start_date`.
    pub fn new(
        category_id: Uuid,
        total_amount: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        let window = period.window_from(start_date);
        Self {
            id: Uuid::new_v4(),
            category_id,
            total_amount: total_amount.max(0.0),
            used_amount: 0.0,
            alert_percent: DEFAULT_ALERT_PERCENT,
            period,
            start_date: window.start,
            end_date: window.end,
            status: BudgetStatus::Created,
        }
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn used_amount(&self) -> f64 {
        self.used_amount
    }

    pub fn alert_percent(&self) -> f64 {
        self.alert_percent
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    pub fn remaining(&self) -> f64 {
        self.total_amount - self.used_amount
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    pub fn is_in_warning(&self) -> bool {
        self.status == BudgetStatus::Warning
    }

    pub fn is_over_budget(&self) -> bool {
        self.status == BudgetStatus::OverBudget
    }

    /// Fraction of the cap already spent; `0.0` when the cap is not positive.
    pub fn usage_percentage(&self) -> f64 {
        if self.total_amount <= 0.0 {
            return 0.0;
        }
        self.used_amount / self.total_amount
    }

    pub fn set_total_amount(&mut self, amount: f64) -> bool {
        if !(amount >= 0.0) {
            debug!(budget = %self.id, amount, "ignoring negative budget total");
            return false;
        }
        self.total_amount = amount;
        self.check_and_update_status();
        true
    }

    pub fn set_alert_percent(&mut self, percent: f64) -> bool {
        if !(0.0..=1.0).contains(&percent) {
            debug!(budget = %self.id, percent, "ignoring alert percent outside [0, 1]");
            return false;
        }
        self.alert_percent = percent;
        self.check_and_update_status();
        true
    }

    /// Overwrites the spent amount, e.g. after recomputing it from the ledger.
    pub fn set_used_amount(&mut self, amount: f64) -> bool {
        if !(amount >= 0.0) {
            return false;
        }
        self.used_amount = amount;
        self.check_and_update_status();
        true
    }

    pub fn add_expense(&mut self, amount: f64) -> bool {
        if !(amount > 0.0) {
            return false;
        }
        self.used_amount += amount;
        self.check_and_update_status();
        true
    }

    pub fn remove_expense(&mut self, amount: f64) -> bool {
        if !(amount > 0.0) || self.used_amount < amount {
            return false;
        }
        self.used_amount -= amount;
        self.check_and_update_status();
        true
    }

    /// Starts a fresh cycle on `today`, clearing the spent amount.
    pub fn reset_for_new_period(&mut self, today: NaiveDate) {
        let window = self.period.window_from(today);
        self.used_amount = 0.0;
        self.status = BudgetStatus::Active;
        self.start_date = window.start;
        self.end_date = window.end;
    }

    pub fn check_and_update_status(&mut self) -> BudgetStatus {
        self.status = BudgetStatus::for_usage(self.usage_percentage(), self.alert_percent);
        self.status
    }
}

/// On-disk shape of a [`Budget`], before its invariants are restored.
#[derive(Debug, Deserialize)]
struct BudgetRecord {
    id: Uuid,
    category_id: Uuid,
    total_amount: f64,
    used_amount: f64,
    #[serde(default = "default_alert_percent")]
    alert_percent: f64,
    period: BudgetPeriod,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    status: BudgetStatus,
}

fn default_alert_percent() -> f64 {
    DEFAULT_ALERT_PERCENT
}

impl From<BudgetRecord> for Budget {
    fn from(record: BudgetRecord) -> Self {
        let alert_percent = if (0.0..=1.0).contains(&record.alert_percent) {
            record.alert_percent
        } else {
            DEFAULT_ALERT_PERCENT
        };
        let mut budget = Budget {
            id: record.id,
            category_id: record.category_id,
            total_amount: record.total_amount.max(0.0),
            used_amount: record.used_amount.max(0.0),
            alert_percent,
            period: record.period,
            start_date: record.start_date,
            end_date: record.end_date,
            status: BudgetStatus::Created,
        };
        // A freshly reset cycle is Active with nothing spent.
        budget.status = match (record.status, budget.check_and_update_status()) {
            (BudgetStatus::Active, BudgetStatus::Created) => BudgetStatus::Active,
            (_, derived) => derived,
        };
        budget
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BudgetStatus {
    #[default]
    Created,
    Active,
    Warning,
    OverBudget,
}

impl BudgetStatus {
    pub fn for_usage(usage: f64, alert_percent: f64) -> Self {
        if usage >= 1.0 {
            BudgetStatus::OverBudget
        } else if usage >= alert_percent {
            BudgetStatus::Warning
        } else if usage > 0.0 {
            BudgetStatus::Active
        } else {
            BudgetStatus::Created
        }
    }
}
