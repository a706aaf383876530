use serde::{Deserialize, Serialize};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;
pub const DEFAULT_REPORT_PERIOD_DAYS: u32 = 30;
/// Longest accepted report period, ten years of days.
pub const MAX_REPORT_PERIOD_DAYS: u32 = 3650;

/// User preferences consumed by the reminder engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReminderSettings {
    #[serde(default = "ReminderSettings::default_enabled")]
    pub budget_alert_enabled: bool,
    #[serde(default = "ReminderSettings::default_threshold")]
    pub budget_alert_threshold: f64,
    #[serde(default = "ReminderSettings::default_enabled")]
    pub periodic_report_enabled: bool,
    #[serde(default = "ReminderSettings::default_report_period")]
    pub report_period_days: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            budget_alert_enabled: true,
            budget_alert_threshold: DEFAULT_ALERT_THRESHOLD,
            periodic_report_enabled: true,
            report_period_days: DEFAULT_REPORT_PERIOD_DAYS,
        }
    }
}

impl ReminderSettings {
    fn default_enabled() -> bool {
        true
    }

    fn default_threshold() -> f64 {
        DEFAULT_ALERT_THRESHOLD
    }

    fn default_report_period() -> u32 {
        DEFAULT_REPORT_PERIOD_DAYS
    }

    pub fn threshold_is_valid(threshold: f64) -> bool {
        (0.0..=1.0).contains(&threshold)
    }

    pub fn report_period_is_valid(days: i64) -> bool {
        days > 0 && days <= MAX_REPORT_PERIOD_DAYS as i64
    }

    /// Describes the first invalid field, if any.
    pub fn validation_error(&self) -> Option<String> {
        if !Self::threshold_is_valid(self.budget_alert_threshold) {
            return Some(format!(
                "budget alert threshold must be within [0, 1], got {}",
                self.budget_alert_threshold
            ));
        }
        if !Self::report_period_is_valid(self.report_period_days as i64) {
            return Some(format!(
                "report period must be between 1 and {MAX_REPORT_PERIOD_DAYS} days, got {}",
                self.report_period_days
            ));
        }
        None
    }
}
