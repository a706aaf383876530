use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of a budgeting cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Weekly,
    Yearly,
}

impl BudgetPeriod {
    /// Returns the window of the cycle that starts on `start`.
    ///
    /// Weekly cycles span seven days, monthly cycles end on the last day of the
    /// start month and yearly cycles end on December 31st.
    pub fn window_from(&self, start: NaiveDate) -> DateWindow {
        let end = match self {
            BudgetPeriod::Weekly => start + Duration::days(6),
            BudgetPeriod::Monthly => last_day_of_month(start),
            BudgetPeriod::Yearly => {
                NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start)
            }
        };
        DateWindow { start, end }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive date range used for budget cycles and report queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered; zero or negative for inverted windows.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Granularity used when bucketing report series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeDimension {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl TimeDimension {
    /// Maps a date onto the first day of the bucket that contains it.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeDimension::Daily => date,
            TimeDimension::Weekly => {
                let delta = date.weekday().num_days_from_monday() as i64;
                date - Duration::days(delta)
            }
            TimeDimension::Monthly => date.with_day(1).unwrap_or(date),
            TimeDimension::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    pub fn label_format(&self) -> &'static str {
        match self {
            TimeDimension::Daily | TimeDimension::Weekly => "%m-%d",
            TimeDimension::Monthly => "%Y-%m",
            TimeDimension::Yearly => "%Y",
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => (first_next - Duration::days(1)).day(),
        None => 28,
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let day = days_in_month(date.year(), date.month());
    date.with_day(day).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_window_spans_seven_days() {
        let window = BudgetPeriod::Weekly.window_from(date(2024, 3, 29));
        assert_eq!(window.end, date(2024, 4, 4));
        assert_eq!(window.days(), 7);
    }

    #[test]
    fn monthly_window_handles_leap_february() {
        let window = BudgetPeriod::Monthly.window_from(date(2024, 2, 10));
        assert_eq!(window.end, date(2024, 2, 29));
        let window = BudgetPeriod::Monthly.window_from(date(2023, 12, 31));
        assert_eq!(window.end, date(2023, 12, 31));
    }

    #[test]
    fn yearly_window_ends_on_new_years_eve() {
        let window = BudgetPeriod::Yearly.window_from(date(2025, 6, 1));
        assert_eq!(window.end, date(2025, 12, 31));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31));
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2024, 2, 1)));
    }

    #[test]
    fn bucket_start_aligns_to_dimension() {
        let wednesday = date(2024, 5, 15);
        assert_eq!(TimeDimension::Daily.bucket_start(wednesday), wednesday);
        assert_eq!(TimeDimension::Weekly.bucket_start(wednesday), date(2024, 5, 13));
        assert_eq!(TimeDimension::Monthly.bucket_start(wednesday), date(2024, 5, 1));
        assert_eq!(TimeDimension::Yearly.bucket_start(wednesday), date(2024, 1, 1));
    }
}
