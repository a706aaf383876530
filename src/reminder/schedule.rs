use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_CHECK_INTERVAL_SECS: i64 = 60;

/// Next due instants for the budget-check and periodic-report cadences.
///
/// `None` means the cadence is disarmed. The budget check is due as soon as the
/// schedule starts; a report only after one full interval. An interval that
/// would run past the last representable instant parks the cadence there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule {
    check_interval: Duration,
    report_interval: Duration,
    next_check: Option<DateTime<Utc>>,
    next_report: Option<DateTime<Utc>>,
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_CHECK_INTERVAL_SECS),
            Duration::days(super::settings::DEFAULT_REPORT_PERIOD_DAYS as i64),
        )
    }
}

impl ReminderSchedule {
    pub fn new(check_interval: Duration, report_interval: Duration) -> Self {
        Self {
            check_interval,
            report_interval,
            next_check: None,
            next_report: None,
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    pub fn next_check(&self) -> Option<DateTime<Utc>> {
        self.next_check
    }

    pub fn next_report(&self) -> Option<DateTime<Utc>> {
        self.next_report
    }

    pub fn is_running(&self) -> bool {
        self.next_check.is_some()
    }

    pub fn start(&mut self, now: DateTime<Utc>, report_enabled: bool) {
        self.next_check = Some(now);
        self.next_report = report_enabled.then(|| after(now, self.report_interval));
    }

    /// Disarms both cadences. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.next_check = None;
        self.next_report = None;
    }

    /// Returns `true` and re-arms when the budget check is due at `now`.
    pub fn take_due_check(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_check {
            Some(due) if due <= now => {
                self.next_check = Some(after(now, self.check_interval));
                true
            }
            _ => false,
        }
    }

    pub fn take_due_report(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_report {
            Some(due) if due <= now => {
                self.next_report = Some(after(now, self.report_interval));
                true
            }
            _ => false,
        }
    }

    /// Pushes the next budget check one interval past `now`, after an on-demand check.
    pub fn defer_check(&mut self, now: DateTime<Utc>) {
        if self.next_check.is_some() {
            self.next_check = Some(after(now, self.check_interval));
        }
    }

    pub fn set_check_interval(&mut self, interval: Duration, now: DateTime<Utc>) {
        self.check_interval = interval;
        self.defer_check(now);
    }

    /// Changing the interval restarts an armed report cadence from `now`.
    pub fn set_report_interval(&mut self, interval: Duration, now: DateTime<Utc>) {
        self.report_interval = interval;
        if self.next_report.is_some() {
            self.next_report = Some(after(now, interval));
        }
    }

    /// Arms the report cadence if the schedule is running and it is not armed yet.
    pub fn enable_report(&mut self, now: DateTime<Utc>) {
        if self.is_running() && self.next_report.is_none() {
            self.next_report = Some(after(now, self.report_interval));
        }
    }

    pub fn disable_report(&mut self) {
        self.next_report = None;
    }
}

fn after(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    now.checked_add_signed(interval)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
