//! Budget alert evaluation, periodic reports and the reminder inbox.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::core::{services::ReportService, Clock};
use crate::ledger::Account;

use super::{
    model::{Reminder, ReminderKind},
    observer::ReminderObserver,
    schedule::ReminderSchedule,
    settings::ReminderSettings,
};

/// What a single [`ReminderEngine::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub budget_checked: bool,
    pub report_emitted: bool,
    pub reminders_emitted: usize,
}

enum BudgetAlert {
    Warning { category_id: Uuid, used_percent: f64 },
    Over { category_id: Uuid, over_amount: f64 },
}

/// Evaluates budgets against the alert threshold and keeps the reminder inbox.
///
/// Everything runs on the caller's thread: the engine never spawns work and
/// only advances its cadences when [`ReminderEngine::tick`] is called.
pub struct ReminderEngine {
    settings: ReminderSettings,
    schedule: ReminderSchedule,
    reminders: Vec<Reminder>,
    observers: Vec<Box<dyn ReminderObserver>>,
    clock: Arc<dyn Clock>,
}

impl ReminderEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(ReminderSettings::default(), clock)
    }

    /// Builds an engine from `settings`; invalid fields keep their defaults.
    pub fn with_settings(settings: ReminderSettings, clock: Arc<dyn Clock>) -> Self {
        let mut engine = Self {
            settings: ReminderSettings::default(),
            schedule: ReminderSchedule::default(),
            reminders: Vec::new(),
            observers: Vec::new(),
            clock,
        };
        engine.apply_settings(settings);
        engine
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(config.reminders, clock).with_check_interval(config.budget_check_interval())
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        let now = self.clock.now();
        self.schedule.set_check_interval(interval, now);
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn ReminderObserver>) {
        self.observers.push(observer);
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    pub fn schedule(&self) -> &ReminderSchedule {
        &self.schedule
    }

    // Lifecycle

    pub fn start(&mut self) {
        let now = self.clock.now();
        self.schedule
            .start(now, self.settings.periodic_report_enabled);
        info!(
            check_interval_secs = self.schedule.check_interval().num_seconds(),
            report_enabled = self.settings.periodic_report_enabled,
            "reminder engine started"
        );
    }

    /// Halts both cadences. Calling it on a stopped engine does nothing.
    pub fn stop(&mut self) {
        if self.schedule.is_running() {
            info!("reminder engine stopped");
        }
        self.schedule.stop();
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }

    /// Runs whichever cadences are due at the clock's current instant.
    pub fn tick(&mut self, account: &mut Account) -> TickOutcome {
        let now = self.clock.now();
        let mut outcome = TickOutcome::default();
        if self.schedule.take_due_check(now) {
            outcome.budget_checked = true;
            outcome.reminders_emitted += self.evaluate_budgets(account);
        }
        if self.schedule.take_due_report(now) && self.emit_periodic_report(account).is_some() {
            outcome.report_emitted = true;
            outcome.reminders_emitted += 1;
        }
        outcome
    }

    // Configuration

    pub fn set_budget_alert_enabled(&mut self, enabled: bool) {
        self.settings.budget_alert_enabled = enabled;
    }

    pub fn set_budget_alert_threshold(&mut self, threshold: f64) -> bool {
        if !ReminderSettings::threshold_is_valid(threshold) {
            debug!(threshold, "ignoring alert threshold outside [0, 1]");
            return false;
        }
        self.settings.budget_alert_threshold = threshold;
        true
    }

    pub fn set_periodic_report_enabled(&mut self, enabled: bool) {
        self.settings.periodic_report_enabled = enabled;
        if enabled {
            let now = self.clock.now();
            self.schedule.enable_report(now);
        } else {
            self.schedule.disable_report();
        }
    }

    pub fn set_report_period(&mut self, days: i64) -> bool {
        let interval = match Duration::try_days(days) {
            Some(interval) if ReminderSettings::report_period_is_valid(days) => interval,
            _ => {
                debug!(days, "ignoring report period outside the accepted range");
                return false;
            }
        };
        self.settings.report_period_days = days as u32;
        let now = self.clock.now();
        self.schedule.set_report_interval(interval, now);
        true
    }

    /// Applies each field through its setter so invalid values are ignored.
    pub fn apply_settings(&mut self, settings: ReminderSettings) {
        self.set_budget_alert_enabled(settings.budget_alert_enabled);
        self.set_budget_alert_threshold(settings.budget_alert_threshold);
        self.set_report_period(settings.report_period_days as i64);
        self.set_periodic_report_enabled(settings.periodic_report_enabled);
    }

    // Evaluation

    /// Re-evaluates every budget active today and emits at most one reminder per
    /// budget. Returns the number of reminders emitted.
    ///
    /// Repeated calls re-emit for budgets that are still in warning or over budget.
    pub fn check_budget_status(&mut self, account: &mut Account) -> usize {
        let now = self.clock.now();
        self.schedule.defer_check(now);
        self.evaluate_budgets(account)
    }

    /// Event-driven entry point for callers that just changed transactions or budgets.
    pub fn notify_data_changed(&mut self, account: &mut Account) -> usize {
        self.check_budget_status(account)
    }

    /// Emits a report reminder covering the last `report_period_days` days.
    pub fn emit_periodic_report(&mut self, account: &Account) -> Option<Uuid> {
        if !self.settings.periodic_report_enabled {
            return None;
        }
        let now = self.clock.now();
        let end = now.date_naive();
        let start = Duration::try_days(self.settings.report_period_days as i64 - 1)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        let stats = ReportService::generate_statistics(account, start, end);
        let reminder = Reminder::periodic_report(
            start,
            end,
            stats.total_income,
            stats.total_expense,
            now,
        );
        Some(self.send_notification(reminder))
    }

    fn evaluate_budgets(&mut self, account: &mut Account) -> usize {
        if !self.settings.budget_alert_enabled {
            return 0;
        }
        let today = self.clock.today();
        let threshold = self.settings.budget_alert_threshold;
        let mut alerts = Vec::new();
        for budget in account.budgets_mut() {
            if !budget.is_active_on(today) {
                continue;
            }
            budget.check_and_update_status();
            if budget.is_in_warning() && budget.usage_percentage() >= threshold {
                alerts.push(BudgetAlert::Warning {
                    category_id: budget.category_id,
                    used_percent: budget.usage_percentage(),
                });
            } else if budget.is_over_budget() {
                alerts.push(BudgetAlert::Over {
                    category_id: budget.category_id,
                    over_amount: budget.used_amount() - budget.total_amount(),
                });
            }
        }

        let now = self.clock.now();
        let emitted = alerts.len();
        for alert in alerts {
            match alert {
                BudgetAlert::Warning {
                    category_id,
                    used_percent,
                } => {
                    let name = account.category_name(category_id);
                    for observer in self.observers.iter_mut() {
                        observer.on_budget_warning(&name, used_percent);
                    }
                    self.send_notification(Reminder::budget_warning(&name, used_percent, now));
                }
                BudgetAlert::Over {
                    category_id,
                    over_amount,
                } => {
                    let name = account.category_name(category_id);
                    for observer in self.observers.iter_mut() {
                        observer.on_budget_over(&name, over_amount);
                    }
                    self.send_notification(Reminder::budget_over(&name, over_amount, now));
                }
            }
        }
        if emitted > 0 {
            debug!(emitted, "budget reminders emitted");
        }
        emitted
    }

    fn send_notification(&mut self, reminder: Reminder) -> Uuid {
        let id = reminder.id;
        for observer in self.observers.iter_mut() {
            observer.on_reminder_triggered(&reminder);
        }
        self.reminders.push(reminder);
        self.publish_unread_count();
        id
    }

    // Inbox

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn unread_reminders(&self) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| !r.is_read).collect()
    }

    pub fn reminders_of_kind(&self, kind: ReminderKind) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| r.kind == kind).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.reminders.iter().filter(|r| !r.is_read).count()
    }

    pub fn mark_as_read(&mut self, id: Uuid) -> bool {
        let found = match self.reminders.iter_mut().find(|r| r.id == id) {
            Some(reminder) => {
                reminder.is_read = true;
                true
            }
            None => false,
        };
        self.publish_unread_count();
        found
    }

    pub fn mark_all_as_read(&mut self) {
        for reminder in self.reminders.iter_mut() {
            reminder.is_read = true;
        }
        self.publish_unread_count();
    }

    pub fn clear(&mut self, id: Uuid) -> bool {
        let before = self.reminders.len();
        self.reminders.retain(|r| r.id != id);
        self.publish_unread_count();
        self.reminders.len() != before
    }

    pub fn clear_all(&mut self) {
        self.reminders.clear();
        self.publish_unread_count();
    }

    fn publish_unread_count(&mut self) {
        let count = self.unread_count();
        for observer in self.observers.iter_mut() {
            observer.on_unread_count_changed(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::core::FixedClock;
    use crate::ledger::{Budget, BudgetPeriod, BudgetStatus, Category, Transaction};
    use crate::reminder::{ReminderEvent, ReminderPayload};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn noon() -> NaiveDateTime {
        today().and_hms_opt(12, 0, 0).unwrap()
    }

    struct Fixture {
        engine: ReminderEngine,
        account: Account,
        clock: FixedClock,
        events: UnboundedReceiver<ReminderEvent>,
        budget_id: Uuid,
    }

    fn fixture(used: f64) -> Fixture {
        let clock = FixedClock::at_date(today());
        let mut engine = ReminderEngine::new(Arc::new(clock.clone()));
        let (tx, events) = mpsc::unbounded_channel();
        engine.subscribe(Box::new(tx));

        let mut account = Account::new("Reminders");
        let food = Category::new("Food");
        let food_id = food.id;
        account.add_category(food);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut budget = Budget::new(food_id, 100.0, BudgetPeriod::Monthly, start);
        budget.add_expense(used);
        let budget_id = budget.id;
        account.add_budget(budget);
        Fixture {
            engine,
            account,
            clock,
            events,
            budget_id,
        }
    }

    fn drain(events: &mut UnboundedReceiver<ReminderEvent>) -> Vec<ReminderEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn usage_at_threshold_emits_one_warning_per_check() {
        let mut fx = fixture(80.0);
        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 1);
        assert_eq!(fx.engine.reminders_of_kind(ReminderKind::BudgetWarning).len(), 1);

        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 1);
        assert_eq!(fx.engine.reminders().len(), 2);
        assert_eq!(fx.engine.unread_count(), 2);
    }

    #[test]
    fn warning_events_arrive_in_order() {
        let mut fx = fixture(85.0);
        fx.engine.check_budget_status(&mut fx.account);
        let events = drain(&mut fx.events);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            ReminderEvent::BudgetWarning { category_name, .. } if category_name == "Food"
        ));
        assert!(matches!(&events[1], ReminderEvent::ReminderTriggered(r) if r.kind == ReminderKind::BudgetWarning));
        assert_eq!(events[2], ReminderEvent::UnreadCountChanged(1));
    }

    #[test]
    fn over_budget_reports_overage_for_deleted_category() {
        let mut fx = fixture(130.0);
        let category_id = fx.account.budget(fx.budget_id).unwrap().category_id;
        fx.account.remove_category(category_id);

        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 1);
        let reminder = &fx.engine.reminders()[0];
        assert_eq!(reminder.kind, ReminderKind::BudgetOver);
        assert_eq!(
            reminder.payload,
            ReminderPayload::BudgetOver {
                category_name: crate::ledger::UNKNOWN_CATEGORY.into(),
                over_amount: 30.0,
            }
        );
        let events = drain(&mut fx.events);
        assert!(matches!(
            &events[0],
            ReminderEvent::BudgetOver { over_amount, .. } if *over_amount == 30.0
        ));
    }

    #[test]
    fn higher_threshold_suppresses_warning_but_not_overage() {
        let mut fx = fixture(85.0);
        assert!(fx.engine.set_budget_alert_threshold(0.9));
        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 0);
        assert_eq!(fx.account.budget(fx.budget_id).unwrap().status(), BudgetStatus::Warning);

        fx.account.budget_mut(fx.budget_id).unwrap().add_expense(20.0);
        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 1);
        assert_eq!(fx.engine.reminders()[0].kind, ReminderKind::BudgetOver);
    }

    #[test]
    fn disabled_alerts_and_inactive_budgets_are_skipped() {
        let mut fx = fixture(95.0);
        fx.engine.set_budget_alert_enabled(false);
        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 0);

        fx.engine.set_budget_alert_enabled(true);
        fx.clock.advance(Duration::days(30));
        assert_eq!(fx.engine.check_budget_status(&mut fx.account), 0);
        assert!(fx.engine.reminders().is_empty());
    }

    #[test]
    fn invalid_settings_are_ignored() {
        let mut fx = fixture(0.0);
        assert!(!fx.engine.set_budget_alert_threshold(1.01));
        assert!(!fx.engine.set_report_period(0));
        assert!(!fx.engine.set_report_period(-7));
        assert_eq!(*fx.engine.settings(), ReminderSettings::default());
    }

    #[test]
    fn oversized_report_period_keeps_the_previous_one() {
        let mut fx = fixture(0.0);
        assert!(!fx.engine.set_report_period(200_000_000));
        assert!(!fx.engine.set_report_period(i64::MAX));
        assert_eq!(*fx.engine.settings(), ReminderSettings::default());

        let engine = ReminderEngine::with_settings(
            ReminderSettings {
                report_period_days: u32::MAX,
                ..ReminderSettings::default()
            },
            Arc::new(fx.clock.clone()),
        );
        assert_eq!(
            engine.settings().report_period_days,
            crate::reminder::settings::DEFAULT_REPORT_PERIOD_DAYS
        );
    }

    #[test]
    fn longest_report_period_runs_without_overflow() {
        let mut fx = fixture(0.0);
        let max = crate::reminder::settings::MAX_REPORT_PERIOD_DAYS;
        assert!(fx.engine.set_report_period(max as i64));
        fx.engine.start();
        assert_eq!(
            fx.engine.schedule().next_report(),
            Some(fx.clock.now() + Duration::days(max as i64))
        );

        let id = fx.engine.emit_periodic_report(&fx.account).expect("reports enabled");
        let reminder = fx.engine.reminders().iter().find(|r| r.id == id).unwrap();
        match &reminder.payload {
            ReminderPayload::PeriodicReport { start, end, .. } => {
                assert_eq!(*end, today());
                assert_eq!(*end - *start, Duration::days(max as i64 - 1));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn inbox_mutations_publish_consistent_unread_counts() {
        let mut fx = fixture(90.0);
        fx.engine.check_budget_status(&mut fx.account);
        fx.engine.check_budget_status(&mut fx.account);
        fx.engine.check_budget_status(&mut fx.account);
        drain(&mut fx.events);

        let first = fx.engine.reminders()[0].id;
        let second = fx.engine.reminders()[1].id;
        assert!(fx.engine.mark_as_read(first));
        assert_eq!(fx.engine.unread_count(), 2);
        assert!(fx.engine.clear(second));
        assert_eq!(fx.engine.unread_count(), 1);
        assert!(!fx.engine.clear(second));
        fx.engine.mark_all_as_read();
        assert_eq!(fx.engine.unread_count(), 0);
        fx.engine.clear_all();
        assert!(fx.engine.reminders().is_empty());

        let counts: Vec<usize> = drain(&mut fx.events)
            .into_iter()
            .filter_map(|event| match event {
                ReminderEvent::UnreadCountChanged(count) => Some(count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![2, 1, 1, 0, 0]);
    }

    #[test]
    fn tick_follows_cadences_and_stops_cleanly() {
        let mut fx = fixture(90.0);
        assert!(fx.engine.set_report_period(7));
        fx.engine.start();
        assert!(fx.engine.is_running());

        let first = fx.engine.tick(&mut fx.account);
        assert!(first.budget_checked);
        assert_eq!(first.reminders_emitted, 1);

        fx.clock.advance(Duration::seconds(30));
        assert_eq!(fx.engine.tick(&mut fx.account), TickOutcome::default());

        fx.clock.advance(Duration::seconds(30));
        assert!(fx.engine.tick(&mut fx.account).budget_checked);

        fx.clock.advance(Duration::days(7));
        let weekly = fx.engine.tick(&mut fx.account);
        assert!(weekly.report_emitted);
        assert_eq!(fx.engine.reminders_of_kind(ReminderKind::PeriodicReport).len(), 1);

        fx.engine.stop();
        fx.engine.stop();
        fx.clock.advance(Duration::days(30));
        assert_eq!(fx.engine.tick(&mut fx.account), TickOutcome::default());
    }

    #[test]
    fn on_demand_check_defers_the_cadence() {
        let mut fx = fixture(90.0);
        fx.engine.start();
        assert_eq!(fx.engine.notify_data_changed(&mut fx.account), 1);
        assert!(!fx.engine.tick(&mut fx.account).budget_checked);
    }

    #[test]
    fn periodic_report_summarises_recent_activity() {
        let mut fx = fixture(0.0);
        let salary = Category::income("Salary");
        let salary_id = salary.id;
        fx.account.add_category(salary);
        fx.account
            .add_transaction(Transaction::income(2000.0, salary_id, noon()));
        let food_id = fx.account.budget(fx.budget_id).unwrap().category_id;
        fx.account
            .add_transaction(Transaction::expense(150.0, food_id, noon()));

        let id = fx.engine.emit_periodic_report(&fx.account).expect("reports enabled");
        let reminder = fx.engine.reminders().iter().find(|r| r.id == id).unwrap();
        match &reminder.payload {
            ReminderPayload::PeriodicReport {
                start,
                end,
                balance,
                ..
            } => {
                assert_eq!(*end, today());
                assert_eq!(*start, NaiveDate::from_ymd_opt(2023, 12, 17).unwrap());
                assert_eq!(*balance, 1850.0);
            }
            other => panic!("unexpected payload {other:?}"),
        }

        fx.engine.set_periodic_report_enabled(false);
        assert!(fx.engine.emit_periodic_report(&fx.account).is_none());
    }
}
