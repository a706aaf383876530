use tokio::sync::mpsc::UnboundedSender;

use super::model::Reminder;

/// Receives reminder engine events. Every method defaults to a no-op.
pub trait ReminderObserver: Send {
    fn on_reminder_triggered(&mut self, _reminder: &Reminder) {}

    fn on_budget_warning(&mut self, _category_name: &str, _used_percent: f64) {}

    fn on_budget_over(&mut self, _category_name: &str, _over_amount: f64) {}

    fn on_unread_count_changed(&mut self, _count: usize) {}
}

/// Owned copy of an observer callback, for consumers that prefer a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEvent {
    ReminderTriggered(Reminder),
    BudgetWarning {
        category_name: String,
        used_percent: f64,
    },
    BudgetOver {
        category_name: String,
        over_amount: f64,
    },
    UnreadCountChanged(usize),
}

// A closed receiver just means nobody is listening anymore.
impl ReminderObserver for UnboundedSender<ReminderEvent> {
    fn on_reminder_triggered(&mut self, reminder: &Reminder) {
        let _ = self.send(ReminderEvent::ReminderTriggered(reminder.clone()));
    }

    fn on_budget_warning(&mut self, category_name: &str, used_percent: f64) {
        let _ = self.send(ReminderEvent::BudgetWarning {
            category_name: category_name.to_string(),
            used_percent,
        });
    }

    fn on_budget_over(&mut self, category_name: &str, over_amount: f64) {
        let _ = self.send(ReminderEvent::BudgetOver {
            category_name: category_name.to_string(),
            over_amount,
        });
    }

    fn on_unread_count_changed(&mut self, count: usize) {
        let _ = self.send(ReminderEvent::UnreadCountChanged(count));
    }
}
