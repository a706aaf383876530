//! Budget alerts, periodic reports and the reminder inbox.

pub mod engine;
pub mod model;
pub mod observer;
pub mod runtime;
pub mod schedule;
pub mod settings;

pub use engine::{ReminderEngine, TickOutcome};
pub use model::{Reminder, ReminderKind, ReminderPayload};
pub use observer::{ReminderEvent, ReminderObserver};
pub use runtime::{ReminderRuntime, RuntimeCommand, RuntimeHandle};
pub use schedule::ReminderSchedule;
pub use settings::ReminderSettings;
