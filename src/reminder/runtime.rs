//! Single-task driver that owns the engine and the account it watches.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::Clock;
use crate::errors::{LedgerError, Result};
use crate::ledger::Account;

use super::{
    engine::ReminderEngine, observer::ReminderObserver, settings::ReminderSettings,
};

pub const DEFAULT_TICK_RESOLUTION: Duration = Duration::from_millis(1000);

type AccountUpdate = Box<dyn FnOnce(&mut Account) + Send>;

pub enum RuntimeCommand {
    /// Mutates the account, then re-checks budgets before the next command runs.
    Update(AccountUpdate),
    CheckNow,
    Configure(ReminderSettings),
    MarkAllRead,
    Stop,
}

impl std::fmt::Debug for RuntimeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeCommand::Update(_) => f.write_str("Update(..)"),
            RuntimeCommand::CheckNow => f.write_str("CheckNow"),
            RuntimeCommand::Configure(settings) => f.debug_tuple("Configure").field(settings).finish(),
            RuntimeCommand::MarkAllRead => f.write_str("MarkAllRead"),
            RuntimeCommand::Stop => f.write_str("Stop"),
        }
    }
}

/// Cloneable sender side used by the host to talk to a running [`ReminderRuntime`].
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<RuntimeCommand>,
}

impl RuntimeHandle {
    pub async fn update<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut Account) + Send + 'static,
    {
        self.send(RuntimeCommand::Update(Box::new(update))).await
    }

    pub async fn check_now(&self) -> Result<()> {
        self.send(RuntimeCommand::CheckNow).await
    }

    pub async fn configure(&self, settings: ReminderSettings) -> Result<()> {
        self.send(RuntimeCommand::Configure(settings)).await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.send(RuntimeCommand::MarkAllRead).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(RuntimeCommand::Stop).await
    }

    async fn send(&self, command: RuntimeCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| LedgerError::RuntimeStopped)
    }
}

/// Polls the engine cadences on a fixed resolution and applies host commands
/// in arrival order. All work happens on the one task running [`ReminderRuntime::run`].
pub struct ReminderRuntime {
    engine: ReminderEngine,
    account: Account,
    resolution: Duration,
}

impl ReminderRuntime {
    pub fn new(engine: ReminderEngine, account: Account) -> Self {
        Self {
            engine,
            account,
            resolution: DEFAULT_TICK_RESOLUTION,
        }
    }

    /// Engine settings, check interval and tick resolution all come from `config`.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>, account: Account) -> Self {
        Self::new(ReminderEngine::from_config(config, clock), account)
            .with_resolution(config.tick_resolution())
    }

    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    pub fn subscribe(&mut self, observer: Box<dyn ReminderObserver>) {
        self.engine.subscribe(observer);
    }

    /// A zero resolution falls back to the default.
    pub fn with_resolution(mut self, resolution: Duration) -> Self {
        if !resolution.is_zero() {
            self.resolution = resolution;
        }
        self
    }

    pub fn channel(buffer: usize) -> (RuntimeHandle, mpsc::Receiver<RuntimeCommand>) {
        let (commands, receiver) = mpsc::channel(buffer.max(1));
        (RuntimeHandle { commands }, receiver)
    }

    /// Runs until a `Stop` command arrives or every handle is dropped, then
    /// hands the engine and account back to the caller.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<RuntimeCommand>,
    ) -> (ReminderEngine, Account) {
        self.engine.start();
        let mut ticker = time::interval(self.resolution);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.engine.tick(&mut self.account);
                    if outcome.reminders_emitted > 0 {
                        debug!(emitted = outcome.reminders_emitted, "tick emitted reminders");
                    }
                }
                command = commands.recv() => match command {
                    Some(RuntimeCommand::Update(update)) => {
                        update(&mut self.account);
                        self.engine.notify_data_changed(&mut self.account);
                    }
                    Some(RuntimeCommand::CheckNow) => {
                        self.engine.check_budget_status(&mut self.account);
                    }
                    Some(RuntimeCommand::Configure(settings)) => {
                        self.engine.apply_settings(settings);
                    }
                    Some(RuntimeCommand::MarkAllRead) => self.engine.mark_all_as_read(),
                    Some(RuntimeCommand::Stop) | None => break,
                },
            }
        }

        self.engine.stop();
        info!(unread = self.engine.unread_count(), "reminder runtime finished");
        (self.engine, self.account)
    }
}
