
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::reminder::{OwnerId, Reminder};
use crate::storage::ReminderStorage;

use super::delivery::ReminderDeliveryChannel;
use super::due::is_due;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub owner: OwnerId,
    pub thread_id: Option<i32>,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub fired: Vec<FiredReminder>,
    pub failed: Vec<FiredReminder>,
}

/// Runs one evaluation pass over every stored reminder.
pub struct DueReminderEvaluator {
    storage: Arc<dyn ReminderStorage>,
    delivery_channel: Arc<dyn ReminderDeliveryChannel>,
}

impl DueReminderEvaluator {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        delivery_channel: Arc<dyn ReminderDeliveryChannel>,
    ) -> Self {
        Self {
            storage,
            delivery_channel,
        }
    }

    pub async fn run_tick(&self, now: NaiveDateTime) -> TickReport {
        log::debug!("Checking reminders at {}", now.format("%Y-%m-%d %H:%M"));

        let snapshot = self.storage.snapshot().await;
        let mut report = TickReport::default();

        for (owner, reminders) in snapshot {
            for reminder in reminders.into_iter().filter(|r| is_due(r, now)) {
                if reminder.schedule.is_one_time() && !self.take_one_time(owner, &reminder).await {
                    continue;
                }

                let fired = FiredReminder {
                    owner,
                    thread_id: reminder.thread_id,
                    message: reminder.message,
                };

                match self
                    .delivery_channel
                    .send_reminder(owner, fired.thread_id, &fired.message)
                    .await
                {
                    Ok(()) => {
                        log::info!("Sent reminder to {}: {}", owner, fired.message);
                        report.fired.push(fired);
                    }
                    Err(error) => {
                        log::error!("Error sending reminder to {}: {:#}", owner, error);
                        report.failed.push(fired);
                    }
                }
            }
        }

        if !report.fired.is_empty() || !report.failed.is_empty() {
            log::info!(
                "Tick at {} fired {} reminder(s), {} failed",
                now.format("%H:%M"),
                report.fired.len(),
                report.failed.len()
            );
        }

        report
    }

    /// Removes a due one-time reminder before it is delivered. Returns whether
    /// it should still be delivered.
    async fn take_one_time(&self, owner: OwnerId, reminder: &Reminder) -> bool {
        match self.storage.remove_fired(owner, reminder).await {
            Ok(true) => true,
            Ok(false) => {
                log::info!("One-time reminder of {owner} was deleted before it fired");
                false
            }
            Err(error) => {
                log::error!("Fired one-time reminder of {owner} is removed but not saved: {error}");
                true
            }
        }
    }
}
