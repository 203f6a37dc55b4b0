use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::reminder::{DayCode, Frequency, OwnerId, Reminder, ReminderFireTime, Schedule};
use crate::scheduling::{Clock, ReminderDeliveryChannel};

pub fn fire_time(hour: u32, minute: u32) -> ReminderFireTime {
    ReminderFireTime::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Clock stuck at one moment.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn everyday_reminder(message: &str, hour: u32, minute: u32) -> Reminder {
    Reminder {
        message: message.to_string(),
        schedule: Schedule::Recurring {
            frequency: Frequency::Everyday,
        },
        time: fire_time(hour, minute),
        thread_id: None,
    }
}

pub fn custom_days_reminder(message: &str, days: &[DayCode], hour: u32, minute: u32) -> Reminder {
    Reminder {
        message: message.to_string(),
        schedule: Schedule::Recurring {
            frequency: Frequency::CustomDays {
                days: days.to_vec(),
            },
        },
        time: fire_time(hour, minute),
        thread_id: None,
    }
}

pub fn one_time_reminder(
    message: &str,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Reminder {
    Reminder {
        message: message.to_string(),
        schedule: Schedule::OneTime {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        },
        time: fire_time(hour, minute),
        thread_id: None,
    }
}

pub type DeliveredMessages = Arc<Mutex<Vec<(OwnerId, Option<i32>, String)>>>;

/// Records every delivery attempt. Messages listed in `failing` are recorded
/// and then rejected.
#[derive(Clone, Default)]
pub struct RecordingDeliveryChannel {
    pub attempts: DeliveredMessages,
    failing: Arc<HashSet<String>>,
}

impl RecordingDeliveryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(messages: &[&str]) -> Self {
        Self {
            attempts: DeliveredMessages::default(),
            failing: Arc::new(messages.iter().map(|m| m.to_string()).collect()),
        }
    }

    pub fn attempted(&self) -> Vec<(OwnerId, String)> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(owner, _, message)| (*owner, message.clone()))
            .collect()
    }

    pub fn attempted_threads(&self) -> Vec<Option<i32>> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, thread_id, _)| *thread_id)
            .collect()
    }
}

#[async_trait]
impl ReminderDeliveryChannel for RecordingDeliveryChannel {
    async fn send_reminder(
        &self,
        owner: OwnerId,
        thread_id: Option<i32>,
        message: &str,
    ) -> anyhow::Result<()> {
        self.attempts
            .lock()
            .unwrap()
            .push((owner, thread_id, message.to_string()));

        if self.failing.contains(message) {
            anyhow::bail!("chat {owner} is unreachable");
        }
        Ok(())
    }
}
