use chrono::{Datelike, NaiveDateTime};

use crate::reminder::{DayCode, Frequency, Reminder, Schedule};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// The process-local wall clock. No timezone conversion is applied.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Whether `reminder` fires during the minute containing `now`.
pub fn is_due(reminder: &Reminder, now: NaiveDateTime) -> bool {
    if !reminder.time.matches(now.time()) {
        return false;
    }

    match &reminder.schedule {
        Schedule::OneTime { date } => *date == now.date(),
        Schedule::Recurring {
            frequency: Frequency::Everyday,
        } => true,
        Schedule::Recurring {
            frequency: Frequency::CustomDays { days },
        } => days.contains(&DayCode::from(now.weekday())),
    }
}
