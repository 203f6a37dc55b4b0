pub mod parse;

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identity under which reminders are grouped. It is the chat the reminder was
/// created in, so it doubles as the delivery target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter weekday code as typed by users and stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCode {
    #[serde(rename = "Mo")]
    Monday,
    #[serde(rename = "Tu")]
    Tuesday,
    #[serde(rename = "We")]
    Wednesday,
    #[serde(rename = "Th")]
    Thursday,
    #[serde(rename = "Fr")]
    Friday,
    #[serde(rename = "Sa")]
    Saturday,
    #[serde(rename = "Su")]
    Sunday,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::Monday,
        DayCode::Tuesday,
        DayCode::Wednesday,
        DayCode::Thursday,
        DayCode::Friday,
        DayCode::Saturday,
        DayCode::Sunday,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DayCode::Monday => "Mo",
            DayCode::Tuesday => "Tu",
            DayCode::Wednesday => "We",
            DayCode::Thursday => "Th",
            DayCode::Friday => "Fr",
            DayCode::Saturday => "Sa",
            DayCode::Sunday => "Su",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            DayCode::Monday => "Monday",
            DayCode::Tuesday => "Tuesday",
            DayCode::Wednesday => "Wednesday",
            DayCode::Thursday => "Thursday",
            DayCode::Friday => "Friday",
            DayCode::Saturday => "Saturday",
            DayCode::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayCode {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayCode::Monday,
            Weekday::Tue => DayCode::Tuesday,
            Weekday::Wed => DayCode::Wednesday,
            Weekday::Thu => DayCode::Thursday,
            Weekday::Fri => DayCode::Friday,
            Weekday::Sat => DayCode::Saturday,
            Weekday::Sun => DayCode::Sunday,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day code \"{0}\", expected one of Mo, Tu, We, Th, Fr, Sa, Su")]
pub struct UnknownDayCode(pub String);

impl FromStr for DayCode {
    type Err = UnknownDayCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayCode::ALL
            .into_iter()
            .find(|day| day.code() == s)
            .ok_or_else(|| UnknownDayCode(s.to_string()))
    }
}

/// Minute-resolution time of day at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReminderFireTime(NaiveTime);

impl ReminderFireTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .unwrap_or(inner);
        Self(normalized_time)
    }

    /// True when `other` falls within the same minute as this fire time.
    pub fn matches(&self, other: NaiveTime) -> bool {
        self.0.hour() == other.hour() && self.0.minute() == other.minute()
    }
}

impl fmt::Display for ReminderFireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ReminderFireTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderFireTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse::parse_time(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Frequency {
    Everyday,
    #[serde(rename = "custom")]
    CustomDays {
        #[serde(deserialize_with = "non_empty_days")]
        days: Vec<DayCode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    OneTime {
        date: NaiveDate,
    },
    #[serde(rename = "daily")]
    Recurring {
        #[serde(flatten)]
        frequency: Frequency,
    },
}

impl Schedule {
    pub fn is_one_time(&self) -> bool {
        matches!(self, Schedule::OneTime { .. })
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::OneTime { date } => write!(f, "on {}", date.format("%Y-%m-%d")),
            Schedule::Recurring {
                frequency: Frequency::Everyday,
            } => write!(f, "every day"),
            Schedule::Recurring {
                frequency: Frequency::CustomDays { days },
            } => {
                let names = days
                    .iter()
                    .map(|day| day.full_name())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "every {names}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub time: ReminderFireTime,
    /// Forum topic the reminder was created in. Delivery goes back to it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "message_thread_id"
    )]
    pub thread_id: Option<i32>,
}

impl Reminder {
    /// Human readable schedule phrase, e.g. `every Monday, Friday`.
    pub fn describe(&self) -> String {
        self.schedule.to_string()
    }
}

fn non_empty_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DayCode>, D::Error> {
    let days = Vec::<DayCode>::deserialize(deserializer)?;
    if days.is_empty() {
        return Err(serde::de::Error::custom("custom schedule needs at least one day"));
    }
    Ok(days)
}
