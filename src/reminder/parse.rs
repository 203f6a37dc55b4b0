use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use super::{DayCode, ReminderFireTime};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Reminder text must not be empty. Please send me what to remind you about.")]
    EmptyMessage,

    #[error("Invalid date \"{0}\". Please use YYYY-MM-DD format (e.g. 2025-03-15).")]
    InvalidDate(String),

    #[error("{0} is already in the past. Please enter today's date or a later one in YYYY-MM-DD format.")]
    DateInPast(NaiveDate),

    #[error("Invalid time \"{0}\". Please use HH:MM format (e.g. 11:50).")]
    InvalidTime(String),

    #[error("{0} has already passed today. Please enter a later time in HH:MM format.")]
    TimeInPast(ReminderFireTime),

    #[error("Invalid day(s): {}. Please use: Mo, Tu, We, Th, Fr, Sa, Su", .0.join(", "))]
    InvalidDays(Vec<String>),
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate(text.to_string());

    if !has_shape(text, &[4, 2, 2], b'-') {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())
}

/// Parses a strict 24-hour `HH:MM` time. Leading zeros are required.
pub fn parse_time(text: &str) -> Result<ReminderFireTime, ValidationError> {
    let invalid = || ValidationError::InvalidTime(text.to_string());

    if !has_shape(text, &[2, 2], b':') {
        return Err(invalid());
    }

    NaiveTime::parse_from_str(text, "%H:%M")
        .map(ReminderFireTime::new)
        .map_err(|_| invalid())
}

/// Parses a comma separated list of day codes, e.g. `Mo, Tu,Fr`.
///
/// Order and duplicates are kept. On failure every rejected token is returned
/// so it can be echoed back to the user.
pub fn parse_days(text: &str) -> Result<Vec<DayCode>, ValidationError> {
    let mut days = Vec::new();
    let mut invalid = Vec::new();

    for token in text.split(',').map(str::trim) {
        match token.parse::<DayCode>() {
            Ok(day) => days.push(day),
            Err(_) => invalid.push(token.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ValidationError::InvalidDays(invalid));
    }

    Ok(days)
}

pub fn parse_message(text: &str) -> Result<String, ValidationError> {
    let message = text.trim();
    if message.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    Ok(message.to_string())
}

fn has_shape(text: &str, groups: &[usize], separator: u8) -> bool {
    let mut parts = text.as_bytes().split(|byte| *byte == separator);
    let shape_matches = groups.iter().all(|len| {
        parts
            .next()
            .is_some_and(|part| part.len() == *len && part.iter().all(u8::is_ascii_digit))
    });

    shape_matches && parts.next().is_none()
}
