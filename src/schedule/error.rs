//! Schedule error types
//!
//! Errors raised while parsing or validating medication schedules.

use thiserror::Error;

/// Errors that can occur while building or reading a schedule
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Time-of-day string could not be parsed
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    /// Date string could not be parsed (expected YYYY-MM-DD)
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Frequency label is not one of the known labels
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    /// Weekday name is not one of mon..sun
    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    /// Calendar view name is not day, week or month
    #[error("Unknown calendar view: {0}")]
    UnknownView(String),

    /// A medication form failed validation
    #[error("{0}")]
    Validation(String),
}

/// Result type alias for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScheduleError::InvalidTime("25:00".to_string());
        assert_eq!(err.to_string(), "Invalid time of day: 25:00");

        let err = ScheduleError::Validation("Name is required".to_string());
        assert_eq!(err.to_string(), "Name is required");
    }
}
