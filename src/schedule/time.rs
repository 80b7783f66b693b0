//! Time-of-day parsing and formatting
//!
//! Dose times arrive either as 24-hour `HH:MM` strings (form inputs, FHIR
//! `timeOfDay`) or as 12-hour `h:mm AM/PM` strings typed by people. Both are
//! normalised into [`DoseTime`], which always serializes as `HH:MM`.

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::OnceLock;

use super::error::{ScheduleError, ScheduleResult};

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(?:([AaPp])\.?[Mm]\.?)?$")
            .expect("time-of-day pattern is valid")
    })
}

/// A time of day at minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoseTime {
    hour: u8,
    minute: u8,
}

impl DoseTime {
    /// Create a time from 24-hour components
    pub fn new(hour: u32, minute: u32) -> ScheduleResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime(format!("{}:{:02}", hour, minute)));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Parse `08:00`, `8:00`, `8:00 AM`, `8pm`, `12:30 a.m.` and similar
    pub fn parse(input: &str) -> ScheduleResult<Self> {
        let trimmed = input.trim();
        let invalid = || ScheduleError::InvalidTime(input.to_string());

        let caps = time_pattern().captures(trimmed).ok_or_else(invalid)?;

        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid());
                }
                let hour = match (meridiem.as_str(), hour) {
                    ("a", 12) => 0,
                    ("a", h) => h,
                    (_, 12) => 12,
                    (_, h) => h + 12,
                };
                Self::new(hour, minute).map_err(|_| invalid())
            }
            None => {
                // Bare hours are ambiguous without a meridiem
                if caps.get(2).is_none() {
                    return Err(invalid());
                }
                Self::new(hour, minute).map_err(|_| invalid())
            }
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// 24-hour `HH:MM` rendering used for storage and check-off keys
    pub fn to_24h(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Convert to a chrono time for date arithmetic
    pub fn as_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl std::fmt::Display for DoseTime {
    /// 12-hour rendering: `8:00 AM`, `12:30 PM`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{}:{:02} {}", hour12, self.minute, meridiem)
    }
}

impl FromStr for DoseTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveTime> for DoseTime {
    fn from(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl Serialize for DoseTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_24h())
    }
}

impl<'de> Deserialize<'de> for DoseTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_24h() {
        let t = DoseTime::parse("08:00").unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 0));

        let t = DoseTime::parse("20:45").unwrap();
        assert_eq!((t.hour(), t.minute()), (20, 45));

        let t = DoseTime::parse(" 7:05 ").unwrap();
        assert_eq!(t.to_24h(), "07:05");
    }

    #[test]
    fn test_parse_meridiem() {
        assert_eq!(DoseTime::parse("8:00 AM").unwrap().to_24h(), "08:00");
        assert_eq!(DoseTime::parse("8:00 pm").unwrap().to_24h(), "20:00");
        assert_eq!(DoseTime::parse("12:00 AM").unwrap().to_24h(), "00:00");
        assert_eq!(DoseTime::parse("12:30 PM").unwrap().to_24h(), "12:30");
        assert_eq!(DoseTime::parse("9pm").unwrap().to_24h(), "21:00");
        assert_eq!(DoseTime::parse("6:15 a.m.").unwrap().to_24h(), "06:15");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DoseTime::parse("").is_err());
        assert!(DoseTime::parse("24:00").is_err());
        assert!(DoseTime::parse("08:60").is_err());
        assert!(DoseTime::parse("13:00 PM").is_err());
        assert!(DoseTime::parse("0:30 AM").is_err());
        assert!(DoseTime::parse("8").is_err());
        assert!(DoseTime::parse("noon").is_err());
    }

    #[test]
    fn test_display_12h() {
        assert_eq!(DoseTime::new(8, 0).unwrap().to_string(), "8:00 AM");
        assert_eq!(DoseTime::new(20, 0).unwrap().to_string(), "8:00 PM");
        assert_eq!(DoseTime::new(0, 5).unwrap().to_string(), "12:05 AM");
        assert_eq!(DoseTime::new(12, 0).unwrap().to_string(), "12:00 PM");
    }

    #[test]
    fn test_ordering() {
        let morning = DoseTime::parse("8:00 AM").unwrap();
        let noon = DoseTime::parse("12:00").unwrap();
        let evening = DoseTime::parse("8:00 PM").unwrap();
        assert!(morning < noon && noon < evening);
    }

    #[test]
    fn test_serde_uses_24h_string() {
        let t = DoseTime::parse("8:30 PM").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"20:30\"");

        let back: DoseTime = serde_json::from_str("\"8:30 PM\"").unwrap();
        assert_eq!(back, t);

        assert!(serde_json::from_str::<DoseTime>("\"later\"").is_err());
    }
}
