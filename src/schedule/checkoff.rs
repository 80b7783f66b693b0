//! Dose check-off log
//!
//! Records which doses a user marked as taken, bucketed by calendar day.
//! Keys come from [`Medication::dose_key`](super::Medication::dose_key).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Taken doses per day
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoffLog {
    #[serde(default)]
    days: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl CheckoffLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a dose was marked as taken on `date`
    pub fn is_taken(&self, date: NaiveDate, key: &str) -> bool {
        self.days
            .get(&date)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    /// Set the taken state of a dose
    pub fn set(&mut self, date: NaiveDate, key: &str, taken: bool) {
        if taken {
            self.days.entry(date).or_default().insert(key.to_string());
        } else if let Some(keys) = self.days.get_mut(&date) {
            keys.remove(key);
            if keys.is_empty() {
                self.days.remove(&date);
            }
        }
    }

    /// Flip the taken state of a dose, returning the new state
    pub fn toggle(&mut self, date: NaiveDate, key: &str) -> bool {
        let taken = !self.is_taken(date, key);
        self.set(date, key, taken);
        taken
    }

    /// Number of doses taken on `date`
    pub fn taken_count(&self, date: NaiveDate) -> usize {
        self.days.get(&date).map(BTreeSet::len).unwrap_or(0)
    }

    /// Forget every key belonging to a medication (used after deletion)
    pub fn forget_medication(&mut self, medication_id: u64) {
        let id = medication_id.to_string();
        let prefix = format!("{}@", medication_id);
        for keys in self.days.values_mut() {
            keys.retain(|k| k != &id && !k.starts_with(&prefix));
        }
        self.days.retain(|_, keys| !keys.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_toggle_is_per_day() {
        let mut log = CheckoffLog::new();
        assert!(log.toggle(day(1), "1@08:00"));
        assert!(log.is_taken(day(1), "1@08:00"));
        assert!(!log.is_taken(day(2), "1@08:00"));

        assert!(!log.toggle(day(1), "1@08:00"));
        assert!(!log.is_taken(day(1), "1@08:00"));
        assert_eq!(log.taken_count(day(1)), 0);
    }

    #[test]
    fn test_forget_medication() {
        let mut log = CheckoffLog::new();
        log.set(day(1), "1@08:00", true);
        log.set(day(1), "12@08:00", true);
        log.set(day(2), "1", true);

        log.forget_medication(1);

        assert!(!log.is_taken(day(1), "1@08:00"));
        assert!(log.is_taken(day(1), "12@08:00"));
        assert_eq!(log.taken_count(day(2)), 0);
    }
}
