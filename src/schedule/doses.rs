//! Daily dose derivation
//!
//! Expands medication records into the concrete doses due on one day and
//! classifies each against the check-off log and the current time.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::checkoff::CheckoffLog;
use super::format::format_dosage;
use super::time::DoseTime;
use super::types::{Frequency, Medication, MedicationId};

/// Default look-ahead for refill reminders
pub const REFILL_WINDOW_DAYS: i64 = 7;

/// State of a single dose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    /// Marked as taken
    Taken,
    /// Due later (or due today without a time)
    Upcoming,
    /// Due time has passed and the dose was not marked
    Missed,
    /// Taken only when needed, never overdue
    AsNeeded,
}

/// One dose of one medication on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledDose {
    pub medication_id: MedicationId,
    pub name: String,
    /// Formatted amount and unit
    pub dosage: String,
    pub form: String,
    pub date: NaiveDate,
    /// None for untimed doses
    pub time: Option<DoseTime>,
    /// 12-hour label of `time`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_label: Option<String>,
    /// Check-off key for this dose
    pub key: String,
    pub taken: bool,
    pub status: DoseStatus,
}

/// Totals for a list of doses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseSummary {
    pub total: usize,
    pub taken: usize,
    pub missed: usize,
    pub upcoming: usize,
    pub as_needed: usize,
}

impl DoseSummary {
    pub fn from_doses(doses: &[ScheduledDose]) -> Self {
        doses.iter().fold(Self::default(), |mut acc, dose| {
            acc.total += 1;
            match dose.status {
                DoseStatus::Taken => acc.taken += 1,
                DoseStatus::Missed => acc.missed += 1,
                DoseStatus::Upcoming => acc.upcoming += 1,
                DoseStatus::AsNeeded => acc.as_needed += 1,
            }
            acc
        })
    }

    /// True when every scheduled (non as-needed) dose was taken
    pub fn all_taken(&self) -> bool {
        self.taken + self.as_needed >= self.total && self.missed == 0 && self.upcoming == 0
    }
}

/// Build the list of doses due on `date`
///
/// Scheduled medications contribute one dose per time of day, or a single
/// untimed dose when no times were entered. As-needed medications active on
/// `date` contribute one untimed entry. Doses are ordered by time with untimed
/// doses last, then by name.
pub fn doses_for_day(
    meds: &[Medication],
    date: NaiveDate,
    log: &CheckoffLog,
    now: NaiveDateTime,
) -> Vec<ScheduledDose> {
    let mut doses = Vec::new();

    for med in meds {
        if med.frequency == Frequency::AsNeeded {
            if med.is_active_on(date) {
                doses.push(make_dose(med, date, None, log, now));
            }
            continue;
        }

        if !med.is_scheduled_on(date) {
            continue;
        }

        if med.times.is_empty() {
            doses.push(make_dose(med, date, None, log, now));
        } else {
            for time in &med.times {
                doses.push(make_dose(med, date, Some(*time), log, now));
            }
        }
    }

    doses.sort_by(|a, b| {
        let time_order = match (a.time, b.time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        time_order
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.medication_id.cmp(&b.medication_id))
    });

    doses
}

fn make_dose(
    med: &Medication,
    date: NaiveDate,
    time: Option<DoseTime>,
    log: &CheckoffLog,
    now: NaiveDateTime,
) -> ScheduledDose {
    let key = med.dose_key(time);
    let taken = log.is_taken(date, &key);
    let status = dose_status(med.frequency, date, time, taken, now);

    ScheduledDose {
        medication_id: med.id,
        name: med.name.clone(),
        dosage: format_dosage(med),
        form: med.form.to_string(),
        date,
        time,
        time_label: time.map(|t| t.to_string()),
        key,
        taken,
        status,
    }
}

/// Classify a dose
///
/// A timed dose is missed once its time on `date` has passed. An untimed
/// scheduled dose is missed only once its whole day has passed.
pub fn dose_status(
    frequency: Frequency,
    date: NaiveDate,
    time: Option<DoseTime>,
    taken: bool,
    now: NaiveDateTime,
) -> DoseStatus {
    if taken {
        return DoseStatus::Taken;
    }
    if frequency == Frequency::AsNeeded {
        return DoseStatus::AsNeeded;
    }
    let overdue = match time {
        Some(t) => date.and_time(t.as_naive_time()) < now,
        None => date < now.date(),
    };
    if overdue {
        DoseStatus::Missed
    } else {
        DoseStatus::Upcoming
    }
}

/// Medications whose refill date falls within `[today, today + window_days]`,
/// soonest first
pub fn refills_due(meds: &[Medication], today: NaiveDate, window_days: i64) -> Vec<&Medication> {
    let horizon = today + Duration::days(window_days.max(0));
    let mut due: Vec<&Medication> = meds
        .iter()
        .filter(|m| {
            m.refill_date
                .map(|r| r >= today && r <= horizon)
                .unwrap_or(false)
        })
        .collect();
    due.sort_by_key(|m| (m.refill_date, m.id));
    due
}
