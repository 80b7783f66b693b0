//! Calendar views
//!
//! Buckets scheduled doses into day, week and month pages. Weeks start on
//! Sunday. A month page lists every day of the month and reports how many
//! blank cells precede day 1 in a Sunday-first grid.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::checkoff::CheckoffLog;
use super::doses::{doses_for_day, DoseSummary, ScheduledDose};
use super::error::ScheduleError;
use super::types::Medication;

/// Colors assigned to medication names on the calendar
const PALETTE: &[&str] = &[
    "#FF5733", "#33FF57", "#3357FF", "#F1C40F", "#9B59B6", "#1ABC9C", "#E67E22", "#E91E63",
];

/// Color for names that cannot be hashed meaningfully
pub const DEFAULT_COLOR: &str = "#999999";

/// Span covered by a calendar page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    #[default]
    Month,
}

impl FromStr for CalendarView {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Ok(CalendarView::Day),
            "week" | "w" => Ok(CalendarView::Week),
            "month" | "m" => Ok(CalendarView::Month),
            _ => Err(ScheduleError::UnknownView(s.to_string())),
        }
    }
}

impl std::fmt::Display for CalendarView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarView::Day => write!(f, "day"),
            CalendarView::Week => write!(f, "week"),
            CalendarView::Month => write!(f, "month"),
        }
    }
}

/// One day cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Short weekday name ("Sun")
    pub weekday: String,
    pub is_today: bool,
    pub doses: Vec<ScheduledDose>,
    pub summary: DoseSummary,
}

/// A full calendar page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarPage {
    pub view: CalendarView,
    pub anchor: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub title: String,
    /// Empty cells before the first day in a Sunday-first grid
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    /// Anchors for the neighbouring pages
    pub previous: NaiveDate,
    pub next: NaiveDate,
}

/// First day of the Sunday-first week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// First and last day of `date`'s month
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(first);
    (first, last)
}

/// Inclusive date range covered by a view around `anchor`
pub fn view_range(view: CalendarView, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Day => (anchor, anchor),
        CalendarView::Week => {
            let start = week_start(anchor);
            (start, start + Duration::days(6))
        }
        CalendarView::Month => month_bounds(anchor),
    }
}

/// Move the anchor by `steps` pages (negative moves backwards)
///
/// Month moves clamp to the last day of shorter months.
pub fn shift_anchor(view: CalendarView, anchor: NaiveDate, steps: i32) -> NaiveDate {
    match view {
        CalendarView::Day => anchor + Duration::days(steps as i64),
        CalendarView::Week => anchor + Duration::weeks(steps as i64),
        CalendarView::Month => {
            let months = Months::new(steps.unsigned_abs());
            let shifted = if steps >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            };
            shifted.unwrap_or(anchor)
        }
    }
}

/// Page title for a view
pub fn view_title(view: CalendarView, anchor: NaiveDate) -> String {
    match view {
        CalendarView::Day => anchor.format("%A, %b %-d, %Y").to_string(),
        CalendarView::Week => {
            let (start, end) = view_range(view, anchor);
            if start.year() == end.year() {
                format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
            } else {
                format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
            }
        }
        CalendarView::Month => anchor.format("%B %Y").to_string(),
    }
}

/// Build a calendar page of scheduled doses
pub fn build_calendar(
    meds: &[Medication],
    view: CalendarView,
    anchor: NaiveDate,
    log: &CheckoffLog,
    now: NaiveDateTime,
) -> CalendarPage {
    let (start, end) = view_range(view, anchor);
    let today = now.date();

    let days: Vec<CalendarDay> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let doses = doses_for_day(meds, date, log, now);
            CalendarDay {
                date,
                weekday: date.format("%a").to_string(),
                is_today: date == today,
                summary: DoseSummary::from_doses(&doses),
                doses,
            }
        })
        .collect();

    let leading_blanks = match view {
        CalendarView::Month => start.weekday().num_days_from_sunday(),
        _ => 0,
    };

    CalendarPage {
        view,
        anchor,
        start,
        end,
        title: view_title(view, anchor),
        leading_blanks,
        days,
        previous: shift_anchor(view, anchor, -1),
        next: shift_anchor(view, anchor, 1),
    }
}

/// Stable display color for a medication name (FNV-1a over the lowercase name)
pub fn medication_color(name: &str) -> &'static str {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return DEFAULT_COLOR;
    }
    let hash = normalized
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    PALETTE[hash as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{parse_date, Frequency, MedicationDraft};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn noon(s: &str) -> NaiveDateTime {
        date(s).and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("Week".parse::<CalendarView>().unwrap(), CalendarView::Week);
        assert_eq!("m".parse::<CalendarView>().unwrap(), CalendarView::Month);
        assert!("year".parse::<CalendarView>().is_err());
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2025-01-08 is a Wednesday
        let (start, end) = view_range(CalendarView::Week, date("2025-01-08"));
        assert_eq!(start, date("2025-01-05"));
        assert_eq!(end, date("2025-01-11"));

        // A Sunday is its own week start
        assert_eq!(week_start(date("2025-01-05")), date("2025-01-05"));
    }

    #[test]
    fn test_month_bounds_and_blanks() {
        let meds = Vec::new();
        let page = build_calendar(
            &meds,
            CalendarView::Month,
            date("2024-02-14"),
            &CheckoffLog::new(),
            noon("2024-02-14"),
        );
        assert_eq!(page.start, date("2024-02-01"));
        assert_eq!(page.end, date("2024-02-29"));
        assert_eq!(page.days.len(), 29);
        // 2024-02-01 is a Thursday
        assert_eq!(page.leading_blanks, 4);
        assert_eq!(page.title, "February 2024");
        assert!(page.days.iter().any(|d| d.is_today && d.date == date("2024-02-14")));
    }

    #[test]
    fn test_shift_anchor_clamps_month() {
        assert_eq!(
            shift_anchor(CalendarView::Month, date("2025-01-31"), 1),
            date("2025-02-28")
        );
        assert_eq!(
            shift_anchor(CalendarView::Month, date("2025-03-31"), -1),
            date("2025-02-28")
        );
        assert_eq!(
            shift_anchor(CalendarView::Week, date("2025-01-08"), -1),
            date("2025-01-01")
        );
        assert_eq!(
            shift_anchor(CalendarView::Day, date("2024-12-31"), 1),
            date("2025-01-01")
        );
    }

    #[test]
    fn test_week_page_buckets_doses() {
        let daily = MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-01-07")
            .time("08:00")
            .validate(1)
            .unwrap();
        let weekly = MedicationDraft::new("Methotrexate", 2.5, "mg", "2025-01-06")
            .frequency(Frequency::Weekly)
            .time("09:00")
            .validate(2)
            .unwrap();

        let page = build_calendar(
            &[daily, weekly],
            CalendarView::Week,
            date("2025-01-08"),
            &CheckoffLog::new(),
            noon("2025-01-01"),
        );

        assert_eq!(page.days.len(), 7);
        assert_eq!(page.days[0].weekday, "Sun");
        // Sun, Mon: before Zyrtec starts; Monday has the weekly dose
        assert_eq!(page.days[0].doses.len(), 0);
        assert_eq!(page.days[1].doses.len(), 1);
        assert_eq!(page.days[1].doses[0].name, "Methotrexate");
        // Tuesday onward: Zyrtec only
        assert!(page.days[2..].iter().all(|d| d.doses.len() == 1));
        assert_eq!(page.title, "Jan 5 - Jan 11, 2025");
    }

    #[test]
    fn test_week_page_weekday_regimen() {
        let med = MedicationDraft::new("Prednisone", 5.0, "mg", "2025-01-01")
            .time("08:00")
            .day("mon")
            .day("wed")
            .day("fri")
            .validate(3)
            .unwrap();

        let page = build_calendar(
            &[med],
            CalendarView::Week,
            date("2025-01-08"),
            &CheckoffLog::new(),
            noon("2025-01-01"),
        );

        let with_doses: Vec<&str> = page
            .days
            .iter()
            .filter(|d| !d.doses.is_empty())
            .map(|d| d.weekday.as_str())
            .collect();
        assert_eq!(with_doses, vec!["Mon", "Wed", "Fri"]);
    }

    #[test]
    fn test_medication_color_is_stable() {
        assert_eq!(medication_color("Aspirin"), medication_color("aspirin "));
        assert!(PALETTE.contains(&medication_color("Metformin")));
        assert_eq!(medication_color("  "), DEFAULT_COLOR);
    }
}
