//! MedHere Schedule Model
//!
//! Pure domain logic with no I/O:
//!
//! - **types**: Medication records, frequencies, dosage forms, form validation
//! - **time**: Time-of-day parsing (24h and AM/PM) and formatting
//! - **checkoff**: Per-day log of doses marked as taken
//! - **doses**: Expansion of records into the doses due on a day
//! - **calendar**: Day/week/month bucketing of doses
//! - **format**: Display strings for dosage, frequency and dates
//!
//! # Example
//!
//! ```rust
//! use medhere::schedule::*;
//! use chrono::NaiveDate;
//!
//! let med = MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01")
//!     .frequency(Frequency::TwiceDaily)
//!     .time("8:00 AM")
//!     .time("20:00")
//!     .validate(1)
//!     .unwrap();
//!
//! assert_eq!(format_frequency(&med), "Twice daily (8:00 AM + 8:00 PM)");
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//! let now = day.and_hms_opt(9, 0, 0).unwrap();
//! let doses = doses_for_day(&[med], day, &CheckoffLog::new(), now);
//! assert_eq!(doses[0].status, DoseStatus::Missed);
//! assert_eq!(doses[1].status, DoseStatus::Upcoming);
//! ```

pub mod calendar;
pub mod checkoff;
pub mod doses;
pub mod error;
pub mod format;
pub mod time;
pub mod types;

pub use calendar::{
    build_calendar, medication_color, shift_anchor, view_range, week_start, CalendarDay,
    CalendarPage, CalendarView,
};
pub use checkoff::CheckoffLog;
pub use doses::{
    doses_for_day, refills_due, DoseStatus, DoseSummary, ScheduledDose, REFILL_WINDOW_DAYS,
};
pub use error::{ScheduleError, ScheduleResult};
pub use format::{format_date, format_date_range, format_dosage, format_frequency};
pub use time::DoseTime;
pub use types::{parse_date, DosageForm, Frequency, Medication, MedicationDraft, MedicationId};
