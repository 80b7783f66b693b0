//! Pages
//!
//! Top-level page components for each route.

pub mod calendar;
pub mod dashboard;
pub mod login;
pub mod medications;

pub use calendar::Calendar;
pub use dashboard::Dashboard;
pub use login::Login;
pub use medications::Medications;
