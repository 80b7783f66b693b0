//! UI Components
//!
//! Reusable Leptos components shared by the pages.

pub mod dose_row;
pub mod loading;
pub mod nav;
pub mod toast;

pub use dose_row::DoseRow;
pub use loading::{InlineLoading, Loading};
pub use nav::Nav;
pub use toast::Toast;
