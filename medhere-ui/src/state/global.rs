//! Global Application State
//!
//! Reactive state management using Leptos signals. The session survives page
//! reloads through browser local storage.

use leptos::*;

const TOKEN_KEY: &str = "medhere_token";
const USER_KEY: &str = "medhere_user";

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Session token from login
    pub token: RwSignal<Option<String>>,
    /// Logged-in user
    pub user: RwSignal<Option<User>>,
    /// The user's medication list, kept current by the WebSocket feed
    pub medications: RwSignal<Vec<Medication>>,
    /// WebSocket connection status
    pub ws_connected: RwSignal<bool>,
    /// Last list update timestamp
    pub last_sync: RwSignal<Option<i64>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// A user that can log in
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// Medication with the server's display strings
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq)]
pub struct Medication {
    pub id: u64,
    pub name: String,
    pub dosage_amount: f64,
    pub dosage_unit: String,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub reason: String,
    pub frequency: String,
    #[serde(default)]
    pub times: Vec<String>,
    /// Weekday names ("Mon"); empty means every day
    #[serde(default)]
    pub days: Vec<String>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub no_end_date: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub refill_date: Option<String>,
    pub dosage_text: String,
    pub frequency_text: String,
    pub date_range: String,
    pub color: String,
}

/// One dose on one day
#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
pub struct Dose {
    pub medication_id: u64,
    pub name: String,
    pub dosage: String,
    #[serde(default)]
    pub form: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub time_label: Option<String>,
    pub key: String,
    pub taken: bool,
    pub status: DoseStatus,
}

#[derive(Clone, Copy, Debug, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Taken,
    Upcoming,
    Missed,
    AsNeeded,
}

impl DoseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DoseStatus::Taken => "Taken",
            DoseStatus::Upcoming => "Upcoming",
            DoseStatus::Missed => "Missed",
            DoseStatus::AsNeeded => "As needed",
        }
    }

    /// Tailwind classes for the status badge
    pub fn badge_class(&self) -> &'static str {
        match self {
            DoseStatus::Taken => "bg-green-700 text-green-100",
            DoseStatus::Upcoming => "bg-blue-700 text-blue-100",
            DoseStatus::Missed => "bg-red-700 text-red-100",
            DoseStatus::AsNeeded => "bg-gray-600 text-gray-200",
        }
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize, PartialEq)]
pub struct DoseSummary {
    pub total: usize,
    pub taken: usize,
    pub missed: usize,
    pub upcoming: usize,
    pub as_needed: usize,
}

/// Frequency labels in form order
pub const FREQUENCIES: [&str; 6] = [
    "Once daily",
    "Twice daily",
    "Three times daily",
    "Four times daily",
    "Weekly",
    "As needed",
];

/// Weekday names in form order, Monday first
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Number of time inputs the add form shows for a frequency
pub fn frequency_slots(frequency: &str) -> usize {
    match frequency {
        "Once daily" => 1,
        "Twice daily" => 2,
        "Three times daily" => 3,
        "Four times daily" => 4,
        _ => 0,
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn load_session() -> (Option<String>, Option<User>) {
    let Some(storage) = local_storage() else {
        return (None, None);
    };
    let token = storage.get_item(TOKEN_KEY).ok().flatten();
    let user = storage
        .get_item(USER_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok());
    (token, user)
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let (token, user) = load_session();

    let state = GlobalState {
        token: create_rw_signal(token),
        user: create_rw_signal(user),
        medications: create_rw_signal(Vec::new()),
        ws_connected: create_rw_signal(false),
        last_sync: create_rw_signal(None),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Store a new session in signals and local storage
    pub fn start_session(&self, token: String, user: User) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(TOKEN_KEY, &token);
            if let Ok(json) = serde_json::to_string(&user) {
                let _ = storage.set_item(USER_KEY, &json);
            }
        }
        self.user.set(Some(user));
        self.token.set(Some(token));
    }

    /// Forget the session (logout or expired token)
    pub fn end_session(&self) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
        self.token.set(None);
        self.user.set(None);
        self.medications.set(Vec::new());
    }

    /// Replace the medication list
    pub fn set_medications(&self, meds: Vec<Medication>) {
        self.medications.set(meds);
        self.last_sync.set(Some(chrono::Utc::now().timestamp_millis()));
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        }).forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        }).forget();
    }
}
