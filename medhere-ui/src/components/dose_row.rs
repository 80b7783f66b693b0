//! Dose Row Component
//!
//! One dose with its check-off box, as shown on the dashboard.

use leptos::*;

use crate::state::global::{Dose, DoseStatus};

/// A single dose; `on_toggle` receives the dose key
#[component]
pub fn DoseRow(
    dose: Dose,
    #[prop(into)]
    on_toggle: Callback<String>,
) -> impl IntoView {
    let key = dose.key.clone();
    let row_class = if dose.status == DoseStatus::Missed {
        "flex items-center justify-between rounded-lg px-4 py-3 bg-red-900/40 border border-red-700"
    } else {
        "flex items-center justify-between rounded-lg px-4 py-3 bg-gray-700"
    };
    let as_needed = dose.status == DoseStatus::AsNeeded;

    view! {
        <li class=row_class>
            <label class="flex items-center space-x-3 cursor-pointer">
                <input
                    type="checkbox"
                    prop:checked=dose.taken
                    disabled=as_needed
                    on:change=move |_| on_toggle.call(key.clone())
                    class="w-5 h-5"
                />
                <span class="w-20 text-gray-300">
                    {dose.time_label.clone().unwrap_or_else(|| "Any time".to_string())}
                </span>
                <span class="font-medium">{dose.name.clone()}</span>
                <span class="text-gray-400 text-sm">{dose.dosage.clone()}</span>
            </label>
            <span class=format!("text-xs px-2 py-1 rounded {}", dose.status.badge_class())>
                {dose.status.label()}
            </span>
        </li>
    }
}
