//! Toast Notification Component
//!
//! Shows success and error messages; click one to dismiss it early.

use leptos::*;

use crate::state::global::GlobalState;

/// Toast notification container
#[component]
pub fn Toast() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <div class="fixed bottom-20 right-4 z-50 space-y-2">
            <ToastMessage signal=state.success icon="✓" bg_class="bg-green-600" />
            <ToastMessage signal=state.error icon="✕" bg_class="bg-red-600" />
        </div>
    }
}

#[component]
fn ToastMessage(
    signal: RwSignal<Option<String>>,
    icon: &'static str,
    bg_class: &'static str,
) -> impl IntoView {
    move || {
        signal.get().map(|message| view! {
            <button
                type="button"
                on:click=move |_| signal.set(None)
                class=format!(
                    "flex items-center space-x-3 {} text-white px-4 py-3 rounded-lg shadow-lg",
                    bg_class
                )
            >
                <span class="text-lg">{icon}</span>
                <span class="text-sm font-medium">{message}</span>
            </button>
        })
    }
}
