//! Navigation Component
//!
//! Header bar with the page links and the logged-in user.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::state::global::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;
    let user = state.user;

    let state_for_logout = state.clone();
    let on_logout = move |_| {
        let session = token.get_untracked();
        state_for_logout.end_session();
        if let Some(token) = session {
            spawn_local(async move { api::logout(&token).await });
        }
    };

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    // Logo and brand
                    <A href="/" class="flex items-center space-x-3">
                        <span class="text-2xl">"💊"</span>
                        <span class="text-xl font-bold text-white">"MedHere"</span>
                    </A>

                    // Page links, only once logged in
                    <Show when=move || token.get().is_some() fallback=|| ()>
                        <div class="flex items-center space-x-1">
                            <NavLink href="/" label="Dashboard" />
                            <NavLink href="/medications" label="Medications" />
                            <NavLink href="/calendar" label="Calendar" />
                        </div>
                    </Show>

                    {move || user.get().map(|user| view! {
                        <div class="flex items-center space-x-3 text-sm">
                            <span class="text-gray-300">{user.name}</span>
                            <button
                                on:click=on_logout.clone()
                                class="px-3 py-1 rounded-lg bg-gray-700 hover:bg-gray-600 transition-colors"
                            >
                                "Log out"
                            </button>
                        </div>
                    })}
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            exact=true
            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
        >
            {label}
        </A>
    }
}
