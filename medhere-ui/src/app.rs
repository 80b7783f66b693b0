//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{Nav, Toast};
use crate::pages::{Calendar, Dashboard, Login, Medications};
use crate::state::global::{provide_global_state, GlobalState};
use crate::state::websocket::{connect_websocket, WebSocketClient};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    let state = use_context::<GlobalState>().expect("GlobalState not found");

    // One live feed per session; a new token replaces the old connection
    let client = store_value(None::<WebSocketClient>);
    create_effect(move |_| {
        let token = state.token.get();
        if let Some(old) = client.get_value() {
            old.close();
        }

        let next = token.map(|t| {
            let state = state.clone();
            let for_list = state.clone();
            let t_for_list = t.clone();
            spawn_local(async move {
                match api::fetch_medications(&t_for_list).await {
                    Ok(meds) => for_list.set_medications(meds),
                    Err(e) => for_list.show_error(&e),
                }
            });
            connect_websocket(state, &api::get_api_base(), &t)
        });
        client.set_value(next);
    });

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                // Navigation header
                <Nav />

                // Main content area
                <main class="flex-1 container mx-auto px-4 py-8 pb-24">
                    <Routes>
                        <Route path="/" view=|| view! { <Protected><Dashboard /></Protected> } />
                        <Route path="/medications" view=|| view! { <Protected><Medications /></Protected> } />
                        <Route path="/calendar" view=|| view! { <Protected><Calendar /></Protected> } />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                // Footer with connection status
                <Footer />

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}

/// Shows the login form until a session exists
#[component]
fn Protected(children: ChildrenFn) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;

    view! {
        <Show when=move || token.get().is_some() fallback=|| view! { <Login /> }>
            {children()}
        </Show>
    }
}

/// Footer component showing connection status
#[component]
fn Footer() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;
    let ws_connected = state.ws_connected;
    let last_sync = state.last_sync;

    view! {
        <footer class="fixed bottom-0 left-0 right-0 bg-gray-800 border-t border-gray-700 py-3 px-4">
            <div class="container mx-auto flex items-center justify-between text-sm">
                // WebSocket status
                <div class="flex items-center space-x-2">
                    {move || {
                        if token.get().is_none() {
                            view! { <span class="text-gray-400">"Not logged in"</span> }.into_view()
                        } else if ws_connected.get() {
                            view! {
                                <span class="flex items-center space-x-1 text-green-400">
                                    <span class="w-2 h-2 bg-green-400 rounded-full pulse" />
                                    <span>"Live"</span>
                                </span>
                            }.into_view()
                        } else {
                            view! {
                                <span class="flex items-center space-x-1 text-red-400">
                                    <span class="w-2 h-2 bg-red-400 rounded-full" />
                                    <span>"Offline"</span>
                                </span>
                            }.into_view()
                        }
                    }}
                </div>

                // Last list update
                <div class="text-gray-400">
                    {move || {
                        last_sync.get()
                            .and_then(chrono::DateTime::from_timestamp_millis)
                            .map(|dt| {
                                let local = dt.with_timezone(&chrono::Local);
                                format!("Updated {}", local.format("%-I:%M %p"))
                            })
                            .unwrap_or_default()
                    }}
                </div>
            </div>
        </footer>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"💊"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/"
                class="px-6 py-3 bg-blue-600 hover:bg-blue-700 rounded-lg font-medium transition-colors"
            >
                "Go to Dashboard"
            </A>
        </div>
    }
}
