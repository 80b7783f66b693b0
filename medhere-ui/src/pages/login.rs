//! Login Page
//!
//! Pick a listed user and enter any non-empty password.

use leptos::*;

use crate::api;
use crate::components::InlineLoading;
use crate::state::global::GlobalState;

/// Login page component
#[component]
pub fn Login() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let users = create_local_resource(|| (), |_| async { api::fetch_users().await });
    let (user_id, set_user_id) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);
    let (message, set_message) = create_signal(None::<String>);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        set_message.set(None);
        set_submitting.set(true);

        let id = user_id.get();
        let pw = password.get();
        let state = state.clone();
        spawn_local(async move {
            match api::login(&id, &pw).await {
                Ok(response) => {
                    if response.seeded > 0 {
                        state.show_success(&format!(
                            "Welcome! {} sample medications were added to your list.",
                            response.seeded
                        ));
                    }
                    state.start_session(response.token, response.user);
                }
                Err(e) => set_message.set(Some(e)),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <div class="max-w-md mx-auto mt-16 bg-gray-800 rounded-xl p-8">
            <h1 class="text-3xl font-bold mb-2">"Welcome to MedHere"</h1>
            <p class="text-gray-400 mb-6">"Log in to see your medication schedule."</p>

            <form on:submit=on_submit class="space-y-4">
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"User"</label>
                    <select
                        on:change=move |ev| set_user_id.set(event_target_value(&ev))
                        prop:value=move || user_id.get()
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600"
                    >
                        <option value="">"Select a user"</option>
                        {move || users.get().map(|result| match result {
                            Ok(list) => list
                                .into_iter()
                                .map(|u| view! { <option value=u.id.clone()>{u.name}</option> })
                                .collect_view(),
                            Err(e) => view! {
                                <option disabled=true>{format!("Could not load users: {}", e)}</option>
                            }
                            .into_view(),
                        })}
                    </select>
                </div>

                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Password"</label>
                    <input
                        type="password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600"
                    />
                </div>

                {move || message.get().map(|m| view! {
                    <p class="text-red-400 text-sm">{m}</p>
                })}

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600 rounded-lg py-3
                           font-semibold transition-colors flex items-center justify-center space-x-2"
                >
                    {move || if submitting.get() {
                        view! { <InlineLoading /> <span>"Logging in..."</span> }.into_view()
                    } else {
                        view! { <span>"Log In"</span> }.into_view()
                    }}
                </button>
            </form>
        </div>
    }
}
