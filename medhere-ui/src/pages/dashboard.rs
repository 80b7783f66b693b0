//! Dashboard Page
//!
//! Today's doses with check-off toggles, missed doses and refills coming up.

use leptos::*;

use crate::api::{self, DoseDay};
use crate::components::{DoseRow, Loading};
use crate::state::global::{DoseStatus, GlobalState, Medication};

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;
    let medications = state.medications;

    let day = create_rw_signal(None::<DoseDay>);
    let refills = create_rw_signal(Vec::<Medication>::new());
    let busy = create_rw_signal(false);

    let state_for_load = state.clone();
    let load = move || {
        let Some(t) = token.get_untracked() else {
            return;
        };
        let state = state_for_load.clone();
        spawn_local(async move {
            match api::fetch_doses(&t, None).await {
                Ok(d) => day.set(Some(d)),
                Err(e) => state.show_error(&e),
            }
            match api::fetch_refills(&t).await {
                Ok(r) => refills.set(r),
                Err(e) => state.show_error(&e),
            }
        });
    };

    // Reload whenever the medication list changes
    let load_on_change = load.clone();
    create_effect(move |_| {
        medications.with(|_| ());
        load_on_change();
    });

    let load_after_toggle = load.clone();
    let state_for_toggle = state.clone();
    let on_toggle = Callback::new(move |key: String| {
        let (Some(t), Some(d)) = (token.get_untracked(), day.get_untracked()) else {
            return;
        };
        let state = state_for_toggle.clone();
        let reload = load_after_toggle.clone();
        spawn_local(async move {
            if let Err(e) = api::toggle_dose(&t, &d.date, &key).await {
                state.show_error(&e);
            }
            reload();
        });
    });

    let state_for_bulk = state.clone();
    let bulk = move |mark: bool| {
        let (Some(t), Some(d)) = (token.get_untracked(), day.get_untracked()) else {
            return;
        };
        let state = state_for_bulk.clone();
        busy.set(true);
        spawn_local(async move {
            let result = if mark {
                api::mark_all(&t, &d.date).await
            } else {
                api::clear_day(&t, &d.date).await
            };
            match result {
                Ok(updated) => {
                    day.set(Some(updated));
                    state.show_success(if mark { "All doses marked taken" } else { "Doses cleared" });
                }
                Err(e) => state.show_error(&e),
            }
            busy.set(false);
        });
    };
    let mark_all = bulk.clone();
    let clear_all = bulk;

    view! {
        <div class="space-y-8">
            // Header
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">
                        {move || state.user.get().map(|u| format!("Hello, {}", u.name)).unwrap_or_default()}
                    </h1>
                    <p class="text-gray-400 mt-1">
                        {chrono::Local::now().format("%A, %B %-d, %Y").to_string()}
                    </p>
                </div>
                <div class="flex space-x-2">
                    <button
                        on:click=move |_| mark_all(true)
                        disabled=move || busy.get()
                        class="px-4 py-2 bg-green-600 hover:bg-green-700 disabled:bg-gray-600 rounded-lg"
                    >
                        "Mark all taken"
                    </button>
                    <button
                        on:click=move |_| clear_all(false)
                        disabled=move || busy.get()
                        class="px-4 py-2 bg-gray-600 hover:bg-gray-500 disabled:bg-gray-700 rounded-lg"
                    >
                        "Clear"
                    </button>
                </div>
            </div>

            {move || match day.get() {
                None => view! { <Loading /> }.into_view(),
                Some(d) => view! { <DayView day=d on_toggle=on_toggle /> }.into_view(),
            }}

            <RefillList refills=refills />
        </div>
    }
}

#[component]
fn DayView(day: DoseDay, on_toggle: Callback<String>) -> impl IntoView {
    let summary = day.summary.clone();
    let (scheduled, as_needed): (Vec<_>, Vec<_>) = day
        .doses
        .into_iter()
        .partition(|d| d.status != DoseStatus::AsNeeded);

    view! {
        // Summary cards
        <div class="grid grid-cols-2 md:grid-cols-4 gap-4">
            <SummaryCard label="Scheduled" value=scheduled.len() class="text-white" />
            <SummaryCard label="Taken" value=summary.taken class="text-green-400" />
            <SummaryCard label="Missed" value=summary.missed class="text-red-400" />
            <SummaryCard label="Upcoming" value=summary.upcoming class="text-blue-400" />
        </div>

        {(summary.missed > 0).then(|| view! {
            <div class="bg-red-900/40 border border-red-700 rounded-lg px-4 py-3 text-red-200">
                {format!(
                    "You have {} missed dose{} today.",
                    summary.missed,
                    if summary.missed == 1 { "" } else { "s" }
                )}
            </div>
        })}

        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Today's Doses"</h2>
            {if scheduled.is_empty() {
                view! { <p class="text-gray-400">"No doses scheduled today."</p> }.into_view()
            } else {
                view! {
                    <ul class="space-y-2">
                        {scheduled
                            .into_iter()
                            .map(|dose| view! { <DoseRow dose=dose on_toggle=on_toggle /> })
                            .collect_view()}
                    </ul>
                }
                .into_view()
            }}
        </section>

        {(!as_needed.is_empty()).then(|| view! {
            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"As Needed"</h2>
                <ul class="space-y-2">
                    {as_needed
                        .into_iter()
                        .map(|dose| view! { <DoseRow dose=dose on_toggle=on_toggle /> })
                        .collect_view()}
                </ul>
            </section>
        })}
    }
}

#[component]
fn SummaryCard(label: &'static str, value: usize, class: &'static str) -> impl IntoView {
    view! {
        <div class="bg-gray-800 rounded-lg p-4">
            <div class="text-sm text-gray-400">{label}</div>
            <div class=format!("text-3xl font-bold {}", class)>{value}</div>
        </div>
    }
}

#[component]
fn RefillList(refills: RwSignal<Vec<Medication>>) -> impl IntoView {
    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Refills Coming Up"</h2>
            {move || {
                let meds = refills.get();
                if meds.is_empty() {
                    view! { <p class="text-gray-400">"No refills due this week."</p> }.into_view()
                } else {
                    meds.into_iter()
                        .map(|m| view! {
                            <div class="flex justify-between py-2 border-b border-gray-700">
                                <span>{m.name}</span>
                                <span class="text-yellow-400">
                                    {m.refill_date.unwrap_or_default()}
                                </span>
                            </div>
                        })
                        .collect_view()
                }
            }}
        </section>
    }
}
