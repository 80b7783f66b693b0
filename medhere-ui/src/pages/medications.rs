//! Medications Page
//!
//! The user's medication list, the add form and the interaction check.

use leptos::*;

use crate::api::{self, Interaction, MedicationDraft};
use crate::components::InlineLoading;
use crate::state::global::{frequency_slots, GlobalState, Medication, FREQUENCIES, WEEKDAYS};

const UNITS: [&str; 6] = ["mg", "mcg", "g", "ml", "units", "puffs"];
const FORMS: [&str; 7] = ["tablet", "capsule", "liquid", "injection", "topical", "inhaler", "drops"];

/// Medications page component
#[component]
pub fn Medications() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;

    let notes_for = create_rw_signal(None::<Medication>);
    let interactions = create_rw_signal(None::<Vec<Interaction>>);
    let checking = create_rw_signal(false);

    // Initial load; the WebSocket feed keeps it current afterwards
    let state_for_load = state.clone();
    create_effect(move |_| {
        let Some(t) = token.get() else {
            return;
        };
        let state = state_for_load.clone();
        spawn_local(async move {
            match api::fetch_medications(&t).await {
                Ok(meds) => state.set_medications(meds),
                Err(e) => state.show_error(&e),
            }
        });
    });

    let state_for_delete = state.clone();
    let on_delete = Callback::new(move |med: Medication| {
        let confirmed = window()
            .confirm_with_message(&format!("Delete {}?", med.name))
            .unwrap_or(false);
        let (true, Some(t)) = (confirmed, token.get_untracked()) else {
            return;
        };
        let state = state_for_delete.clone();
        spawn_local(async move {
            match api::delete_medication(&t, med.id).await {
                Ok(()) => {
                    state.medications.update(|list| list.retain(|m| m.id != med.id));
                    state.show_success(&format!("Deleted {}", med.name));
                }
                Err(e) => state.show_error(&e),
            }
        });
    });

    let state_for_check = state.clone();
    let on_check = move |_| {
        let Some(t) = token.get_untracked() else {
            return;
        };
        let state = state_for_check.clone();
        checking.set(true);
        spawn_local(async move {
            match api::check_interactions(&t).await {
                Ok(found) => interactions.set(Some(found)),
                Err(e) => state.show_error(&format!("Could not retrieve interaction data: {}", e)),
            }
            checking.set(false);
        });
    };

    view! {
        <div class="space-y-8">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"Medications"</h1>
                    <p class="text-gray-400 mt-1">"Everything you take and when."</p>
                </div>
                <button
                    on:click=on_check
                    disabled=move || checking.get()
                    class="px-4 py-2 bg-purple-600 hover:bg-purple-700 disabled:bg-gray-600 rounded-lg
                           flex items-center space-x-2"
                >
                    {move || checking.get().then(|| view! { <InlineLoading /> })}
                    <span>"Check Interactions"</span>
                </button>
            </div>

            <InteractionPanel interactions=interactions />

            <div class="grid md:grid-cols-2 gap-8">
                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Your List"</h2>
                    {move || {
                        let meds = state.medications.get();
                        if meds.is_empty() {
                            view! { <p class="text-gray-400">"No medications yet."</p> }.into_view()
                        } else {
                            meds.into_iter()
                                .map(|med| view! {
                                    <MedicationCard med=med on_delete=on_delete notes_for=notes_for />
                                })
                                .collect_view()
                        }
                    }}
                </section>

                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Add Medication"</h2>
                    <MedicationForm />
                </section>
            </div>

            <NotesModal notes_for=notes_for />
        </div>
    }
}

#[component]
fn MedicationCard(
    med: Medication,
    on_delete: Callback<Medication>,
    notes_for: RwSignal<Option<Medication>>,
) -> impl IntoView {
    let has_notes = med.notes.as_deref().is_some_and(|n| !n.is_empty());
    let for_notes = med.clone();
    let for_delete = med.clone();

    view! {
        <div class="border-l-4 pl-4 py-3 mb-3" style=format!("border-color: {}", med.color)>
            <div class="flex items-start justify-between">
                <div>
                    <div class="font-semibold text-lg">{med.name.clone()}</div>
                    <div class="text-sm text-gray-300">
                        {format!("{} {}", med.dosage_text, med.form)}
                    </div>
                    <div class="text-sm text-gray-400">{med.frequency_text.clone()}</div>
                    <div class="text-sm text-gray-400">{med.date_range.clone()}</div>
                    {(!med.reason.is_empty()).then(|| view! {
                        <div class="text-sm text-gray-500">{format!("For: {}", med.reason)}</div>
                    })}
                </div>
                <div class="flex space-x-2">
                    {has_notes.then(|| view! {
                        <button
                            on:click=move |_| notes_for.set(Some(for_notes.clone()))
                            class="px-2 py-1 text-sm bg-gray-700 hover:bg-gray-600 rounded"
                        >
                            "Notes"
                        </button>
                    })}
                    <button
                        on:click=move |_| on_delete.call(for_delete.clone())
                        class="px-2 py-1 text-sm bg-red-700 hover:bg-red-600 rounded"
                    >
                        "Delete"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn NotesModal(notes_for: RwSignal<Option<Medication>>) -> impl IntoView {
    move || {
        notes_for.get().map(|med| view! {
            <div class="fixed inset-0 bg-black/60 flex items-center justify-center z-40">
                <div class="bg-gray-800 rounded-xl p-6 max-w-md w-full">
                    <h3 class="text-xl font-semibold mb-2">{format!("Notes for {}", med.name)}</h3>
                    <p class="text-gray-300 whitespace-pre-wrap">{med.notes.unwrap_or_default()}</p>
                    <button
                        on:click=move |_| notes_for.set(None)
                        class="mt-6 px-4 py-2 bg-gray-600 hover:bg-gray-500 rounded-lg"
                    >
                        "Close"
                    </button>
                </div>
            </div>
        })
    }
}

#[component]
fn InteractionPanel(interactions: RwSignal<Option<Vec<Interaction>>>) -> impl IntoView {
    move || {
        interactions.get().map(|found| {
            let body = if found.is_empty() {
                view! {
                    <p class="text-green-400">"No clinically significant drug interactions found."</p>
                }
                .into_view()
            } else {
                found
                    .into_iter()
                    .map(|i| {
                        let color = match i.severity.as_str() {
                            "high" => "text-red-400",
                            "moderate" => "text-yellow-400",
                            "low" => "text-blue-400",
                            _ => "text-gray-400",
                        };
                        view! {
                            <div class="py-2 border-b border-gray-700">
                                <div class="font-medium">
                                    {format!("Interaction between: {}", i.drugs.join(" and "))}
                                </div>
                                <div class=format!("text-sm {}", color)>
                                    {format!("Severity: {}", capitalize(&i.severity))}
                                </div>
                                <div class="text-sm text-gray-300">{i.description}</div>
                            </div>
                        }
                    })
                    .collect_view()
            };

            view! {
                <section class="bg-gray-800 rounded-xl p-6">
                    <div class="flex justify-between items-center mb-2">
                        <h2 class="text-xl font-semibold">"Interaction Check"</h2>
                        <button
                            on:click=move |_| interactions.set(None)
                            class="text-gray-400 hover:text-white"
                        >
                            "✕"
                        </button>
                    </div>
                    {body}
                </section>
            }
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Add form; the number of time inputs follows the chosen frequency
#[component]
fn MedicationForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    let name = create_rw_signal(String::new());
    let amount = create_rw_signal(String::new());
    let unit = create_rw_signal("mg".to_string());
    let form = create_rw_signal("tablet".to_string());
    let reason = create_rw_signal(String::new());
    let frequency = create_rw_signal(FREQUENCIES[0].to_string());
    let times = create_rw_signal(vec![String::new()]);
    let days = create_rw_signal(Vec::<String>::new());
    let start = create_rw_signal(today.clone());
    let end = create_rw_signal(String::new());
    let no_end = create_rw_signal(false);
    let notes = create_rw_signal(String::new());
    let refill = create_rw_signal(String::new());
    let submitting = create_rw_signal(false);

    // Keep one time slot per dose of the chosen frequency
    create_effect(move |_| {
        let slots = frequency_slots(&frequency.get());
        times.update(|t| t.resize(slots, String::new()));
    });

    let optional = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let Some(t) = state.token.get_untracked() else {
            return;
        };

        let draft = MedicationDraft {
            name: name.get_untracked(),
            dosage_amount: amount.get_untracked().trim().parse().ok(),
            dosage_unit: unit.get_untracked(),
            form: form.get_untracked(),
            reason: reason.get_untracked(),
            frequency: frequency.get_untracked(),
            times: times.get_untracked(),
            days: if frequency.get_untracked() == "As needed" {
                Vec::new()
            } else {
                days.get_untracked()
            },
            start_date: start.get_untracked(),
            end_date: optional(end.get_untracked()),
            no_end_date: no_end.get_untracked(),
            notes: optional(notes.get_untracked()),
            refill_date: optional(refill.get_untracked()),
        };

        let state = state.clone();
        let today = today.clone();
        submitting.set(true);
        spawn_local(async move {
            match api::create_medication(&t, &draft).await {
                Ok(med) => {
                    state.medications.update(|list| {
                        if !list.iter().any(|m| m.id == med.id) {
                            list.push(med.clone());
                        }
                    });
                    state.show_success(&format!("Added {}", med.name));
                    for field in [name, amount, reason, end, notes, refill] {
                        field.set(String::new());
                    }
                    start.set(today);
                    no_end.set(false);
                    days.set(Vec::new());
                }
                Err(e) => state.show_error(&e),
            }
            submitting.set(false);
        });
    };

    let input_class = "w-full bg-gray-700 rounded-lg px-3 py-2 border border-gray-600";

    view! {
        <form on:submit=on_submit class="space-y-3">
            <TextField label="Name" value=name />
            <div class="grid grid-cols-3 gap-2">
                <TextField label="Dosage" value=amount />
                <SelectField label="Unit" value=unit options=&UNITS />
                <SelectField label="Form" value=form options=&FORMS />
            </div>
            <TextField label="Reason" value=reason />
            <SelectField label="Frequency" value=frequency options=&FREQUENCIES />

            {move || {
                let count = frequency_slots(&frequency.get());
                (0..count)
                    .map(|i| view! {
                        <div>
                            <label class="block text-sm text-gray-400 mb-1">{format!("Time {}", i + 1)}</label>
                            <input
                                type="time"
                                prop:value=move || times.with(|t| t.get(i).cloned().unwrap_or_default())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    times.update(|t| {
                                        if let Some(slot) = t.get_mut(i) {
                                            *slot = value;
                                        }
                                    });
                                }
                                class=input_class
                            />
                        </div>
                    })
                    .collect_view()
            }}

            <Show when=move || frequency.get() != "As needed">
                <DayPicker days=days />
            </Show>

            <div class="grid grid-cols-2 gap-2">
                <DateField label="Start date" value=start />
                <Show
                    when=move || !no_end.get()
                    fallback=|| view! { <div /> }
                >
                    <DateField label="End date" value=end />
                </Show>
            </div>
            <label class="flex items-center space-x-2 text-sm text-gray-300">
                <input
                    type="checkbox"
                    prop:checked=move || no_end.get()
                    on:change=move |ev| no_end.set(event_target_checked(&ev))
                />
                <span>"No end date"</span>
            </label>
            <DateField label="Refill date" value=refill />
            <div>
                <label class="block text-sm text-gray-400 mb-1">"Notes"</label>
                <textarea
                    prop:value=move || notes.get()
                    on:input=move |ev| notes.set(event_target_value(&ev))
                    class=input_class
                />
            </div>

            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600 rounded-lg py-3 font-semibold"
            >
                {move || if submitting.get() { "Saving..." } else { "Add Medication" }}
            </button>
        </form>
    }
}

/// Weekday toggles; none selected means every day
#[component]
fn DayPicker(days: RwSignal<Vec<String>>) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-400 mb-1">"Days (leave empty for every day)"</label>
            <div class="flex flex-wrap gap-1">
                {WEEKDAYS
                    .iter()
                    .map(|&day| {
                        let selected = move || days.with(|d| d.iter().any(|x| x == day));
                        view! {
                            <button
                                type="button"
                                on:click=move |_| days.update(|d| {
                                    if let Some(pos) = d.iter().position(|x| x == day) {
                                        d.remove(pos);
                                    } else {
                                        d.push(day.to_string());
                                    }
                                })
                                class=move || if selected() {
                                    "px-2 py-1 text-sm rounded bg-blue-600"
                                } else {
                                    "px-2 py-1 text-sm rounded bg-gray-700 hover:bg-gray-600"
                                }
                            >
                                {day}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

#[component]
fn TextField(label: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-400 mb-1">{label}</label>
            <input
                type="text"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-3 py-2 border border-gray-600"
            />
        </div>
    }
}

#[component]
fn DateField(label: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-400 mb-1">{label}</label>
            <input
                type="date"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-3 py-2 border border-gray-600"
            />
        </div>
    }
}

#[component]
fn SelectField(
    label: &'static str,
    value: RwSignal<String>,
    options: &'static [&'static str],
) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-400 mb-1">{label}</label>
            <select
                on:change=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
                class="w-full bg-gray-700 rounded-lg px-3 py-2 border border-gray-600"
            >
                {options
                    .iter()
                    .map(|o| view! { <option value=*o>{*o}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}
