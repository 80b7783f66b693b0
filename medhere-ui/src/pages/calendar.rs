//! Calendar Page
//!
//! Day, week and month views of the dose schedule, one colour per medication.

use std::collections::HashMap;

use leptos::*;

use crate::api::{self, CalendarDay, CalendarPage};
use crate::components::Loading;
use crate::state::global::{Dose, DoseStatus, GlobalState};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Calendar page component
#[component]
pub fn Calendar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let token = state.token;
    let medications = state.medications;

    let view_mode = create_rw_signal("month".to_string());
    // None means today
    let anchor = create_rw_signal(None::<String>);
    let page = create_rw_signal(None::<CalendarPage>);

    create_effect(move |_| {
        let mode = view_mode.get();
        let date = anchor.get();
        medications.with(|_| ());
        let Some(t) = token.get_untracked() else {
            return;
        };
        let state = state.clone();
        spawn_local(async move {
            match api::fetch_calendar(&t, &mode, date.as_deref()).await {
                Ok(p) => page.set(Some(p)),
                Err(e) => state.show_error(&e),
            }
        });
    });

    let step = move |forward: bool| {
        if let Some(p) = page.get_untracked() {
            anchor.set(Some(if forward { p.next } else { p.previous }));
        }
    };

    view! {
        <div class="space-y-6">
            <div class="flex flex-wrap items-center justify-between gap-4">
                <h1 class="text-3xl font-bold">
                    {move || page.with(|p| p.as_ref().map(|p| p.title.clone()).unwrap_or_default())}
                </h1>
                <div class="flex space-x-2">
                    {["day", "week", "month"]
                        .into_iter()
                        .map(|mode| view! {
                            <button
                                on:click=move |_| view_mode.set(mode.to_string())
                                class=move || if view_mode.get() == mode {
                                    "px-3 py-1 rounded-lg bg-blue-600"
                                } else {
                                    "px-3 py-1 rounded-lg bg-gray-700 hover:bg-gray-600"
                                }
                            >
                                {capitalize(mode)}
                            </button>
                        })
                        .collect_view()}
                </div>
                <div class="flex space-x-2">
                    <button on:click=move |_| step(false) class="px-3 py-1 rounded-lg bg-gray-700 hover:bg-gray-600">
                        "‹ Prev"
                    </button>
                    <button on:click=move |_| anchor.set(None) class="px-3 py-1 rounded-lg bg-gray-700 hover:bg-gray-600">
                        "Today"
                    </button>
                    <button on:click=move |_| step(true) class="px-3 py-1 rounded-lg bg-gray-700 hover:bg-gray-600">
                        "Next ›"
                    </button>
                </div>
            </div>

            {move || match page.get() {
                None => view! { <Loading /> }.into_view(),
                Some(p) => view! { <CalendarBody page=p /> }.into_view(),
            }}
        </div>
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[component]
fn CalendarBody(page: CalendarPage) -> impl IntoView {
    let colors: HashMap<String, String> = page
        .legend
        .iter()
        .map(|l| (l.name.clone(), l.color.clone()))
        .collect();

    let grid = match page.view.as_str() {
        "month" => {
            let blanks = (0..page.leading_blanks).map(|_| view! { <div /> }).collect_view();
            let cells = page
                .days
                .into_iter()
                .map(|day| view! { <DayCell day=day colors=colors.clone() compact=true /> })
                .collect_view();
            view! {
                <div class="grid grid-cols-7 gap-1">
                    {WEEKDAYS
                        .iter()
                        .map(|w| view! { <div class="text-center text-sm text-gray-400 py-1">{*w}</div> })
                        .collect_view()}
                    {blanks}
                    {cells}
                </div>
            }
            .into_view()
        }
        "week" => view! {
            <div class="grid grid-cols-7 gap-2">
                {page
                    .days
                    .into_iter()
                    .map(|day| view! { <DayCell day=day colors=colors.clone() compact=false /> })
                    .collect_view()}
            </div>
        }
        .into_view(),
        _ => page
            .days
            .into_iter()
            .map(|day| view! { <DayCell day=day colors=colors.clone() compact=false /> })
            .collect_view(),
    };

    view! {
        {grid}
        <div class="flex flex-wrap gap-4 mt-4">
            {page
                .legend
                .into_iter()
                .map(|l| view! {
                    <div class="flex items-center space-x-2 text-sm">
                        <span class="w-3 h-3 rounded-full inline-block" style=format!("background: {}", l.color) />
                        <span>{l.name}</span>
                    </div>
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn DayCell(day: CalendarDay, colors: HashMap<String, String>, compact: bool) -> impl IntoView {
    let border = if day.is_today { "border-blue-500" } else { "border-gray-700" };
    let label = if compact {
        day.date.rsplit('-').next().unwrap_or_default().trim_start_matches('0').to_string()
    } else {
        format!("{} {}", day.weekday, day.date)
    };

    view! {
        <div class=format!("bg-gray-800 rounded-lg p-2 min-h-24 border {}", border)>
            <div class="text-sm text-gray-400 mb-1">{label}</div>
            {day
                .doses
                .into_iter()
                .map(|dose| view! { <DoseChip dose=dose colors=colors.clone() compact=compact /> })
                .collect_view()}
        </div>
    }
}

#[component]
fn DoseChip(dose: Dose, colors: HashMap<String, String>, compact: bool) -> impl IntoView {
    let color = colors.get(&dose.name).cloned().unwrap_or_else(|| "#6b7280".to_string());
    let when = dose.time_label.clone().unwrap_or_else(|| "as needed".to_string());
    let text = if compact {
        dose.name.clone()
    } else {
        format!("{} {} · {}", dose.name, dose.dosage, when)
    };
    let marker = match dose.status {
        DoseStatus::Taken => "✓ ",
        DoseStatus::Missed => "! ",
        _ => "",
    };

    view! {
        <div
            class="text-xs rounded px-1 py-0.5 mb-1 truncate text-white"
            style=format!("background: {}", color)
            title=format!("{} {} {}", dose.name, dose.dosage, when)
        >
            {format!("{}{}", marker, text)}
        </div>
    }
}
