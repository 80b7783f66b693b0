//! MedHere Web App
//!
//! Medication reminder frontend built with Leptos (WASM).
//!
//! # Features
//!
//! - Login with a listed user
//! - Medication list with add, delete and interaction check
//! - Dashboard of today's doses with check-off toggles
//! - Day, week and month calendar
//! - WebSocket live updates of the medication list
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It communicates with the MedHere API via HTTP and WebSocket.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
