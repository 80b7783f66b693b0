//! API Access
//!
//! HTTP client for the MedHere REST API.

pub mod client;

pub use client::*;
