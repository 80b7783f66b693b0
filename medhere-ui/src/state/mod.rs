//! State Management
//!
//! Global application state and WebSocket connection management.

pub mod global;
pub mod websocket;

pub use global::{provide_global_state, Dose, DoseStatus, DoseSummary, GlobalState, Medication, User};
pub use websocket::{connect_websocket, WebSocketClient};
