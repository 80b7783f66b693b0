//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! browser clients and the MedHere server.

use serde::{Deserialize, Serialize};

use crate::api::dto::MedicationView;
use crate::storage::ChangeKind;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the current list again
    Refresh,
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
        user_id: String,
    },
    /// The user's full medication list
    Medications {
        /// What changed; absent for snapshots
        #[serde(skip_serializing_if = "Option::is_none")]
        change: Option<ChangeKind>,
        medications: Vec<MedicationView>,
    },
    /// Pong response to ping
    Pong,
    /// The session behind this connection was logged out or expired; the
    /// socket closes after this message
    SessionEnded,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    /// Serialize for the wire
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"serialization failed: {}"}}"#, e)
        })
    }
}
