//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use super::messages::{ClientMessage, ServerMessage};
use crate::api::auth::AuthUser;
use crate::api::dto::MedicationView;
use crate::api::AppState;
use crate::schedule::Medication;
use crate::storage::{ChangeKind, MedicationChange};

/// WebSocket upgrade handler
///
/// Only authenticated users can connect; each connection sees only its own
/// user's changes and lives no longer than the session that opened it.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth.user.id, auth.token))
}

fn medications_message(change: Option<ChangeKind>, meds: Vec<Medication>) -> ServerMessage {
    ServerMessage::Medications {
        change,
        medications: meds.into_iter().map(MedicationView::from).collect(),
    }
}

async fn snapshot(state: &AppState, user_id: &str) -> ServerMessage {
    match state.store.list(user_id).await {
        Ok(meds) => medications_message(None, meds),
        Err(e) => ServerMessage::Error {
            message: e.to_string(),
        },
    }
}

/// What the change feed does with one event from the store
#[derive(Debug)]
enum FeedAction {
    /// Send this message to the client
    Forward(ServerMessage),
    /// Someone else's change
    Skip,
    /// Events were dropped; the client needs a fresh list
    Resync(u64),
    /// The store shut down
    Stop,
}

fn feed_action(
    user_id: &str,
    event: Result<MedicationChange, broadcast::error::RecvError>,
) -> FeedAction {
    match event {
        Ok(MedicationChange {
            user_id: owner,
            change,
            medications,
        }) if owner == user_id => FeedAction::Forward(medications_message(Some(change), medications)),
        Ok(_) => FeedAction::Skip,
        Err(broadcast::error::RecvError::Lagged(skipped)) => FeedAction::Resync(skipped),
        Err(broadcast::error::RecvError::Closed) => FeedAction::Stop,
    }
}

/// Whether the token that opened the connection is still logged in
async fn session_alive(state: &AppState, token: &str) -> bool {
    state.sessions.current_user(token).await.is_ok()
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: String, token: String) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    // Subscribe before the snapshot so no change slips between them
    let mut changes = state.store.subscribe();

    // Channel for everything bound for this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let _ = tx.send(ServerMessage::Connected {
        connection_id: connection_id.clone(),
        user_id: user_id.clone(),
    });
    let _ = tx.send(snapshot(&state, &user_id).await);

    tracing::info!(connection_id = %connection_id, user_id = %user_id, "WebSocket connected");

    let conn_id_for_send = connection_id.clone();

    // Task to forward messages from channel to WebSocket; it ends once every
    // producer has dropped its sender and the queue is drained
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.to_json())).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    let feed_tx = tx.clone();
    let feed_state = Arc::clone(&state);
    let feed_user = user_id.clone();
    let feed_token = token.clone();
    let conn_id_for_feed = connection_id.clone();

    // Task to forward this user's store changes
    let mut feed_task = tokio::spawn(async move {
        loop {
            let msg = match feed_action(&feed_user, changes.recv().await) {
                FeedAction::Forward(msg) => msg,
                FeedAction::Skip => continue,
                FeedAction::Resync(skipped) => {
                    tracing::warn!(user_id = %feed_user, skipped, "Change feed lagged, resending list");
                    snapshot(&feed_state, &feed_user).await
                }
                FeedAction::Stop => break,
            };
            if !session_alive(&feed_state, &feed_token).await {
                tracing::info!(connection_id = %conn_id_for_feed, "Session ended, closing WebSocket");
                let _ = feed_tx.send(ServerMessage::SessionEnded);
                break;
            }
            if feed_tx.send(msg).is_err() {
                break;
            }
        }
    });

    let recv_state = Arc::clone(&state);
    let recv_user = user_id.clone();
    let conn_id_for_recv = connection_id.clone();

    // Task to receive messages from WebSocket and handle them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if matches!(msg, Message::Text(_)) && !session_alive(&recv_state, &token).await {
                        tracing::info!(connection_id = %conn_id_for_recv, "Session ended, closing WebSocket");
                        let _ = tx.send(ServerMessage::SessionEnded);
                        break;
                    }
                    match handle_ws_message(&recv_state, &recv_user, &conn_id_for_recv, msg).await {
                        Some(reply) => {
                            if tx.send(reply).is_err() {
                                break;
                            }
                        }
                        None => continue,
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for any task to complete, then stop the other producer and let
    // the sender flush what is queued
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            feed_task.abort();
        }
        _ = &mut recv_task => {
            feed_task.abort();
            let _ = (&mut send_task).await;
        }
        _ = &mut feed_task => {
            recv_task.abort();
            let _ = (&mut send_task).await;
        }
    }

    tracing::info!(connection_id = %connection_id, user_id = %user_id, "WebSocket disconnected");
}

/// Handle a received WebSocket message, returning the reply to send
///
/// A close frame ends the receive loop by making the stream finish, so it
/// needs no reply.
async fn handle_ws_message(
    state: &AppState,
    user_id: &str,
    connection_id: &str,
    message: Message,
) -> Option<ServerMessage> {
    match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Refresh) => Some(snapshot(state, user_id).await),
            Ok(ClientMessage::Ping) => Some(ServerMessage::Pong),
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    error = %e,
                    text = %text,
                    "Invalid client message"
                );
                // Reply with an error but keep the connection open
                Some(ServerMessage::Error {
                    message: format!("Invalid message format: {}", e),
                })
            }
        },
        Message::Binary(_) => Some(ServerMessage::Error {
            message: "Binary messages not supported".to_string(),
        }),
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => None,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            None
        }
    }
}
