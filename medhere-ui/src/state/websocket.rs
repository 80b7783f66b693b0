//! WebSocket Client
//!
//! Live medication list updates from the MedHere API.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::global::{GlobalState, Medication};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const KEEPALIVE_MS: u32 = 25_000;

/// WebSocket message types from server
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected {
        connection_id: String,
        user_id: String,
    },
    Medications {
        #[serde(default)]
        change: Option<serde_json::Value>,
        medications: Vec<Medication>,
    },
    Pong,
    SessionEnded,
    Error {
        message: String,
    },
}

/// WebSocket client message types
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// WebSocket client for live updates
#[derive(Clone)]
pub struct WebSocketClient {
    ws: Rc<RefCell<Option<WebSocket>>>,
    url: String,
    reconnect_attempts: Rc<RefCell<u32>>,
    /// Set on explicit close so the close handler does not reconnect
    closed: Rc<RefCell<bool>>,
    keepalive: Rc<RefCell<Option<gloo_timers::callback::Interval>>>,
}

impl WebSocketClient {
    /// Create a new WebSocket client
    pub fn new(url: &str) -> Self {
        Self {
            ws: Rc::new(RefCell::new(None)),
            url: url.to_string(),
            reconnect_attempts: Rc::new(RefCell::new(0)),
            closed: Rc::new(RefCell::new(false)),
            keepalive: Rc::new(RefCell::new(None)),
        }
    }

    /// Connect to the WebSocket server
    pub fn connect(&self, state: GlobalState) {
        match WebSocket::new(&self.url) {
            Ok(ws) => {
                self.setup_handlers(&ws, state);
                *self.ws.borrow_mut() = Some(ws);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
                self.schedule_reconnect(state);
            }
        }
    }

    /// Set up WebSocket event handlers
    fn setup_handlers(&self, ws: &WebSocket, state: GlobalState) {
        // On open
        let state_clone = state.clone();
        let client = self.clone();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            web_sys::console::log_1(&"WebSocket connected".into());
            state_clone.ws_connected.set(true);
            *client.reconnect_attempts.borrow_mut() = 0;

            let pinger = client.clone();
            let interval = gloo_timers::callback::Interval::new(KEEPALIVE_MS, move || {
                let _ = pinger.send(&ClientMessage::Ping);
            });
            *client.keepalive.borrow_mut() = Some(interval);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        // On message
        let state_clone = state.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                let text_str: String = text.into();
                handle_message(&text_str, &state_clone);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        // On close
        let state_clone = state.clone();
        let client = self.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(
                &format!("WebSocket closed: code={}, reason={}", event.code(), event.reason()).into(),
            );
            state_clone.ws_connected.set(false);
            client.keepalive.borrow_mut().take();

            if !*client.closed.borrow() {
                client.schedule_reconnect(state_clone.clone());
            }
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        // On error
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }

    /// Schedule a reconnect attempt with exponential backoff
    fn schedule_reconnect(&self, state: GlobalState) {
        let attempts = *self.reconnect_attempts.borrow();
        if attempts >= MAX_RECONNECT_ATTEMPTS {
            web_sys::console::error_1(&"Max reconnect attempts reached".into());
            return;
        }

        let delay = (2_u32.pow(attempts) * 1000).min(30000);
        *self.reconnect_attempts.borrow_mut() = attempts + 1;

        let client = self.clone();
        gloo_timers::callback::Timeout::new(delay, move || {
            if *client.closed.borrow() {
                return;
            }
            web_sys::console::log_1(
                &format!("Attempting reconnect (attempt {})", client.reconnect_attempts.borrow()).into(),
            );
            client.connect(state);
        })
        .forget();
    }

    /// Send a message to the server
    pub fn send(&self, message: &ClientMessage) -> Result<(), String> {
        let ws_guard = self.ws.borrow();
        let ws = ws_guard.as_ref().ok_or("WebSocket not connected")?;

        let json = serde_json::to_string(message).map_err(|e| e.to_string())?;
        ws.send_with_str(&json).map_err(|e| format!("{:?}", e))
    }

    /// Close the connection for good
    pub fn close(&self) {
        *self.closed.borrow_mut() = true;
        self.keepalive.borrow_mut().take();
        if let Some(ws) = self.ws.borrow().as_ref() {
            let _ = ws.close();
        }
    }
}

/// Handle incoming WebSocket message
fn handle_message(text: &str, state: &GlobalState) {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Connected { connection_id, user_id }) => {
            web_sys::console::log_1(
                &format!("Connected with ID: {} as user {}", connection_id, user_id).into(),
            );
        }
        Ok(WsMessage::Medications { change, medications }) => {
            if let Some(change) = change {
                web_sys::console::log_1(&format!("Medication list changed: {}", change).into());
            }
            state.set_medications(medications);
        }
        Ok(WsMessage::Pong) => {
            // Connection alive
        }
        Ok(WsMessage::SessionEnded) => {
            state.end_session();
            state.show_error("Your session has ended. Please log in again.");
        }
        Ok(WsMessage::Error { message }) => {
            web_sys::console::error_1(&format!("Server error: {}", message).into());
            state.show_error(&message);
        }
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to parse WebSocket message: {}", e).into());
        }
    }
}

/// Open the live feed for a session token
pub fn connect_websocket(state: GlobalState, api_base: &str, token: &str) -> WebSocketClient {
    // api_base already ends in /api
    let ws_base = api_base.replace("http://", "ws://").replace("https://", "wss://");
    let ws_url = format!("{}/ws?token={}", ws_base, urlencoding::encode(token));

    let client = WebSocketClient::new(&ws_url);
    client.connect(state);
    client
}
