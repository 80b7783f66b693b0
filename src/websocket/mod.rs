//! WebSocket Medication Feed
//!
//! Pushes the logged-in user's medication list to connected clients whenever
//! it changes, so every open page stays current without polling.
//!
//! ## Architecture
//!
//! - **Handler**: Upgrades the connection and bridges the store's change feed
//! - **Messages**: Client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser (headers cannot be set on upgrades, so the token goes in the query)
//! const ws = new WebSocket('ws://localhost:8082/api/ws?token=' + token);
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'medications') render(msg.medications);
//! };
//!
//! ws.send(JSON.stringify({type: 'refresh'}));
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};
