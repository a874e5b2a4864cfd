//! # MQTT Transport Module
//!
//! The transport side of the dashboard: a background tokio task wrapping
//! a rumqttc [`AsyncClient`](rumqttc::AsyncClient) that owns the broker
//! connection for one operator session.
//!
//! The rest of the application never touches rumqttc. The UI sends
//! [`link::LinkRequest`]s (connect, disconnect, publish a command) over
//! an mpsc channel and receives [`link::LinkEvent`]s (connected,
//! disconnected, inbound message, transport error) back. All state
//! projection happens on the UI side, strictly in delivery order; this
//! module only moves bytes and reports lifecycle.
//!
//! ```text
//! mqtt/
//! ├── config.rs  - broker connection settings
//! ├── link.rs    - request/event types crossing the channel boundary
//! └── handler.rs - connection lifecycle and the rumqttc event loop
//! ```

pub mod config;
pub mod handler;
pub mod link;
