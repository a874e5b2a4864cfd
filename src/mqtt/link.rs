use crate::protocol::encode::Command;

/// What the UI asks of the transport task.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRequest {
    /// Open a broker session for this operator. The username picks the
    /// device namespace `student/<org>/<username>`.
    Connect { username: String },
    /// Tear the current session down.
    Disconnect,
    /// Encode and publish an operator command. Fire-and-forget; a
    /// delivery failure is logged, never retried.
    Publish(Command),
}

/// What the transport task reports back. Delivered over a single
/// channel so the session projector sees everything in wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// Session established and subscriptions placed.
    Connected,
    /// Session ended, whether requested or dropped.
    Disconnected,
    /// An inbound publish from the device namespace.
    Message { topic: String, payload: String },
    /// A transport failure the operator should see.
    Error(String),
}
