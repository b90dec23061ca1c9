//! Outbound UI events.
//!
//! The wizard never talks to a view directly; it pushes named JSON payloads
//! into an [`EventSink`] owned by whatever shell hosts it.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

pub const STATE_CHANGED: &str = "wizard-state-changed";
pub const ELAPSED: &str = "wizard-elapsed";
pub const UPLOAD_PROGRESS: &str = "wizard-upload-progress";
pub const ALERT: &str = "wizard-alert";
pub const NAVIGATE: &str = "wizard-navigate";

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// Serialize `payload` and hand it to `sink`, dropping it if it cannot be encoded.
pub fn emit_json<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit(event, value),
        Err(err) => log::error!("failed to encode {event} payload: {err}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiEvent {
    pub name: String,
    pub payload: Value,
}

/// Sink forwarding every event over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: Value) {
        // Receiver gone means the shell was torn down.
        let _ = self.tx.send(UiEvent {
            name: event.to_string(),
            payload,
        });
    }
}
