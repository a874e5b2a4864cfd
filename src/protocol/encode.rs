//! Operator intent -> wire message encoding.
//!
//! The inverse of the decoders, with one asymmetry worth calling out:
//! retention is decided per topic. Status, mode and controller are
//! published retained so the device sees last-known-good state after a
//! reconnect; debug pulses and info requests are transient and would be
//! wrong to replay, so they go out unretained.

use thiserror::Error;

use super::decode::normalize_color;
use crate::topics::suffix;

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("invalid color for debug override: {0:?}")]
    InvalidColor(String),
}

/// An operator intent, produced by the UI and encoded for publish.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetPower(bool),
    SetMode(String),
    SetController(String),
    DebugColor { index: usize, color: String },
    DebugBrightness { index: usize, brightness: u32 },
    ClearDebug,
    /// Automatic post-subscribe ask for the device's whole info set.
    RequestInfo,
    /// Operator-initiated ask for the same, on its own channel.
    RefreshInfo,
}

/// A fully encoded publish, still relative to the session topic base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub suffix: &'static str,
    pub payload: String,
    pub retained: bool,
}

/// Encodes a command. Validation happens here, before anything touches
/// the wire; a malformed intent produces no partial publish.
pub fn encode(command: &Command) -> Result<OutboundMessage, EncodeError> {
    let message = match command {
        Command::SetPower(on) => OutboundMessage {
            suffix: suffix::STATUS,
            payload: if *on { "on" } else { "off" }.to_string(),
            retained: true,
        },
        Command::SetMode(mode) => OutboundMessage {
            suffix: suffix::MODE,
            payload: mode.clone(),
            retained: true,
        },
        Command::SetController(controller) => OutboundMessage {
            suffix: suffix::CONTROLLER,
            payload: controller.clone(),
            retained: true,
        },
        Command::DebugColor { index, color } => {
            let color = normalize_color(color)
                .map_err(|_| EncodeError::InvalidColor(color.clone()))?;
            OutboundMessage {
                suffix: suffix::DEBUG_COLOR,
                payload: format!("{}:{}", index, color),
                retained: false,
            }
        }
        Command::DebugBrightness { index, brightness } => OutboundMessage {
            suffix: suffix::DEBUG_BRIGHTNESS,
            payload: format!("{}:{}", index, brightness),
            retained: false,
        },
        Command::ClearDebug => OutboundMessage {
            suffix: suffix::DEBUG_INDEX,
            payload: "clear".to_string(),
            retained: false,
        },
        Command::RequestInfo => OutboundMessage {
            suffix: suffix::REQUEST,
            payload: "info".to_string(),
            retained: false,
        },
        Command::RefreshInfo => OutboundMessage {
            suffix: suffix::REFRESH,
            payload: "info".to_string(),
            retained: false,
        },
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode::{decode_pixel_brightness, decode_pixel_color, decode_status};

    #[test]
    fn power_commands_are_retained() {
        let on = encode(&Command::SetPower(true)).unwrap();
        assert_eq!(on.suffix, "status");
        assert_eq!(on.payload, "on");
        assert!(on.retained);
        assert!(decode_status(&on.payload));

        let off = encode(&Command::SetPower(false)).unwrap();
        assert_eq!(off.payload, "off");
        assert!(!decode_status(&off.payload));
    }

    #[test]
    fn mode_and_controller_are_retained() {
        let mode = encode(&Command::SetMode("music".into())).unwrap();
        assert_eq!((mode.suffix, mode.payload.as_str()), ("mode", "music"));
        assert!(mode.retained);

        let ctrl = encode(&Command::SetController("luminaire".into())).unwrap();
        assert_eq!(ctrl.suffix, "controller");
        assert!(ctrl.retained);
    }

    #[test]
    fn debug_color_round_trips() {
        let msg = encode(&Command::DebugColor {
            index: 3,
            color: "#aabbcc".into(),
        })
        .unwrap();
        assert_eq!(msg.payload, "3:#AABBCC");
        assert!(!msg.retained);

        let decoded = decode_pixel_color(&msg.payload).unwrap();
        assert_eq!(decoded.index, 3);
        assert_eq!(decoded.color, "#AABBCC");
    }

    #[test]
    fn debug_brightness_round_trips() {
        let msg = encode(&Command::DebugBrightness {
            index: 7,
            brightness: 200,
        })
        .unwrap();
        assert_eq!(msg.payload, "7:200");
        assert!(!msg.retained);

        let decoded = decode_pixel_brightness(&msg.payload).unwrap();
        assert_eq!(decoded.index, 7);
        assert_eq!(decoded.brightness, 200);
    }

    #[test]
    fn invalid_color_is_rejected_before_publish() {
        let err = encode(&Command::DebugColor {
            index: 0,
            color: "not-a-color".into(),
        });
        assert_eq!(err, Err(EncodeError::InvalidColor("not-a-color".into())));
    }

    #[test]
    fn transient_commands_are_not_retained() {
        assert!(!encode(&Command::ClearDebug).unwrap().retained);
        let req = encode(&Command::RequestInfo).unwrap();
        assert!(!req.retained);
        assert_eq!((req.suffix, req.payload.as_str()), ("request", "info"));
    }

    #[test]
    fn info_asks_use_distinct_suffixes() {
        // The automatic post-subscribe ask and the operator refresh
        // button publish to separate topics.
        let auto = encode(&Command::RequestInfo).unwrap();
        let manual = encode(&Command::RefreshInfo).unwrap();
        assert_eq!(auto.suffix, "request");
        assert_eq!(manual.suffix, "refresh");
        assert_eq!(manual.payload, "info");
        assert!(!manual.retained);
    }
}
