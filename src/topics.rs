//! Topic namespace and inbound topic classification.
//!
//! Every Aura Light device lives under `student/<org>/<username>`. The
//! suffixes below are the complete wire contract between dashboard and
//! device; [`classify`] maps an incoming topic onto a [`MessageKind`]
//! purely from the topic path, never from the payload.

use std::fmt;

/// Suffixes the dashboard publishes to.
pub mod suffix {
    pub const STATUS: &str = "status";
    pub const MODE: &str = "mode";
    pub const CONTROLLER: &str = "controller";
    pub const DEBUG_COLOR: &str = "debug/color";
    pub const DEBUG_BRIGHTNESS: &str = "debug/brightness";
    pub const DEBUG_INDEX: &str = "debug/index";
    pub const REQUEST: &str = "request";
    pub const REFRESH: &str = "refresh";
}

/// Builds the device namespace root for one operator session.
pub fn topic_base(org: &str, username: &str) -> String {
    format!("student/{}/{}", org, username)
}

/// Joins a suffix onto the namespace root.
pub fn full_topic(base: &str, suffix: &str) -> String {
    format!("{}/{}", base, suffix)
}

/// The five subscription filters covering everything the device publishes.
pub fn subscribe_filters(base: &str) -> Vec<String> {
    vec![
        format!("{}/status", base),
        format!("{}/mode", base),
        format!("{}/controller", base),
        format!("{}/debug/#", base),
        format!("{}/info/#", base),
    ]
}

/// Semantic kind of an inbound message, derived from its topic path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// `<base>/status` - light on/off.
    Status,
    /// `<base>/mode` - active lighting mode token.
    Mode,
    /// `<base>/controller`, or the device-reported `<base>/info/controller`.
    Controller,
    /// `<base>/debug/color` - per-pixel color override.
    DebugColor,
    /// `<base>/debug/brightness` - per-pixel brightness override.
    DebugBrightness,
    /// `<base>/debug/index` - debug control channel (`clear`).
    DebugIndex,
    /// Any other `debug/` topic. Marks debug active but carries no data.
    DebugGeneric,
    /// `<base>/info/audio/data` - telemetry frame.
    AudioData,
    /// `<base>/info/audio/volume_range` - dB calibration range.
    AudioVolumeRange,
    /// `<base>/info/weather` - JSON weather report.
    Weather,
    /// `<base>/info/<category>/<field>` - device info field.
    InfoField { category: String, field: String },
    /// No classification matched. Dropped by the session, logged only.
    Unknown,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MessageKind::Status => write!(f, "status"),
            MessageKind::Mode => write!(f, "mode"),
            MessageKind::Controller => write!(f, "controller"),
            MessageKind::DebugColor => write!(f, "debug/color"),
            MessageKind::DebugBrightness => write!(f, "debug/brightness"),
            MessageKind::DebugIndex => write!(f, "debug/index"),
            MessageKind::DebugGeneric => write!(f, "debug"),
            MessageKind::AudioData => write!(f, "audio/data"),
            MessageKind::AudioVolumeRange => write!(f, "audio/volume_range"),
            MessageKind::Weather => write!(f, "weather"),
            MessageKind::InfoField { category, field } => {
                write!(f, "info/{}/{}", category, field)
            }
            MessageKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifies a topic into exactly one [`MessageKind`].
///
/// First match wins, and the order matters: `/info/audio/` topics also
/// contain `/info/`, so the audio branch has to be tested before the
/// generic info branch or telemetry frames would be misread as info
/// fields. Content of the payload plays no part here.
pub fn classify(topic: &str) -> MessageKind {
    if topic.ends_with("/status") {
        return MessageKind::Status;
    }
    if topic.ends_with("/mode") {
        return MessageKind::Mode;
    }
    if topic.ends_with("/controller") {
        return MessageKind::Controller;
    }
    if topic.contains("/debug/") {
        if topic.ends_with("/debug/color") {
            return MessageKind::DebugColor;
        }
        if topic.ends_with("/debug/brightness") {
            return MessageKind::DebugBrightness;
        }
        if topic.ends_with("/debug/index") {
            return MessageKind::DebugIndex;
        }
        return MessageKind::DebugGeneric;
    }
    // Audio lives under info/ but carries telemetry, not info fields.
    if topic.contains("/info/audio/") {
        if topic.ends_with("/info/audio/data") {
            return MessageKind::AudioData;
        }
        if topic.ends_with("/info/audio/volume_range") {
            return MessageKind::AudioVolumeRange;
        }
        return MessageKind::Unknown;
    }
    if topic.contains("/info/") {
        if topic.ends_with("/info/weather") {
            return MessageKind::Weather;
        }
        let mut parts = topic.rsplit('/');
        let field = parts.next().unwrap_or_default();
        let category = parts.next().unwrap_or_default();
        if category.is_empty() || field.is_empty() {
            return MessageKind::Unknown;
        }
        return MessageKind::InfoField {
            category: category.to_string(),
            field: field.to_string(),
        };
    }
    MessageKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "student/CASA0014/alice";

    fn t(suffix: &str) -> String {
        format!("{}/{}", BASE, suffix)
    }

    #[test]
    fn classifies_control_topics() {
        assert_eq!(classify(&t("status")), MessageKind::Status);
        assert_eq!(classify(&t("mode")), MessageKind::Mode);
        assert_eq!(classify(&t("controller")), MessageKind::Controller);
    }

    #[test]
    fn classifies_debug_topics() {
        assert_eq!(classify(&t("debug/color")), MessageKind::DebugColor);
        assert_eq!(
            classify(&t("debug/brightness")),
            MessageKind::DebugBrightness
        );
        assert_eq!(classify(&t("debug/index")), MessageKind::DebugIndex);
        assert_eq!(classify(&t("debug/whatever")), MessageKind::DebugGeneric);
    }

    #[test]
    fn audio_wins_over_generic_info() {
        // Contains both /info/ and /info/audio/; must route as audio.
        assert_eq!(classify(&t("info/audio/data")), MessageKind::AudioData);
        assert_eq!(
            classify(&t("info/audio/volume_range")),
            MessageKind::AudioVolumeRange
        );
    }

    #[test]
    fn classifies_info_fields() {
        assert_eq!(
            classify(&t("info/wifi/ssid")),
            MessageKind::InfoField {
                category: "wifi".into(),
                field: "ssid".into()
            }
        );
        assert_eq!(
            classify(&t("info/lighter/number")),
            MessageKind::InfoField {
                category: "lighter".into(),
                field: "number".into()
            }
        );
        assert_eq!(classify(&t("info/weather")), MessageKind::Weather);
    }

    #[test]
    fn device_reported_controller_is_a_controller_update() {
        // The /controller suffix check already catches the info alias.
        assert_eq!(classify(&t("info/controller")), MessageKind::Controller);
    }

    #[test]
    fn unmatched_topics_are_unknown() {
        assert_eq!(classify(&t("something/else")), MessageKind::Unknown);
        assert_eq!(classify("completely/unrelated"), MessageKind::Unknown);
    }

    #[test]
    fn classification_is_deterministic() {
        for suffix in ["status", "debug/color", "info/audio/data", "info/wifi/ip"] {
            let topic = t(suffix);
            assert_eq!(classify(&topic), classify(&topic));
        }
    }

    #[test]
    fn subscribe_filters_cover_the_namespace() {
        let filters = subscribe_filters(BASE);
        assert_eq!(filters.len(), 5);
        assert!(filters.contains(&format!("{}/debug/#", BASE)));
        assert!(filters.contains(&format!("{}/info/#", BASE)));
    }

    #[test]
    fn builds_full_topics() {
        let base = topic_base("CASA0014", "alice");
        assert_eq!(base, BASE);
        assert_eq!(
            full_topic(&base, suffix::DEBUG_COLOR),
            format!("{}/debug/color", BASE)
        );
    }
}
