//! Device state model and projector.
//!
//! A [`Session`] owns exactly one [`DeviceState`] and is the only writer
//! to it; the UI holds a read reference and renders from it each frame.
//! Inbound messages and local command echoes both funnel through
//! [`Session::handle_message`] / [`Session::apply_echo`], so every
//! invariant (pixel bounds, derived pixel count, color validity) is
//! enforced in one place. Every projection is idempotent: retained
//! messages and reconnect replays routinely deliver duplicates, and
//! applying the same message twice must land on the same state.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::protocol::decode::{
    decode_audio_frame, decode_debug_clear, decode_pixel_brightness, decode_pixel_color,
    decode_status, decode_token, decode_volume_range, normalize_color,
};
use crate::protocol::encode::Command;
use crate::protocol::weather::{decode_weather, WeatherReport};
use crate::topics::{classify, MessageKind};

pub const DEFAULT_PIXEL_COUNT: usize = 8;
pub const LUMINAIRE_PIXEL_COUNT: usize = 72;
pub const DEFAULT_IDLE_COLOR: &str = "#0000FF";
const DEFAULT_CITY: &str = "London";

/// Lighting mode reported by the device. Unrecognized tokens pass
/// through as [`LightMode::Other`] so newer firmware modes still render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightMode {
    #[default]
    Idle,
    Timer,
    Weather,
    Music,
    Other(String),
}

impl LightMode {
    fn from_token(token: &str) -> Self {
        match token {
            "idle" => LightMode::Idle,
            "timer" => LightMode::Timer,
            "weather" => LightMode::Weather,
            "music" => LightMode::Music,
            other => LightMode::Other(other.to_string()),
        }
    }
}

/// Active pixel controller. Luminaire is the shared 72-pixel wall
/// fixture; anything else drives the device's own strip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Controller {
    #[default]
    Local,
    Luminaire,
    Other(String),
}

impl Controller {
    fn from_token(token: &str) -> Self {
        match token {
            "local" => Controller::Local,
            "luminaire" => Controller::Luminaire,
            other => Controller::Other(other.to_string()),
        }
    }
}

/// Typed identifier for a device info field.
///
/// The wire carries `(category, field)` path segments; mapping them onto
/// this enum up front means an unmapped pair is logged once instead of
/// growing an arbitrary string-keyed slot somewhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InfoKey {
    WifiSsid,
    WifiIp,
    WifiRssi,
    WifiMac,
    LighterNumber,
    LighterPin,
    SystemVersion,
    SystemUptime,
    LocationCity,
}

impl InfoKey {
    pub fn from_parts(category: &str, field: &str) -> Option<Self> {
        match (
            category.to_lowercase().as_str(),
            field.to_lowercase().as_str(),
        ) {
            ("wifi", "ssid") => Some(InfoKey::WifiSsid),
            ("wifi", "ip") => Some(InfoKey::WifiIp),
            ("wifi", "rssi") => Some(InfoKey::WifiRssi),
            ("wifi", "mac") => Some(InfoKey::WifiMac),
            ("lighter", "number") => Some(InfoKey::LighterNumber),
            ("lighter", "pin") => Some(InfoKey::LighterPin),
            ("system", "version") => Some(InfoKey::SystemVersion),
            ("system", "uptime") => Some(InfoKey::SystemUptime),
            ("location", "city") => Some(InfoKey::LocationCity),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InfoKey::WifiSsid => "WiFi SSID",
            InfoKey::WifiIp => "IP Address",
            InfoKey::WifiRssi => "WiFi RSSI",
            InfoKey::WifiMac => "MAC Address",
            InfoKey::LighterNumber => "Pixel Count",
            InfoKey::LighterPin => "Data Pin",
            InfoKey::SystemVersion => "Firmware",
            InfoKey::SystemUptime => "Uptime",
            InfoKey::LocationCity => "City",
        }
    }

    pub const ALL: [InfoKey; 9] = [
        InfoKey::WifiSsid,
        InfoKey::WifiIp,
        InfoKey::WifiRssi,
        InfoKey::WifiMac,
        InfoKey::LighterNumber,
        InfoKey::LighterPin,
        InfoKey::SystemVersion,
        InfoKey::SystemUptime,
        InfoKey::LocationCity,
    ];
}

/// Transient per-pixel debug overlay, layered over mode rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelOverride {
    pub color: Option<String>,
    pub brightness: Option<u32>,
}

/// Rolling audio monitor readings. Staleness (no frame for >2 s) is a
/// presentation concern; the projector only records when the last frame
/// arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioMonitor {
    pub raw: i64,
    pub volume_db: f32,
    pub vu_level: u8,
    pub spectrum: Vec<f32>,
    pub min_db: f32,
    pub max_db: f32,
    pub last_update: Option<DateTime<Local>>,
}

impl Default for AudioMonitor {
    fn default() -> Self {
        AudioMonitor {
            raw: 0,
            volume_db: 0.0,
            vu_level: 0,
            spectrum: Vec::new(),
            min_db: 30.0,
            max_db: 120.0,
            last_update: None,
        }
    }
}

/// Snapshot of everything the dashboard knows about the device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub light_on: bool,
    pub mode: LightMode,
    /// Mode token as the device sent it, for display.
    pub mode_label: String,
    pub controller: Controller,
    pub controller_label: String,
    pub pixel_count: usize,
    pub debug_active: bool,
    pub idle_color: String,
    pub info: BTreeMap<InfoKey, String>,
    pub overrides: BTreeMap<usize, PixelOverride>,
    pub audio: AudioMonitor,
}

impl Default for DeviceState {
    fn default() -> Self {
        DeviceState {
            light_on: false,
            mode: LightMode::Idle,
            mode_label: "idle".to_string(),
            controller: Controller::Local,
            controller_label: "local".to_string(),
            pixel_count: DEFAULT_PIXEL_COUNT,
            debug_active: false,
            idle_color: DEFAULT_IDLE_COLOR.to_string(),
            info: BTreeMap::new(),
            overrides: BTreeMap::new(),
            audio: AudioMonitor::default(),
        }
    }
}

/// What a projection changed, for logging and targeted UI reactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Power(bool),
    Mode,
    Controller,
    PixelCount(usize),
    Pixel(usize),
    DebugActive(bool),
    DebugCleared,
    Info(InfoKey),
    /// Valid topic shape but no mapped slot; surfaced, never rendered.
    UnknownInfo { category: String, field: String },
    Audio,
    VolumeRange,
    Weather,
}

/// One operator session against one device namespace.
///
/// Created frozen; [`Session::begin`] on broker connect starts a fresh
/// state, [`Session::freeze`] on disconnect stops accepting projections
/// until the next connect. Transport-level auto-reconnects within a live
/// session do not reset anything; recovery is the broker replaying
/// retained topics through the same idempotent projections.
pub struct Session {
    state: DeviceState,
    weather: Option<WeatherReport>,
    city: String,
    live: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: DeviceState::default(),
            weather: None,
            city: DEFAULT_CITY.to_string(),
            live: false,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn weather(&self) -> Option<&WeatherReport> {
        self.weather.as_ref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Starts a fresh session on broker connect.
    pub fn begin(&mut self) {
        self.state = DeviceState::default();
        self.weather = None;
        self.city = DEFAULT_CITY.to_string();
        self.live = true;
    }

    /// Freezes the session on disconnect. The stale snapshot stays
    /// visible but no further messages are projected onto it.
    pub fn freeze(&mut self) {
        self.live = false;
    }

    /// Replaces the idle color if the literal is a well-formed
    /// `#RRGGBB`; malformed input leaves the previous color untouched.
    pub fn set_idle_color(&mut self, color: &str) -> bool {
        match normalize_color(color) {
            Ok(color) => {
                self.state.idle_color = color;
                true
            }
            Err(e) => {
                debug!(error = %e, "rejected idle color");
                false
            }
        }
    }

    /// Classifies, decodes and projects one inbound message. Decode
    /// failures degrade to a no-op plus a log line, never an error.
    pub fn handle_message(&mut self, topic: &str, payload: &str) -> Vec<StateChange> {
        if !self.live {
            debug!(topic, "session frozen, dropping message");
            return Vec::new();
        }
        let kind = classify(topic);
        if kind == MessageKind::Unknown {
            debug!(topic, "unclassified topic dropped");
            return Vec::new();
        }
        self.apply(&kind, payload)
    }

    /// Projects the local echo of a just-published command so the UI
    /// reflects the intent immediately. The broker's retained echo then
    /// replays the same change as a no-op.
    pub fn apply_echo(&mut self, command: &Command) -> Vec<StateChange> {
        if !self.live {
            return Vec::new();
        }
        match command {
            Command::SetPower(on) => self.apply(
                &MessageKind::Status,
                if *on { "on" } else { "off" },
            ),
            Command::SetMode(mode) => self.apply(&MessageKind::Mode, mode),
            Command::SetController(controller) => {
                self.apply(&MessageKind::Controller, controller)
            }
            Command::DebugColor { index, color } => {
                self.apply(&MessageKind::DebugColor, &format!("{}:{}", index, color))
            }
            Command::DebugBrightness { index, brightness } => self.apply(
                &MessageKind::DebugBrightness,
                &format!("{}:{}", index, brightness),
            ),
            Command::ClearDebug => self.apply(&MessageKind::DebugIndex, "clear"),
            Command::RequestInfo | Command::RefreshInfo => Vec::new(),
        }
    }

    fn apply(&mut self, kind: &MessageKind, payload: &str) -> Vec<StateChange> {
        let mut changes = Vec::new();
        match kind {
            MessageKind::Status => {
                let on = decode_status(payload);
                self.state.light_on = on;
                changes.push(StateChange::Power(on));
            }
            MessageKind::Mode => {
                let (token, display) = decode_token(payload);
                self.state.mode = LightMode::from_token(&token);
                self.state.mode_label = display;
                changes.push(StateChange::Mode);
            }
            MessageKind::Controller => {
                let (token, display) = decode_token(payload);
                self.state.controller = Controller::from_token(&token);
                self.state.controller_label = display;
                changes.push(StateChange::Controller);
                self.recompute_pixel_count(&mut changes);
            }
            MessageKind::DebugColor => {
                self.mark_debug_active(&mut changes);
                match decode_pixel_color(payload) {
                    Ok(rec) => self.apply_override(rec.index, Some(rec.color), None, &mut changes),
                    Err(e) => debug!(payload, error = %e, "debug color ignored"),
                }
            }
            MessageKind::DebugBrightness => {
                self.mark_debug_active(&mut changes);
                match decode_pixel_brightness(payload) {
                    Ok(rec) => {
                        self.apply_override(rec.index, None, Some(rec.brightness), &mut changes)
                    }
                    Err(e) => debug!(payload, error = %e, "debug brightness ignored"),
                }
            }
            MessageKind::DebugIndex => {
                if decode_debug_clear(payload) {
                    self.state.overrides.clear();
                    if self.state.debug_active {
                        self.state.debug_active = false;
                        changes.push(StateChange::DebugActive(false));
                    }
                    changes.push(StateChange::DebugCleared);
                } else {
                    self.mark_debug_active(&mut changes);
                }
            }
            MessageKind::DebugGeneric => {
                self.mark_debug_active(&mut changes);
            }
            MessageKind::AudioData => match decode_audio_frame(payload) {
                Ok(frame) => {
                    let audio = &mut self.state.audio;
                    audio.raw = frame.raw;
                    audio.volume_db = frame.volume_db;
                    audio.vu_level = frame.vu_level;
                    audio.spectrum = frame.spectrum;
                    audio.last_update = Some(Local::now());
                    changes.push(StateChange::Audio);
                }
                Err(e) => debug!(payload, error = %e, "audio frame ignored"),
            },
            MessageKind::AudioVolumeRange => match decode_volume_range(payload) {
                Ok(range) => {
                    let audio = &mut self.state.audio;
                    audio.min_db = range.min_db;
                    audio.max_db = range.max_db;
                    audio.last_update = Some(Local::now());
                    changes.push(StateChange::VolumeRange);
                }
                Err(e) => debug!(payload, error = %e, "volume range ignored"),
            },
            MessageKind::Weather => match decode_weather(payload) {
                Ok(report) => {
                    self.weather = Some(report);
                    changes.push(StateChange::Weather);
                }
                Err(e) => warn!(error = %e, "weather report ignored, keeping previous"),
            },
            MessageKind::InfoField { category, field } => {
                self.apply_info(category, field, payload, &mut changes);
            }
            MessageKind::Unknown => {}
        }
        changes
    }

    fn apply_info(
        &mut self,
        category: &str,
        field: &str,
        value: &str,
        changes: &mut Vec<StateChange>,
    ) {
        let Some(key) = InfoKey::from_parts(category, field) else {
            warn!(category, field, "info field has no mapped slot");
            changes.push(StateChange::UnknownInfo {
                category: category.to_string(),
                field: field.to_string(),
            });
            return;
        };
        self.state.info.insert(key, value.to_string());
        changes.push(StateChange::Info(key));

        match key {
            InfoKey::LighterNumber => self.recompute_pixel_count(changes),
            InfoKey::LocationCity => {
                self.city = if value.is_empty() {
                    DEFAULT_CITY.to_string()
                } else {
                    value.to_string()
                };
            }
            _ => {}
        }
    }

    /// Derives `pixel_count` from controller and the device-reported
    /// lighter number. Luminaire always forces 72.
    fn recompute_pixel_count(&mut self, changes: &mut Vec<StateChange>) {
        let count = if self.state.controller == Controller::Luminaire {
            LUMINAIRE_PIXEL_COUNT
        } else {
            self.state
                .info
                .get(&InfoKey::LighterNumber)
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_PIXEL_COUNT)
        };
        if count != self.state.pixel_count {
            self.state.pixel_count = count;
            // Overrides outside the new strip no longer name a pixel.
            self.state.overrides.retain(|index, _| *index < count);
            changes.push(StateChange::PixelCount(count));
        }
    }

    fn mark_debug_active(&mut self, changes: &mut Vec<StateChange>) {
        if !self.state.debug_active {
            self.state.debug_active = true;
            changes.push(StateChange::DebugActive(true));
        }
    }

    fn apply_override(
        &mut self,
        index: usize,
        color: Option<String>,
        brightness: Option<u32>,
        changes: &mut Vec<StateChange>,
    ) {
        if index >= self.state.pixel_count {
            debug!(
                index,
                pixel_count = self.state.pixel_count,
                "debug override outside strip ignored"
            );
            return;
        }
        let entry = self.state.overrides.entry(index).or_default();
        if let Some(color) = color {
            entry.color = Some(color);
        }
        if let Some(brightness) = brightness {
            entry.brightness = Some(brightness);
        }
        changes.push(StateChange::Pixel(index));
    }
}
