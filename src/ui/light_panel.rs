//! Light control panel: power, mode and controller switches, the pixel
//! strip visualization and the per-pixel debug override form.

use eframe::egui::{
    vec2, Color32, CornerRadius, DragValue, Frame, RichText, Sense, Slider, Stroke, Ui,
};

use super::common::{mode_color, parse_hex_color, UiColors};
use crate::protocol::decode::normalize_color;
use crate::protocol::encode::Command;
use crate::state::{Controller, DeviceState, Session};

const MODES: [&str; 4] = ["idle", "timer", "weather", "music"];
const CONTROLLERS: [&str; 2] = ["local", "luminaire"];
const PIXEL_SIZE: f32 = 26.0;

pub struct LightPanel {
    debug_index: usize,
    debug_color: String,
    debug_brightness: u32,
    idle_color_edit: String,
    form_error: Option<String>,
}

impl Default for LightPanel {
    fn default() -> Self {
        LightPanel {
            debug_index: 0,
            debug_color: "#FF0000".to_string(),
            debug_brightness: 200,
            idle_color_edit: String::new(),
            form_error: None,
        }
    }
}

impl LightPanel {
    /// Renders the panel and returns the commands the operator queued
    /// this frame. Controls are disabled while disconnected.
    pub fn render(&mut self, ui: &mut Ui, session: &mut Session, connected: bool) -> Vec<Command> {
        let mut commands = Vec::new();

        ui.heading("Aura Light");
        self.power_row(ui, session.state(), connected, &mut commands);
        ui.separator();
        self.mode_row(ui, session.state(), connected, &mut commands);
        self.controller_row(ui, session.state(), connected, &mut commands);
        ui.separator();
        self.visualization(ui, session.state());
        ui.separator();
        self.debug_form(ui, session, connected, &mut commands);

        commands
    }

    fn power_row(
        &mut self,
        ui: &mut Ui,
        state: &DeviceState,
        connected: bool,
        commands: &mut Vec<Command>,
    ) {
        ui.horizontal(|ui| {
            let (text, color) = if state.light_on {
                ("ON", UiColors::ACTIVE)
            } else {
                ("OFF", UiColors::INACTIVE)
            };
            ui.label(RichText::new(text).color(color).strong().size(18.0));
            ui.add_space(8.0);
            ui.add_enabled_ui(connected, |ui| {
                if ui.button("Turn On").clicked() {
                    commands.push(Command::SetPower(true));
                }
                if ui.button("Turn Off").clicked() {
                    commands.push(Command::SetPower(false));
                }
            });
        });
    }

    fn mode_row(
        &mut self,
        ui: &mut Ui,
        state: &DeviceState,
        connected: bool,
        commands: &mut Vec<Command>,
    ) {
        ui.horizontal(|ui| {
            ui.label("Mode:");
            ui.label(RichText::new(state.mode_label.to_uppercase()).strong());
            ui.add_enabled_ui(connected, |ui| {
                for mode in MODES {
                    let active = state.mode_label.to_lowercase() == mode;
                    if ui.selectable_label(active, mode).clicked() && !active {
                        commands.push(Command::SetMode(mode.to_string()));
                    }
                }
            });
        });
    }

    fn controller_row(
        &mut self,
        ui: &mut Ui,
        state: &DeviceState,
        connected: bool,
        commands: &mut Vec<Command>,
    ) {
        ui.horizontal(|ui| {
            ui.label("Controller:");
            ui.label(RichText::new(state.controller_label.to_uppercase()).strong());
            ui.add_enabled_ui(connected, |ui| {
                for controller in CONTROLLERS {
                    let active = state.controller_label.to_lowercase() == controller;
                    if ui.selectable_label(active, controller).clicked() && !active {
                        commands.push(Command::SetController(controller.to_string()));
                    }
                }
            });
        });
    }

    fn visualization(&self, ui: &mut Ui, state: &DeviceState) {
        if state.controller == Controller::Luminaire {
            ui.label(
                RichText::new("Luminaire wall fixture - 72 pixels")
                    .color(Color32::GRAY)
                    .italics(),
            );
        }
        Frame::new()
            .stroke(Stroke::new(1.0, UiColors::BORDER))
            .fill(UiColors::EXTREME_BG)
            .inner_margin(6)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for index in 0..state.pixel_count {
                        let (rect, _) =
                            ui.allocate_exact_size(vec2(PIXEL_SIZE, PIXEL_SIZE), Sense::hover());
                        ui.painter()
                            .rect_filled(rect, CornerRadius::same(4), pixel_color(state, index));
                    }
                });
            });
    }

    fn debug_form(
        &mut self,
        ui: &mut Ui,
        session: &mut Session,
        connected: bool,
        commands: &mut Vec<Command>,
    ) {
        let state = session.state();
        ui.horizontal(|ui| {
            ui.label("Debug overlay:");
            let (text, color) = if state.debug_active {
                ("ACTIVE", UiColors::ACTIVE)
            } else {
                ("inactive", Color32::GRAY)
            };
            ui.label(RichText::new(text).color(color));
        });

        let max_index = state.pixel_count.saturating_sub(1);
        self.debug_index = self.debug_index.min(max_index);

        ui.add_enabled_ui(connected, |ui| {
            ui.horizontal(|ui| {
                ui.label("Pixel");
                ui.add(DragValue::new(&mut self.debug_index).range(0..=max_index));
                ui.label("Color");
                ui.text_edit_singleline(&mut self.debug_color);
                ui.label("Brightness");
                ui.add(Slider::new(&mut self.debug_brightness, 0..=255));
            });
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    match normalize_color(&self.debug_color) {
                        Ok(color) => {
                            self.form_error = None;
                            commands.push(Command::DebugColor {
                                index: self.debug_index,
                                color,
                            });
                            commands.push(Command::DebugBrightness {
                                index: self.debug_index,
                                brightness: self.debug_brightness,
                            });
                        }
                        Err(_) => {
                            self.form_error =
                                Some(format!("{:?} is not a #RRGGBB color", self.debug_color));
                        }
                    }
                }
                if ui.button("Clear").clicked() {
                    commands.push(Command::ClearDebug);
                }
            });
        });
        if let Some(error) = &self.form_error {
            ui.label(RichText::new(error).color(UiColors::INACTIVE));
        }

        ui.horizontal(|ui| {
            ui.label("Idle color");
            ui.text_edit_singleline(&mut self.idle_color_edit);
            if ui.button("Set").clicked() {
                if session.set_idle_color(&self.idle_color_edit) {
                    self.form_error = None;
                    self.idle_color_edit.clear();
                } else {
                    self.form_error =
                        Some(format!("{:?} is not a #RRGGBB color", self.idle_color_edit));
                }
            }
        });
    }
}

/// Resolves the rendered color of one pixel: off-gray when the light is
/// off, otherwise mode base color with any debug override layered on
/// top. Brightness maps to opacity, clamped to a 0.2 floor so an
/// overridden pixel never disappears entirely.
fn pixel_color(state: &DeviceState, index: usize) -> Color32 {
    if !state.light_on {
        return UiColors::PIXEL_OFF;
    }
    let base = mode_color(&state.mode, &state.idle_color);
    let Some(over) = state.overrides.get(&index) else {
        return base;
    };
    let mut color = over
        .color
        .as_deref()
        .and_then(parse_hex_color)
        .unwrap_or(base);
    if let Some(brightness) = over.brightness {
        let opacity = (brightness as f32 / 255.0).clamp(0.2, 1.0);
        color = color.gamma_multiply(opacity);
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PixelOverride;

    fn lit_state() -> DeviceState {
        DeviceState {
            light_on: true,
            ..DeviceState::default()
        }
    }

    #[test]
    fn off_light_renders_dark_pixels() {
        let state = DeviceState::default();
        assert_eq!(pixel_color(&state, 0), UiColors::PIXEL_OFF);
    }

    #[test]
    fn override_color_beats_mode_color() {
        let mut state = lit_state();
        state.overrides.insert(
            2,
            PixelOverride {
                color: Some("#FF0000".into()),
                brightness: None,
            },
        );
        assert_eq!(pixel_color(&state, 2), Color32::from_rgb(255, 0, 0));
        // Other pixels keep the configured idle color.
        assert_eq!(pixel_color(&state, 0), Color32::from_rgb(0x00, 0x00, 0xFF));
    }

    #[test]
    fn idle_pixels_track_the_configured_idle_color() {
        let mut state = lit_state();
        assert_eq!(pixel_color(&state, 0), Color32::from_rgb(0x00, 0x00, 0xFF));

        state.idle_color = "#AB12CD".to_string();
        assert_eq!(pixel_color(&state, 0), Color32::from_rgb(0xAB, 0x12, 0xCD));
    }

    #[test]
    fn brightness_has_an_opacity_floor() {
        let mut state = lit_state();
        state.overrides.insert(
            0,
            PixelOverride {
                color: Some("#FFFFFF".into()),
                brightness: Some(0),
            },
        );
        let dim = pixel_color(&state, 0);
        let full = Color32::WHITE;
        assert_ne!(dim, full);
        // Zero brightness still renders something visible.
        assert_ne!(dim, Color32::TRANSPARENT);
    }
}
