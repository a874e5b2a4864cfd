//! Device info, weather and audio monitor panel.

use chrono::Local;
use eframe::egui::{
    vec2, Color32, CornerRadius, Frame, Grid, ProgressBar, RichText, Sense, Stroke, Ui,
};

use super::common::UiColors;
use crate::protocol::encode::Command;
use crate::state::{AudioMonitor, InfoKey, Session};

/// An audio frame older than this counts as no signal.
const AUDIO_STALE_MS: i64 = 2000;
const SPECTRUM_BANDS: usize = 12;

#[derive(Default)]
pub struct InfoPanel;

impl InfoPanel {
    pub fn render(&mut self, ui: &mut Ui, session: &Session, connected: bool) -> Vec<Command> {
        let mut commands = Vec::new();

        ui.horizontal(|ui| {
            ui.heading("Device Info");
            ui.add_enabled_ui(connected, |ui| {
                if ui.button("Refresh").clicked() {
                    commands.push(Command::RefreshInfo);
                }
            });
        });
        self.info_grid(ui, session);
        ui.separator();
        self.weather_card(ui, session);
        ui.separator();
        self.audio_monitor(ui, &session.state().audio);

        commands
    }

    fn info_grid(&self, ui: &mut Ui, session: &Session) {
        Grid::new("device_info")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for key in InfoKey::ALL {
                    ui.label(key.label());
                    let value = session
                        .state()
                        .info
                        .get(&key)
                        .map(String::as_str)
                        .unwrap_or("--");
                    ui.label(RichText::new(value).monospace());
                    ui.end_row();
                }
            });
    }

    fn weather_card(&self, ui: &mut Ui, session: &Session) {
        ui.heading("Weather");
        let Some(report) = session.weather() else {
            ui.label(RichText::new("no report yet").color(Color32::GRAY).italics());
            return;
        };
        ui.horizontal(|ui| {
            ui.label(RichText::new(report.icon()).size(32.0));
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(format!(
                        "{} deg C - {}",
                        report.temp_c.as_deref().unwrap_or("--"),
                        report.description()
                    ))
                    .strong(),
                );
                ui.label(RichText::new(session.city()).color(Color32::GRAY));
            });
        });
        Grid::new("weather_details").num_columns(2).show(ui, |ui| {
            ui.label("Humidity");
            ui.label(match &report.humidity {
                Some(h) => format!("{}%", h),
                None => "--".to_string(),
            });
            ui.end_row();
            ui.label("Wind");
            ui.label(match (&report.windspeed_kmph, &report.wind_direction) {
                (Some(speed), Some(dir)) => format!("{} km/h {}", speed, dir),
                _ => "--".to_string(),
            });
            ui.end_row();
            ui.label("Visibility");
            ui.label(match &report.visibility {
                Some(v) => format!("{} km", v),
                None => "--".to_string(),
            });
            ui.end_row();
            ui.label("Feels like");
            ui.label(match &report.feels_like_c {
                Some(t) => format!("{} deg C", t),
                None => "--".to_string(),
            });
            ui.end_row();
        });
    }

    fn audio_monitor(&self, ui: &mut Ui, audio: &AudioMonitor) {
        ui.heading("Audio Monitor");
        ui.horizontal(|ui| {
            ui.label("Status:");
            let (text, color) = audio_status(audio);
            ui.label(RichText::new(text).color(color));
        });
        Grid::new("audio_readings").num_columns(2).show(ui, |ui| {
            ui.label("Raw ADC");
            ui.label(RichText::new(audio.raw.to_string()).monospace());
            ui.end_row();
            ui.label("Volume");
            ui.label(RichText::new(format!("{:.1} dB", audio.volume_db)).monospace());
            ui.end_row();
            ui.label("VU level");
            ui.label(RichText::new(format!("{} / 7", audio.vu_level)).monospace());
            ui.end_row();
        });

        let span = (audio.max_db - audio.min_db).max(1.0);
        let fill = ((audio.volume_db - audio.min_db) / span).clamp(0.0, 1.0);
        ui.add(ProgressBar::new(fill).text(format!(
            "{:.0}-{:.0} dB",
            audio.min_db, audio.max_db
        )));

        self.spectrum(ui, audio);
    }

    fn spectrum(&self, ui: &mut Ui, audio: &AudioMonitor) {
        Frame::new()
            .stroke(Stroke::new(1.0, UiColors::BORDER))
            .fill(UiColors::EXTREME_BG)
            .inner_margin(4)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for band in 0..SPECTRUM_BANDS {
                        let magnitude = audio.spectrum.get(band).copied().unwrap_or(0.0);
                        let height = (magnitude.clamp(0.0, 1.0) * 40.0).max(1.0);
                        let (rect, _) = ui.allocate_exact_size(vec2(10.0, 40.0), Sense::hover());
                        let bar = eframe::egui::Rect::from_min_max(
                            eframe::egui::pos2(rect.min.x, rect.max.y - height),
                            rect.max,
                        );
                        ui.painter()
                            .rect_filled(bar, CornerRadius::same(1), Color32::from_rgb(100, 180, 255));
                    }
                });
            });
    }
}

/// Loudness banding from the original monitor, plus floating-pin and
/// staleness detection.
fn audio_status(audio: &AudioMonitor) -> (&'static str, Color32) {
    let stale = match audio.last_update {
        None => true,
        Some(at) => {
            Local::now().signed_duration_since(at).num_milliseconds() > AUDIO_STALE_MS
        }
    };
    if stale {
        return ("No signal", Color32::GRAY);
    }
    if audio.raw < 5 {
        return ("Floating pin - check wiring", UiColors::INACTIVE);
    }
    if audio.volume_db < 35.0 {
        ("Quiet", UiColors::ACTIVE)
    } else if audio.volume_db < 70.0 {
        ("Normal", Color32::from_rgb(220, 220, 80))
    } else if audio.volume_db < 100.0 {
        ("Loud", Color32::from_rgb(230, 140, 40))
    } else {
        ("Very loud", UiColors::INACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(volume_db: f32, raw: i64) -> AudioMonitor {
        AudioMonitor {
            raw,
            volume_db,
            last_update: Some(Local::now()),
            ..AudioMonitor::default()
        }
    }

    #[test]
    fn no_frame_means_no_signal() {
        let (text, _) = audio_status(&AudioMonitor::default());
        assert_eq!(text, "No signal");
    }

    #[test]
    fn low_raw_reading_flags_floating_pin() {
        let (text, _) = audio_status(&fresh(50.0, 2));
        assert_eq!(text, "Floating pin - check wiring");
    }

    #[test]
    fn loudness_bands() {
        assert_eq!(audio_status(&fresh(20.0, 100)).0, "Quiet");
        assert_eq!(audio_status(&fresh(50.0, 100)).0, "Normal");
        assert_eq!(audio_status(&fresh(85.0, 100)).0, "Loud");
        assert_eq!(audio_status(&fresh(110.0, 100)).0, "Very loud");
    }
}
