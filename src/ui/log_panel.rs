//! Session message log: everything sent, received or reported by the
//! transport, capped so a chatty broker cannot grow memory unbounded.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use eframe::egui::{Color32, RichText, ScrollArea, Ui};

use super::common::UiColors;

const MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Received,
    Sent,
    System,
    Error,
}

impl LogKind {
    fn tag(self) -> &'static str {
        match self {
            LogKind::Received => "RECV",
            LogKind::Sent => "SENT",
            LogKind::System => "SYS",
            LogKind::Error => "ERR",
        }
    }

    fn color(self) -> Color32 {
        match self {
            LogKind::Received => Color32::from_rgb(100, 180, 255),
            LogKind::Sent => Color32::from_rgb(120, 220, 120),
            LogKind::System => Color32::GRAY,
            LogKind::Error => UiColors::INACTIVE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
    pub topic: String,
    pub message: String,
}

#[derive(Default)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
}

impl MessageLog {
    pub fn push(&mut self, kind: LogKind, topic: impl Into<String>, message: impl Into<String>) {
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            kind,
            topic: topic.into(),
            message: message.into(),
        });
        while self.entries.len() > MAX_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn system(&mut self, message: impl Into<String>) {
        self.push(LogKind::System, "System", message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogKind::Error, "System", message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Message Log");
            if ui.button("Clear").clicked() {
                self.clear();
            }
        });
        ScrollArea::vertical()
            .id_salt("message_log")
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in &self.entries {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            RichText::new(entry.timestamp.format("%H:%M:%S").to_string())
                                .color(Color32::DARK_GRAY)
                                .monospace(),
                        );
                        ui.label(
                            RichText::new(format!("[{}]", entry.kind.tag()))
                                .color(entry.kind.color())
                                .monospace(),
                        );
                        ui.label(RichText::new(&entry.topic).strong());
                        ui.label(&entry.message);
                    });
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_capped() {
        let mut log = MessageLog::default();
        for i in 0..150 {
            log.push(LogKind::Received, "topic", format!("msg {}", i));
        }
        assert_eq!(log.len(), MAX_ENTRIES);
    }
}
