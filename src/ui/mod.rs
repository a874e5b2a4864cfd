//! # Dashboard User Interface
//!
//! eframe/egui front end for the Aura Light dashboard. The UI owns the
//! [`Session`] and is the single writer to its device state: every frame
//! it drains the transport event channel and feeds each event through
//! the session projector, strictly in delivery order, then renders the
//! resulting snapshot. Operator intents flow the other way as
//! [`Command`]s handed to the transport task, with a local echo
//! projected immediately so the controls feel live.
//!
//! Layout follows a three-panel split: a connection bar on top, light
//! controls and device info side by side in the middle, and the message
//! log pinned to the bottom.

pub mod common;
pub mod info_panel;
pub mod light_panel;
pub mod log_panel;

use std::time::Duration;

use eframe::egui::{self, Id, Modal, RichText, ScrollArea, TextEdit};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::DashboardConfig;
use crate::mqtt::link::{LinkEvent, LinkRequest};
use crate::protocol::encode::{encode, Command};
use crate::state::Session;

use self::common::UiColors;
use self::info_panel::InfoPanel;
use self::light_panel::LightPanel;
use self::log_panel::{LogKind, MessageLog};

pub struct DashboardUI {
    session: Session,
    events: mpsc::Receiver<LinkEvent>,
    requests: mpsc::Sender<LinkRequest>,
    config: DashboardConfig,

    username: String,
    connected: bool,
    connecting: bool,
    connection_error: Option<String>,

    light_panel: LightPanel,
    info_panel: InfoPanel,
    log: MessageLog,
}

impl DashboardUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        events: mpsc::Receiver<LinkEvent>,
        requests: mpsc::Sender<LinkRequest>,
        config: DashboardConfig,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let username = config.last_username.clone();
        DashboardUI {
            session: Session::new(),
            events,
            requests,
            config,
            username,
            connected: false,
            connecting: false,
            connection_error: None,
            light_panel: LightPanel::default(),
            info_panel: InfoPanel::default(),
            log: MessageLog::default(),
        }
    }

    /// Applies everything the transport delivered since the last frame.
    /// One receiver, one loop: projections happen in wire order.
    fn drain_link_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                LinkEvent::Connected => {
                    self.connected = true;
                    self.connecting = false;
                    self.session.begin();
                    self.log.system("Connected to MQTT broker");
                    self.config.last_username = self.username.trim().to_string();
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "failed to persist config");
                    }
                }
                LinkEvent::Disconnected => {
                    if self.connected {
                        self.log.system("Disconnected from MQTT broker");
                    }
                    self.connected = false;
                    self.connecting = false;
                    self.session.freeze();
                }
                LinkEvent::Message { topic, payload } => {
                    self.session.handle_message(&topic, &payload);
                    self.log.push(LogKind::Received, topic, payload);
                }
                LinkEvent::Error(message) => {
                    self.log.error(&message);
                    self.connection_error = Some(message);
                    self.connecting = false;
                }
            }
        }
    }

    fn connect(&mut self) {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            self.connection_error = Some("Please enter your username".to_string());
            return;
        }
        self.connecting = true;
        self.log.system(format!("Connecting as {}...", username));
        if self
            .requests
            .try_send(LinkRequest::Connect { username })
            .is_err()
        {
            self.connecting = false;
            self.connection_error = Some("transport task is gone".to_string());
        }
    }

    fn disconnect(&mut self) {
        self.log.system("Disconnecting...");
        let _ = self.requests.try_send(LinkRequest::Disconnect);
    }

    /// Publishes queued commands and projects their local echo.
    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            let message = match encode(&command) {
                Ok(message) => message,
                Err(e) => {
                    self.log.error(e.to_string());
                    continue;
                }
            };
            if self
                .requests
                .try_send(LinkRequest::Publish(command.clone()))
                .is_err()
            {
                self.log.error("transport task is gone");
                continue;
            }
            self.session.apply_echo(&command);
            self.log
                .push(LogKind::Sent, message.suffix, message.payload);
        }
    }

    fn connection_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Aura Light Dashboard");
            ui.separator();
            ui.label("Username:");
            ui.add_enabled(
                !self.connected && !self.connecting,
                TextEdit::singleline(&mut self.username).desired_width(140.0),
            );
            if self.connected || self.connecting {
                if ui.button("Disconnect").clicked() {
                    self.disconnect();
                }
            } else if ui.button("Connect").clicked() {
                self.connect();
            }
            let status_color = if self.connected {
                UiColors::ACTIVE
            } else {
                UiColors::INACTIVE
            };
            ui.colored_label(status_color, "\u{2B24}");
            let status_text = if self.connected {
                "Connected"
            } else if self.connecting {
                "Connecting..."
            } else {
                "Disconnected"
            };
            ui.label(status_text);
        });
    }

    fn error_modal(&mut self, ctx: &egui::Context) {
        let Some(error) = self.connection_error.clone() else {
            return;
        };
        let modal = Modal::new(Id::new("connection_error"));
        let response = modal.show(ctx, |ui| {
            ui.set_width(280.0);
            ui.heading("Connection Error");
            ui.label(error);
            ui.separator();
            if ui.button("OK").clicked() {
                self.connection_error = None;
            }
        });
        if response.should_close() {
            self.connection_error = None;
        }
    }
}

impl eframe::App for DashboardUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(33));
        self.drain_link_events();

        let mut commands = Vec::new();

        egui::TopBottomPanel::top("connection_bar").show(ctx, |ui| {
            self.connection_bar(ui);
        });

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                self.log.render(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                ScrollArea::vertical()
                    .id_salt("light_column")
                    .show(&mut columns[0], |ui| {
                        commands.extend(self.light_panel.render(
                            ui,
                            &mut self.session,
                            self.connected,
                        ));
                    });
                ScrollArea::vertical()
                    .id_salt("info_column")
                    .show(&mut columns[1], |ui| {
                        commands.extend(self.info_panel.render(
                            ui,
                            &self.session,
                            self.connected,
                        ));
                    });
            });
            if !self.connected && !self.connecting {
                ui.label(
                    RichText::new("Enter your username and connect to see the device.")
                        .color(egui::Color32::GRAY)
                        .italics(),
                );
            }
        });

        self.dispatch(commands);
        self.error_modal(ctx);
    }
}
