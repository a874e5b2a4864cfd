pub mod config;
pub mod mqtt;
pub mod protocol;
pub mod state;
pub mod topics;
pub mod ui;

use color_eyre::Result;
use eframe::egui;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::DashboardConfig;
use crate::mqtt::handler::MqttHandle;
use crate::ui::DashboardUI;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = DashboardConfig::load_or_default();
    info!(
        broker = %config.mqtt.host,
        port = config.mqtt.port,
        "starting Aura Light dashboard"
    );

    // UI -> transport requests, transport -> UI events. The single
    // event channel is what keeps projections in delivery order.
    let (request_tx, request_rx) = mpsc::channel(100);
    let (event_tx, event_rx) = mpsc::channel(100);

    let handle = MqttHandle::new(config.mqtt.clone());
    let _transport = tokio::spawn(async move {
        handle.run(request_rx, event_tx).await;
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        "Aura Light Dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardUI::new(cc, event_rx, request_tx, config)))),
    );
    if let Err(e) = result {
        return Err(color_eyre::eyre::eyre!("UI terminated with error: {e}"));
    }

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
