#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::Result;
use eframe::egui;
use tracing::{info, warn};

mod chatapp;
mod chatapp_ui;
mod config;
mod dispatch;
mod llmclient;
mod mode;
mod setup;
mod theme;

use chatapp::ChatApp;
use config::Config;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kyanos=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config");
        Config::default()
    });
    let api_key = config::load_api_key(&config);
    info!(has_key = api_key.is_some(), "Starting Kyanos");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Kyanos")
            .with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kyanos",
        options,
        Box::new(move |cc| Box::new(ChatApp::new(cc, config, api_key))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
