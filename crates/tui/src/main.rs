mod app;
mod ticket_view;

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    path::Path,
    time::Duration,
};

use ksrtc_core::config::{self, AppConfig};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::app::{BookingApp, Outcome};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;

    let engine = config.engine()?;
    tracing::info!(
        origins = engine.reference_data().routes.routes().len(),
        bus_types = engine.reference_data().bus_types.len(),
        unique_ids = config.unique_ids,
        "Booking engine ready"
    );

    let mut app = BookingApp::new(engine, Duration::from_millis(config.processing_delay_ms));
    match app.run().await? {
        Outcome::Cancelled => println!("\nBooking cancelled by user."),
        Outcome::Failed => println!("\nPlease try again."),
        Outcome::Issued => {}
    }
    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join("ksrtc.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
