//! Running-version reporter

use embassy_time::{Duration, Ticker};

use crate::config;

/// Log the running firmware version at a fixed interval
pub async fn version_report_task() {
    let interval = Duration::from_millis(config::update::VERSION_REPORT_INTERVAL_MS);
    let mut ticker = Ticker::every(interval);
    loop {
        log::info!("Running firmware version: {}", config::update::CURRENT_VERSION);
        ticker.next().await;
    }
}
