//! Periodic update-check timer
//!
//! Sleeps while the link is down. Once armed it fires one check right away,
//! then one every `CHECK_INTERVAL_MS` until disarmed. Ticks only post to the
//! event channel and never wait on the coordinator.

use embassy_time::{Duration, Ticker};

use crate::config;
use crate::coordinator::{CheckTrigger, TickOutcome};

/// Task that turns the check interval into `CheckRequested` events
pub async fn check_timer_task<const N: usize>(trigger: &CheckTrigger<'_, N>) {
    loop {
        trigger.wait_armed().await;

        let mut ticker = Ticker::every(Duration::from_millis(config::update::CHECK_INTERVAL_MS));
        loop {
            match trigger.tick() {
                TickOutcome::Posted => {}
                TickOutcome::Dropped => log::debug!("Timer: check still pending, tick dropped"),
                // Link went down, sleep until the next connect
                TickOutcome::Disarmed => break,
            }
            ticker.next().await;
        }
    }
}
