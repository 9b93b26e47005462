//! Check trigger
//!
//! Timer-side producer of update events. It is armed while the link is
//! connected and posts `CheckRequested` without ever waiting on the
//! coordinator.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::config;
use crate::connection::manager::{Transition, TransitionListener};
use crate::events::{CheckSource, EventChannel, UpdateEvent};

/// Result of a tick or external request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Event queued for the coordinator
    Posted,
    /// Channel full, event dropped
    Dropped,
    /// Link not connected, nothing posted
    Disarmed,
}

/// Connection-gated producer of update checks
pub struct CheckTrigger<'a, const N: usize = { config::events::CHANNEL_CAPACITY }> {
    events: &'a EventChannel<N>,
    armed: Mutex<CriticalSectionRawMutex, Cell<bool>>,
    armed_signal: Signal<CriticalSectionRawMutex, ()>,
}

impl<'a, const N: usize> CheckTrigger<'a, N> {
    /// Create a disarmed trigger posting into `events`
    pub const fn new(events: &'a EventChannel<N>) -> Self {
        Self {
            events,
            armed: Mutex::new(Cell::new(false)),
            armed_signal: Signal::new(),
        }
    }

    /// Periodic timer expiry
    pub fn tick(&self) -> TickOutcome {
        self.post(CheckSource::Timer)
    }

    /// Ask for a check outside the periodic schedule
    pub fn request_check(&self) -> TickOutcome {
        self.post(CheckSource::External)
    }

    /// Allow checks to be posted
    pub fn arm(&self) {
        self.armed.lock(|armed| armed.set(true));
        self.armed_signal.signal(());
    }

    /// Stop posting checks
    pub fn disarm(&self) {
        self.armed.lock(|armed| armed.set(false));
    }

    pub fn is_armed(&self) -> bool {
        self.armed.lock(|armed| armed.get())
    }

    /// Wait until the trigger is armed
    pub async fn wait_armed(&self) {
        while !self.is_armed() {
            self.armed_signal.wait().await;
        }
    }

    fn post(&self, source: CheckSource) -> TickOutcome {
        if !self.is_armed() {
            log::debug!("check trigger disarmed, ignoring {:?} request", source);
            return TickOutcome::Disarmed;
        }
        if self.events.post(UpdateEvent::CheckRequested { source }) {
            TickOutcome::Posted
        } else {
            TickOutcome::Dropped
        }
    }
}

impl<const N: usize> TransitionListener for CheckTrigger<'_, N> {
    fn on_transition(&self, transition: Transition) {
        match transition {
            Transition::Connected => {
                log::info!("update checks armed");
                self.arm();
            }
            Transition::Disconnected | Transition::Failed => {
                log::info!("update checks disarmed ({:?})", transition);
                self.disarm();
            }
        }
    }
}
