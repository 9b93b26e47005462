//! Update event channel
//!
//! Bounded mailbox between the producers (check timer, external triggers)
//! and the single consumer (update coordinator). Producers never wait: when
//! the mailbox is full the new event is dropped, and the next tick retries.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config;

/// Who asked for an update check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSource {
    /// Periodic check timer
    Timer,
    /// Explicit request from outside the agent
    External,
}

/// Event consumed by the update coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Run one check → fetch → install sequence
    CheckRequested { source: CheckSource },
}

/// Bounded, non-blocking event channel
///
/// `N` is the number of events that can be pending at once.
pub struct EventChannel<const N: usize = { config::events::CHANNEL_CAPACITY }> {
    inner: Channel<CriticalSectionRawMutex, UpdateEvent, N>,
}

impl<const N: usize> EventChannel<N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Post an event without waiting
    ///
    /// Returns false if the channel was full and the event was dropped.
    pub fn post(&self, event: UpdateEvent) -> bool {
        match self.inner.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("event channel full, dropping {:?}", event);
                false
            }
        }
    }

    /// Wait for the next event
    pub async fn receive(&self) -> UpdateEvent {
        self.inner.receive().await
    }

    /// Take the next event if one is pending
    pub fn try_receive(&self) -> Option<UpdateEvent> {
        self.inner.try_receive().ok()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no events are pending
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Maximum number of pending events
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for EventChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
