//! Connection manager state machine
//!
//! Drives association, reconnects and failure of the station link and
//! publishes connected / disconnected / failed edges to registered listeners.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use crate::config;
use crate::connection::traits::{Credentials, LinkError, LinkEvent, WifiLink};

/// Connection state owned by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Radio not started yet
    Idle,
    /// First association attempt in progress
    Connecting,
    /// Associated with an address
    Connected,
    /// Reconnect attempt after the given number of consecutive disconnects
    Retrying(u8),
    /// Retry budget exhausted, no further automatic attempts
    Failed,
}

impl ConnectionState {
    /// Returns true for the states `wait_until_settled` resolves on
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }
}

/// Edge published to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entered `Connected`
    Connected,
    /// Left `Connected`
    Disconnected,
    /// Entered `Failed`
    Failed,
}

/// Receiver of connection transitions
///
/// Called from the link task; implementations must return quickly and must
/// not block.
pub trait TransitionListener {
    fn on_transition(&self, transition: Transition);
}

/// Returned when no more listeners can be registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerTableFull;

/// Connection state shared outside the link task
///
/// Only the manager writes to it. Other tasks can take a snapshot or wait for
/// the link to settle.
pub struct ConnectionStatus {
    state: Mutex<CriticalSectionRawMutex, Cell<ConnectionState>>,
    settled: Signal<CriticalSectionRawMutex, ()>,
}

impl ConnectionStatus {
    /// Create a status in the `Idle` state
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(ConnectionState::Idle)),
            settled: Signal::new(),
        }
    }

    /// Snapshot of the current state
    pub fn current(&self) -> ConnectionState {
        self.state.lock(|cell| cell.get())
    }

    /// Returns true while the link is connected
    pub fn is_connected(&self) -> bool {
        self.current() == ConnectionState::Connected
    }

    /// Wait until the link is either connected or has failed
    pub async fn wait_until_settled(&self) -> ConnectionState {
        loop {
            let state = self.current();
            if state.is_settled() {
                return state;
            }
            // Wakeups may be stale, the state is checked again
            self.settled.wait().await;
        }
    }

    fn set(&self, state: ConnectionState) {
        self.state.lock(|cell| cell.set(state));
        if state.is_settled() {
            self.settled.signal(());
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Station connection manager
///
/// Owns the retry counter and the connection state. All mutation happens in
/// `handle_event`, called from the link task.
pub struct ConnectionManager<'a, L: WifiLink> {
    link: L,
    status: &'a ConnectionStatus,
    listeners: Vec<&'a dyn TransitionListener, { config::connection::MAX_LISTENERS }>,
    state: ConnectionState,
    retry_count: u8,
    max_retry: u8,
}

impl<'a, L: WifiLink> ConnectionManager<'a, L> {
    /// Create a manager with the configured retry budget
    pub fn new(link: L, status: &'a ConnectionStatus) -> Self {
        Self::with_max_retry(link, status, config::connection::MAX_RETRY)
    }

    /// Create a manager tolerating `max_retry` consecutive disconnects
    ///
    /// A budget of 0 is raised to 1: the first disconnect already fails the
    /// link.
    pub fn with_max_retry(link: L, status: &'a ConnectionStatus, max_retry: u8) -> Self {
        status.set(ConnectionState::Idle);
        Self {
            link,
            status,
            listeners: Vec::new(),
            state: ConnectionState::Idle,
            retry_count: 0,
            max_retry: max_retry.max(1),
        }
    }

    /// Register interest in connection transitions
    pub fn on_transition(
        &mut self,
        listener: &'a dyn TransitionListener,
    ) -> Result<(), ListenerTableFull> {
        self.listeners.push(listener).map_err(|_| ListenerTableFull)
    }

    /// Configure the radio and start it
    ///
    /// Association begins when the link reports [`LinkEvent::Started`].
    pub async fn start(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        credentials.validate()?;
        log::info!("Wi-Fi: starting station for '{}'", credentials.ssid);
        self.link.start(credentials).await
    }

    /// Process one link-layer signal
    pub fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Started => self.on_started(),
            LinkEvent::Disconnected => self.on_link_down(),
            LinkEvent::GotAddress(address) => self.on_got_address(address),
        }
    }

    /// Wait for link events and process them, forever
    pub async fn run(&mut self) {
        loop {
            let event = self.link.next_event().await;
            self.handle_event(event);
        }
    }

    /// Leave `Failed` and start over with a fresh retry budget
    pub fn reset(&mut self) {
        if self.state != ConnectionState::Failed {
            return;
        }
        log::info!("Wi-Fi: reset requested, reconnecting");
        self.retry_count = 0;
        self.set_state(ConnectionState::Connecting);
        self.request_connect();
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive disconnects since the last successful connection
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Status this manager publishes to
    pub fn status(&self) -> &'a ConnectionStatus {
        self.status
    }

    /// Access the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    fn on_started(&mut self) {
        if self.state != ConnectionState::Idle {
            return;
        }
        log::info!("Wi-Fi: station started, connecting");
        self.set_state(ConnectionState::Connecting);
        self.request_connect();
    }

    fn on_got_address(&mut self, address: [u8; 4]) {
        match self.state {
            // Only reset() leaves Failed
            ConnectionState::Failed => {
                log::debug!("Wi-Fi: ignoring address while failed");
                return;
            }
            ConnectionState::Connected => {
                self.retry_count = 0;
                return;
            }
            _ => {}
        }
        self.retry_count = 0;
        log::info!(
            "Wi-Fi: connected, address {}.{}.{}.{}",
            address[0],
            address[1],
            address[2],
            address[3]
        );
        self.set_state(ConnectionState::Connected);
        self.notify(Transition::Connected);
    }

    fn on_link_down(&mut self) {
        match self.state {
            // Not associating, nothing to retry
            ConnectionState::Idle | ConnectionState::Failed => return,
            ConnectionState::Connected => {
                log::warn!("Wi-Fi: disconnected");
                self.notify(Transition::Disconnected);
            }
            ConnectionState::Connecting | ConnectionState::Retrying(_) => {}
        }
        self.count_failure_and_retry();
    }

    /// Count a failed attempt, then either reconnect or give up
    fn count_failure_and_retry(&mut self) {
        loop {
            if self.retry_count < self.max_retry {
                self.retry_count += 1;
            }
            if self.retry_count >= self.max_retry {
                log::error!(
                    "Wi-Fi: giving up after {} consecutive disconnects",
                    self.retry_count
                );
                self.set_state(ConnectionState::Failed);
                self.notify(Transition::Failed);
                return;
            }

            log::info!(
                "Wi-Fi: retrying connection ({}/{})",
                self.retry_count,
                self.max_retry
            );
            self.set_state(ConnectionState::Retrying(self.retry_count));
            match self.link.connect() {
                Ok(()) => return,
                Err(e) => log::warn!("Wi-Fi: connect request rejected ({:?})", e),
            }
        }
    }

    /// Issue a connect request, counting a synchronous rejection as a failure
    fn request_connect(&mut self) {
        if let Err(e) = self.link.connect() {
            log::warn!("Wi-Fi: connect request rejected ({:?})", e);
            self.count_failure_and_retry();
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.status.set(state);
    }

    fn notify(&self, transition: Transition) {
        for listener in self.listeners.iter() {
            listener.on_transition(transition);
        }
    }
}
