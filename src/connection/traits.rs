//! Wi-Fi link trait for abstraction and testability
//!
//! This trait defines the interface between the connection manager and the
//! radio driver, allowing the real station driver to be swapped with a mock
//! for testing.

use crate::config;
use core::future::Future;

/// Errors reported by the radio driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Station configuration rejected by the driver
    InvalidConfig,
    /// Radio could not be started
    StartFailed,
    /// Connect request rejected by the driver
    ConnectRejected,
    /// Radio not started
    NotStarted,
}

/// Signal reported by the link layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Station interface is up and ready to associate
    Started,
    /// Association lost or attempt failed
    Disconnected,
    /// Associated and an IPv4 address has been assigned
    GotAddress([u8; 4]),
}

/// Network identifier and secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl Credentials {
    /// Credentials baked into the firmware at build time
    pub const fn from_config() -> Self {
        Self {
            ssid: config::wifi::SSID,
            password: config::wifi::PASSWORD,
        }
    }

    /// Check the lengths the radio accepts
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.ssid.is_empty()
            || self.ssid.len() > config::wifi::MAX_SSID_LEN
            || self.password.len() > config::wifi::MAX_PASSWORD_LEN
        {
            return Err(LinkError::InvalidConfig);
        }
        Ok(())
    }
}

/// Abstract station link for testability
pub trait WifiLink {
    /// Configure the station with the given credentials and start the radio
    ///
    /// A successful start is followed by a [`LinkEvent::Started`] event.
    fn start(&mut self, credentials: &Credentials) -> impl Future<Output = Result<(), LinkError>>;

    /// Request an association attempt
    ///
    /// Does not wait for the outcome; it is reported later as
    /// [`LinkEvent::GotAddress`] or [`LinkEvent::Disconnected`].
    fn connect(&mut self) -> Result<(), LinkError>;

    /// Wait for the next link-layer signal
    fn next_event(&mut self) -> impl Future<Output = LinkEvent>;
}
