//! Station link over the ESP32-S3 radio
//!
//! Association is driven through esp-radio's `WifiController`; the address is
//! taken from the embassy-net stack once DHCP has configured it.

use alloc::string::String;

use embassy_futures::select::{select, Either};
use embassy_net::Stack;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiEvent};

use crate::connection::traits::{Credentials, LinkError, LinkEvent, WifiLink};

/// Where the adapter is in the association cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Radio started, `Started` not reported yet
    Starting,
    /// Waiting for DHCP to configure the stack
    AwaitingAddress,
    /// Address of the current association reported
    Addressed,
    /// Association lost, waiting for the stack to drop the old lease
    Draining,
}

/// `WifiLink` implementation for the on-chip radio
pub struct EspWifiLink<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    phase: Phase,
}

impl<'d> EspWifiLink<'d> {
    /// Wrap a controller and the network stack running on its device
    pub fn new(controller: WifiController<'d>, stack: Stack<'d>) -> Self {
        Self {
            controller,
            stack,
            phase: Phase::AwaitingAddress,
        }
    }
}

impl WifiLink for EspWifiLink<'_> {
    async fn start(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        let client_config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(String::from(credentials.ssid))
                .with_password(String::from(credentials.password)),
        );

        self.controller.set_config(&client_config).map_err(|e| {
            log::warn!("Wi-Fi: set_config error: {:?}", e);
            LinkError::InvalidConfig
        })?;
        self.controller.start_async().await.map_err(|e| {
            log::warn!("Wi-Fi: start error: {:?}", e);
            LinkError::StartFailed
        })?;

        self.phase = Phase::Starting;
        Ok(())
    }

    fn connect(&mut self) -> Result<(), LinkError> {
        self.controller.connect().map_err(|e| {
            log::warn!("Wi-Fi: connect error: {:?}", e);
            LinkError::ConnectRejected
        })
    }

    async fn next_event(&mut self) -> LinkEvent {
        loop {
            match self.phase {
                Phase::Starting => {
                    self.phase = Phase::AwaitingAddress;
                    return LinkEvent::Started;
                }
                Phase::Addressed => {
                    self.controller
                        .wait_for_event(WifiEvent::StaDisconnected)
                        .await;
                    self.phase = Phase::Draining;
                    return LinkEvent::Disconnected;
                }
                // The stack keeps the old config until its runner sees the
                // link go down; an address is only taken once it is gone
                Phase::Draining => {
                    match select(
                        self.controller.wait_for_event(WifiEvent::StaDisconnected),
                        self.stack.wait_config_down(),
                    )
                    .await
                    {
                        Either::First(()) => return LinkEvent::Disconnected,
                        Either::Second(()) => self.phase = Phase::AwaitingAddress,
                    }
                }
                Phase::AwaitingAddress => {
                    match select(
                        self.controller.wait_for_event(WifiEvent::StaDisconnected),
                        self.stack.wait_config_up(),
                    )
                    .await
                    {
                        Either::First(()) => return LinkEvent::Disconnected,
                        Either::Second(()) => {
                            if let Some(config) = self.stack.config_v4() {
                                self.phase = Phase::Addressed;
                                return LinkEvent::GotAddress(config.address.address().octets());
                            }
                        }
                    }
                }
            }
        }
    }
}
