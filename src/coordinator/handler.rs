//! Update coordinator
//!
//! Single consumer of the event channel. Each `CheckRequested` runs one
//! complete sequence (fetch manifest, install, restart) before the next event
//! is taken, so two sequences never overlap. Every failure is logged and the
//! coordinator returns to `Idle`; the next check starts from scratch.

use crate::config;
use crate::events::{EventChannel, UpdateEvent};
use crate::install::traits::{DeviceControl, FirmwareInstaller, InstallError};
use crate::manifest::fetcher::{
    FetchError, Manifest, ManifestDefect, ManifestFetcher, ManifestQuery,
};
use crate::manifest::traits::{HttpTransport, TransportError};
use crate::trust::{Endpoint, TrustAnchors};

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Waiting for the next event
    Idle,
    /// Manifest request in flight
    Fetching,
    /// Installer downloading and flashing the new image
    ///
    /// Download and flash happen in one installer call, so there is no
    /// separate downloading state.
    Installing,
    /// Restart issued, no further events are processed
    Rebooting,
}

/// Why an update sequence was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// Manifest host could not be reached
    Transport(TransportError),
    /// Manifest host answered with an unexpected status
    Protocol(u16),
    /// Manifest body was unusable
    Decode(ManifestDefect),
    /// Installer failed, running image unchanged
    Install(InstallError),
}

impl From<FetchError> for UpdateError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Transport(e) => Self::Transport(e),
            FetchError::UnexpectedStatus(code) => Self::Protocol(code),
            FetchError::InvalidManifest(defect) => Self::Decode(defect),
        }
    }
}

impl From<InstallError> for UpdateError {
    fn from(error: InstallError) -> Self {
        Self::Install(error)
    }
}

/// How one update sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Running firmware is current
    NoUpdate,
    /// Sequence aborted, back to idle
    Failed(UpdateError),
    /// New image installed and restart issued
    Restarting,
}

/// Update coordinator
///
/// Owns the fetcher (and with it the manifest buffer), the installer and the
/// device handle. Only the task running the coordinator touches them.
pub struct UpdateCoordinator<'a, H, I, D, const N: usize = { config::events::CHANNEL_CAPACITY }>
where
    H: HttpTransport,
    I: FirmwareInstaller,
    D: DeviceControl,
{
    events: &'a EventChannel<N>,
    fetcher: ManifestFetcher<H>,
    installer: I,
    device: D,
    anchors: TrustAnchors,
    query: ManifestQuery,
    state: CoordinatorState,
}

impl<'a, H, I, D, const N: usize> UpdateCoordinator<'a, H, I, D, N>
where
    H: HttpTransport,
    I: FirmwareInstaller,
    D: DeviceControl,
{
    /// Create a coordinator using the configured query and trust anchors
    pub fn new(events: &'a EventChannel<N>, transport: H, installer: I, device: D) -> Self {
        Self {
            events,
            fetcher: ManifestFetcher::new(transport),
            installer,
            device,
            anchors: checked_anchors(TrustAnchors::from_config()),
            query: ManifestQuery::default(),
            state: CoordinatorState::Idle,
        }
    }

    /// Replace the trust anchors
    ///
    /// A bundle without certificates is accepted; the transport for that
    /// endpoint then decides how to verify the server.
    pub fn with_trust_anchors(mut self, anchors: TrustAnchors) -> Self {
        self.anchors = checked_anchors(anchors);
        self
    }

    /// Replace the manifest query
    pub fn with_query(mut self, query: ManifestQuery) -> Self {
        self.query = query;
        self
    }

    /// Process events until a restart has been issued
    pub async fn run(&mut self) {
        loop {
            if self.process_next().await == SequenceOutcome::Restarting {
                return;
            }
        }
    }

    /// Wait for the next event and process it
    pub async fn process_next(&mut self) -> SequenceOutcome {
        let event = self.events.receive().await;
        self.handle(event).await
    }

    /// Run the update sequence for one event
    pub async fn handle(&mut self, event: UpdateEvent) -> SequenceOutcome {
        if self.state == CoordinatorState::Rebooting {
            log::warn!("Update: restart already issued, ignoring {:?}", event);
            return SequenceOutcome::Restarting;
        }

        let UpdateEvent::CheckRequested { source } = event;
        log::info!("Update: check requested ({:?})", source);

        match self.check_and_install().await {
            Ok(SequenceOutcome::Restarting) => {
                log::info!("Update: firmware installed, restarting");
                self.state = CoordinatorState::Rebooting;
                self.device.restart();
                SequenceOutcome::Restarting
            }
            Ok(outcome) => {
                self.state = CoordinatorState::Idle;
                outcome
            }
            Err(error) => {
                match error {
                    UpdateError::Install(e) => {
                        log::error!("Update: install failed ({:?}), keeping current firmware", e)
                    }
                    other => log::error!("Update: manifest check failed ({:?})", other),
                }
                self.state = CoordinatorState::Idle;
                SequenceOutcome::Failed(error)
            }
        }
    }

    /// Current state
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Access the manifest transport
    pub fn transport(&self) -> &H {
        self.fetcher.transport()
    }

    async fn check_and_install(&mut self) -> Result<SequenceOutcome, UpdateError> {
        self.state = CoordinatorState::Fetching;

        let query_url = self
            .query
            .url()
            .map_err(|_| UpdateError::Transport(TransportError::InvalidUrl))?;
        let manifest = self
            .fetcher
            .fetch_manifest(&query_url, self.anchors.for_endpoint(Endpoint::ManifestHost))
            .await?;

        let download_url = match manifest {
            Manifest::NoUpdate => {
                log::info!("Update: no update available");
                return Ok(SequenceOutcome::NoUpdate);
            }
            Manifest::Available { download_url } => download_url,
        };

        self.state = CoordinatorState::Installing;
        log::info!("Update: installing firmware from {}", download_url);
        self.installer
            .install(
                &download_url,
                self.anchors.for_endpoint(Endpoint::ArtifactHost),
                config::http::INTERNAL_RX_BUFFER_SIZE,
                config::http::INTERNAL_TX_BUFFER_SIZE,
            )
            .await?;

        Ok(SequenceOutcome::Restarting)
    }
}

fn checked_anchors(anchors: TrustAnchors) -> TrustAnchors {
    if let Some(endpoint) = anchors.without_certificate() {
        log::warn!("Update: no CA certificate configured for {:?}", endpoint);
    }
    anchors
}
