//! Top-level agent task
//!
//! Builds the connection manager on the shared statics, brings the link up
//! and only then starts the timer, update and version tasks.

use embassy_futures::join::join3;

use super::{check_timer_task, update_task, version_report_task, CHECK_TRIGGER, CONNECTION_STATUS};
use crate::agent::run_agent;
use crate::connection::{ConnectionManager, ConnectionState, Credentials, WifiLink};
use crate::coordinator::UpdateCoordinator;
use crate::install::{DeviceControl, FirmwareInstaller};
use crate::manifest::HttpTransport;

/// Run the whole agent on `link`
///
/// `coordinator` must consume from [`super::UPDATE_EVENTS`], the channel
/// [`CHECK_TRIGGER`] posts to.
pub async fn agent_task<L, H, I, D>(
    link: L,
    credentials: Credentials,
    coordinator: UpdateCoordinator<'static, H, I, D>,
) where
    L: WifiLink,
    H: HttpTransport,
    I: FirmwareInstaller,
    D: DeviceControl,
{
    let mut manager = ConnectionManager::new(link, &CONNECTION_STATUS);
    if manager.on_transition(&CHECK_TRIGGER).is_err() {
        log::error!("Agent: no room for the check trigger listener");
        return;
    }

    let services = async {
        join3(
            check_timer_task(&CHECK_TRIGGER),
            update_task(coordinator),
            version_report_task(),
        )
        .await;
    };

    match run_agent(&mut manager, &credentials, services).await {
        Ok(ConnectionState::Connected) => log::warn!("Agent: update services stopped"),
        Ok(state) => log::error!("Agent: link settled as {:?}, no update checks", state),
        Err(e) => log::error!("Agent: station start failed ({:?}), link stays down", e),
    }
}
