//! Update task running the coordinator

use crate::coordinator::UpdateCoordinator;
use crate::install::{DeviceControl, FirmwareInstaller};
use crate::manifest::HttpTransport;

/// Process update events until the device restarts
pub async fn update_task<H, I, D, const N: usize>(
    mut coordinator: UpdateCoordinator<'static, H, I, D, N>,
) where
    H: HttpTransport,
    I: FirmwareInstaller,
    D: DeviceControl,
{
    log::info!("Update: waiting for check requests");
    coordinator.run().await;
}
