//! Device control for the ESP32-S3

use crate::install::DeviceControl;

/// Handle for system-level operations
pub struct EspSystem;

impl DeviceControl for EspSystem {
    fn restart(&mut self) {
        log::info!("Rebooting...");
        esp_hal::system::software_reset()
    }
}
