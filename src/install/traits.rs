//! Firmware installer and device control traits
//!
//! The platform primitive that downloads, verifies and flashes an image is
//! consumed through [`FirmwareInstaller`]. Restarting the device is a separate
//! seam so the restart can be observed in tests.

use crate::trust::TrustAnchor;
use core::future::Future;

/// Errors reported by the installer
///
/// In every case the previously running image stays authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    /// Image could not be downloaded
    Transport,
    /// Server answered with something other than an image
    UnexpectedStatus(u16),
    /// Image failed validation (size, header, checksum or signature)
    ImageRejected,
    /// Writing the inactive partition failed
    FlashWrite,
    /// New partition could not be marked bootable
    Activation,
}

/// Apply a firmware image from a streamed download
pub trait FirmwareInstaller {
    /// Download the image at `url` and flash it
    ///
    /// Either the whole image is written and activated for the next boot, or
    /// an error is returned and the running image is untouched.
    fn install(
        &mut self,
        url: &str,
        trust_anchor: TrustAnchor,
        rx_buffer_size: usize,
        tx_buffer_size: usize,
    ) -> impl Future<Output = Result<(), InstallError>>;
}

/// Device-level operations
pub trait DeviceControl {
    /// Restart the device
    ///
    /// On hardware this does not return.
    fn restart(&mut self);
}
