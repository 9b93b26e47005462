pub mod traits;

pub use traits::{DeviceControl, FirmwareInstaller, InstallError};
