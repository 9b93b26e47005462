//! ESP32-S3 implementations of the agent's hardware seams

pub mod logging;
pub mod system;
pub mod wifi;

pub use system::EspSystem;
pub use wifi::EspWifiLink;
