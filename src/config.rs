//! Build-time configuration for the update agent
//!
//! String values can be overridden when building the firmware by setting the
//! environment variable named next to each constant.

/// Pick a build-time override or fall back to a default
const fn or_default(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}

/// Update-check endpoint and schedule
pub mod update {
    use super::or_default;

    /// Manifest service base URL (`OTA_BASE_URL`)
    pub const BASE_URL: &str = or_default(
        option_env!("OTA_BASE_URL"),
        "http://github-ota-api.herokuapp.com",
    );

    /// Path of the latest-firmware query (`OTA_ENDPOINT`)
    pub const ENDPOINT: &str = or_default(option_env!("OTA_ENDPOINT"), "/firmware/latest");

    /// Account owning the release artifacts (`OTA_ACCOUNT`)
    pub const ACCOUNT: &str = or_default(option_env!("OTA_ACCOUNT"), "kaizoku-oh");

    /// Repository publishing the releases (`OTA_REPOSITORY`)
    pub const REPOSITORY: &str = or_default(option_env!("OTA_REPOSITORY"), "pio-esp32-https-ota");

    /// Version of the running firmware (`OTA_FIRMWARE_VERSION`)
    pub const CURRENT_VERSION: &str = or_default(
        option_env!("OTA_FIRMWARE_VERSION"),
        env!("CARGO_PKG_VERSION"),
    );

    /// Interval between update checks while connected
    pub const CHECK_INTERVAL_MS: u64 = 30_000;

    /// Interval between running-version log lines
    pub const VERSION_REPORT_INTERVAL_MS: u64 = 1_000;

    /// Maximum length of the manifest request URL
    pub const MAX_QUERY_URL_LEN: usize = 256;
}

/// HTTP buffer sizes
pub mod http {
    /// Transport receive buffer handed to the installer
    pub const INTERNAL_RX_BUFFER_SIZE: usize = 1024;

    /// Transport transmit buffer handed to the installer
    pub const INTERNAL_TX_BUFFER_SIZE: usize = 1024;

    /// Application buffer holding the manifest body
    pub const APP_RX_BUFFER_SIZE: usize = 1024;
}

/// Connection manager limits
pub mod connection {
    /// Consecutive disconnects tolerated before the link is declared failed
    pub const MAX_RETRY: u8 = 5;

    /// Transition listeners that can be registered
    pub const MAX_LISTENERS: usize = 4;
}

/// Event channel sizing
pub mod events {
    /// Pending update events; further events are dropped
    pub const CHANNEL_CAPACITY: usize = 2;
}

/// Network credentials
pub mod wifi {
    use super::or_default;

    /// Network name (`WIFI_SSID`)
    pub const SSID: &str = or_default(option_env!("WIFI_SSID"), "");

    /// Network passphrase (`WIFI_PASSWORD`)
    pub const PASSWORD: &str = or_default(option_env!("WIFI_PASSWORD"), "");

    /// Maximum SSID length accepted by the radio
    pub const MAX_SSID_LEN: usize = 32;

    /// Maximum passphrase length accepted by the radio
    pub const MAX_PASSWORD_LEN: usize = 64;
}

/// Trust anchors, PEM encoded
pub mod certs {
    use super::or_default;

    /// CA bundle for the manifest host (`OTA_MANIFEST_CA_PEM`)
    pub const MANIFEST_CA_PEM: &str = or_default(option_env!("OTA_MANIFEST_CA_PEM"), "");

    /// CA bundle for the artifact host (`OTA_ARTIFACT_CA_PEM`)
    pub const ARTIFACT_CA_PEM: &str = or_default(option_env!("OTA_ARTIFACT_CA_PEM"), "");
}
