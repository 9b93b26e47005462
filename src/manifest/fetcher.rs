//! Update manifest fetcher
//!
//! Performs the update-check request, collects the body into a capped buffer
//! and extracts the firmware download URL.
//!
//! # Manifest format
//!
//! - `204 No Content`: the device already runs the latest firmware.
//! - `200 OK` with a JSON object body:
//!
//! ```text
//! { "download_url": "https://cdn.example.com/firmware-1.2.0.bin", ... }
//! ```
//!
//! Other members are ignored. Any other status is an error.

use alloc::string::String;
use core::fmt::Write;

use serde_json::Value;

use crate::config;
use crate::manifest::buffer::ResponseBuffer;
use crate::manifest::traits::{HttpTransport, TransportError};
use crate::trust::TrustAnchor;

/// Manifest member holding the firmware location
const DOWNLOAD_URL_FIELD: &str = "download_url";

/// Classification of the manifest response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    /// 204: nothing newer is available
    NoUpdate,
    /// 200: a manifest document follows
    Available,
    /// Anything else
    Other(u16),
}

impl ManifestStatus {
    /// Classify an HTTP status code
    pub fn from_code(code: u16) -> Self {
        match code {
            204 => Self::NoUpdate,
            200 => Self::Available,
            other => Self::Other(other),
        }
    }
}

/// Decoded update manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// Running firmware is current
    NoUpdate,
    /// A newer build can be downloaded from `download_url`
    Available { download_url: String },
}

impl Manifest {
    /// Status the manifest was decoded from
    pub fn status(&self) -> ManifestStatus {
        match self {
            Self::NoUpdate => ManifestStatus::NoUpdate,
            Self::Available { .. } => ManifestStatus::Available,
        }
    }

    /// Firmware location, if an update is available
    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::NoUpdate => None,
            Self::Available { download_url } => Some(download_url.as_str()),
        }
    }
}

/// Why a 200 response was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestDefect {
    /// Body filled or overran the receive buffer
    Truncated,
    /// Chunked transfer encoding is not supported
    Chunked,
    /// Body is not a JSON document
    Malformed,
    /// Document has no download URL member
    MissingDownloadUrl,
    /// Download URL member is not a string
    DownloadUrlNotString,
}

/// Errors from a manifest fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// No response was received
    Transport(TransportError),
    /// Response status was neither 200 nor 204
    UnexpectedStatus(u16),
    /// 200 response whose body could not be used
    InvalidManifest(ManifestDefect),
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

/// Query URL did not fit in its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTooLong;

/// Parameters of the update-check request
///
/// The server decides from the account, repository and running version
/// whether a newer build exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestQuery {
    pub base_url: &'static str,
    pub endpoint: &'static str,
    pub account: &'static str,
    pub repository: &'static str,
    pub current_version: &'static str,
}

impl ManifestQuery {
    /// Build the request URL with percent-encoded query parameters
    pub fn url(
        &self,
    ) -> Result<heapless::String<{ config::update::MAX_QUERY_URL_LEN }>, QueryTooLong> {
        let mut url = heapless::String::new();
        url.push_str(self.base_url).map_err(|_| QueryTooLong)?;
        url.push_str(self.endpoint).map_err(|_| QueryTooLong)?;

        let params = [
            ("github_username", self.account),
            ("github_repository", self.repository),
            ("device_current_fw_version", self.current_version),
        ];
        for (i, (name, value)) in params.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            url.push(separator).map_err(|_| QueryTooLong)?;
            url.push_str(name).map_err(|_| QueryTooLong)?;
            url.push('=').map_err(|_| QueryTooLong)?;
            push_percent_encoded(&mut url, value)?;
        }

        Ok(url)
    }
}

impl Default for ManifestQuery {
    fn default() -> Self {
        Self {
            base_url: config::update::BASE_URL,
            endpoint: config::update::ENDPOINT,
            account: config::update::ACCOUNT,
            repository: config::update::REPOSITORY,
            current_version: config::update::CURRENT_VERSION,
        }
    }
}

/// Append `value` keeping only RFC 3986 unreserved characters literal
fn push_percent_encoded<const L: usize>(
    url: &mut heapless::String<L>,
    value: &str,
) -> Result<(), QueryTooLong> {
    for byte in value.bytes() {
        let unreserved = byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~');
        if unreserved {
            url.push(byte as char).map_err(|_| QueryTooLong)?;
        } else {
            write!(url, "%{:02X}", byte).map_err(|_| QueryTooLong)?;
        }
    }
    Ok(())
}

/// Update manifest fetcher
///
/// Owns the transport and the receive buffer; both are only used from the
/// task that owns the fetcher.
pub struct ManifestFetcher<H, const N: usize = { config::http::APP_RX_BUFFER_SIZE }>
where
    H: HttpTransport,
{
    transport: H,
    buffer: ResponseBuffer<N>,
}

impl<H: HttpTransport, const N: usize> ManifestFetcher<H, N> {
    /// Create a fetcher over the given transport
    pub fn new(transport: H) -> Self {
        Self {
            transport,
            buffer: ResponseBuffer::new(),
        }
    }

    /// Fetch and decode the update manifest
    pub async fn fetch_manifest(
        &mut self,
        url: &str,
        trust_anchor: TrustAnchor,
    ) -> Result<Manifest, FetchError> {
        self.buffer.clear();

        let response = self
            .transport
            .get(url, trust_anchor, &mut self.buffer)
            .await?;

        log::info!(
            "Manifest: status = {}, content_length = {:?}, received = {}",
            response.status,
            response.content_length,
            self.buffer.received()
        );

        match ManifestStatus::from_code(response.status) {
            ManifestStatus::NoUpdate => {
                log::info!("Manifest: device is already running the latest firmware");
                Ok(Manifest::NoUpdate)
            }
            ManifestStatus::Available => {
                if response.chunked {
                    log::warn!("Manifest: chunked response not supported, aborting");
                    return Err(FetchError::InvalidManifest(ManifestDefect::Chunked));
                }
                let download_url = decode_download_url(&self.buffer)
                    .map_err(FetchError::InvalidManifest)?;
                log::info!("Manifest: download_url length: {}", download_url.len());
                Ok(Manifest::Available { download_url })
            }
            ManifestStatus::Other(code) => {
                log::warn!("Manifest: unexpected status {}", code);
                Err(FetchError::UnexpectedStatus(code))
            }
        }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &H {
        &self.transport
    }
}

/// Extract the download URL from a buffered manifest body
fn decode_download_url<const N: usize>(
    buffer: &ResponseBuffer<N>,
) -> Result<String, ManifestDefect> {
    if buffer.is_saturated() {
        log::warn!(
            "Manifest: body of {} bytes does not fit in {} byte buffer, aborting",
            buffer.received(),
            buffer.capacity()
        );
        return Err(ManifestDefect::Truncated);
    }

    let document: Value = serde_json::from_slice(buffer.as_slice()).map_err(|_| {
        log::warn!("Manifest: response does not contain valid json, aborting");
        ManifestDefect::Malformed
    })?;

    match document.get(DOWNLOAD_URL_FIELD) {
        Some(Value::String(url)) => Ok(url.clone()),
        Some(_) => {
            log::warn!("Manifest: download_url is not a string, aborting");
            Err(ManifestDefect::DownloadUrlNotString)
        }
        None => {
            log::warn!("Manifest: unable to read the download_url, aborting");
            Err(ManifestDefect::MissingDownloadUrl)
        }
    }
}
