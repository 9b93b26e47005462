//! Trust anchors per remote endpoint
//!
//! The manifest host and the artifact host are verified against separate
//! certificate bundles. Each anchor remembers which endpoint it belongs to so
//! a call site cannot hand the wrong one to a transport unnoticed.

use crate::config;

/// Remote endpoints contacted by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Host answering the update-check query
    ManifestHost,
    /// Host serving firmware images
    ArtifactHost,
}

/// PEM certificate bundle bound to one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustAnchor {
    endpoint: Endpoint,
    pem: &'static str,
}

impl TrustAnchor {
    const PEM_HEADER: &'static str = "-----BEGIN CERTIFICATE-----";

    /// Bind a PEM bundle to an endpoint
    pub const fn new(endpoint: Endpoint, pem: &'static str) -> Self {
        Self { endpoint, pem }
    }

    /// Endpoint this anchor verifies
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// PEM text of the bundle
    pub fn pem(&self) -> &'static str {
        self.pem
    }

    /// Returns true if the bundle holds at least one certificate
    pub fn has_certificate(&self) -> bool {
        self.pem.contains(Self::PEM_HEADER)
    }
}

/// Mapping from endpoint to its trust anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustAnchors {
    manifest: TrustAnchor,
    artifact: TrustAnchor,
}

impl TrustAnchors {
    /// Build the mapping from the two PEM bundles
    pub const fn new(manifest_pem: &'static str, artifact_pem: &'static str) -> Self {
        Self {
            manifest: TrustAnchor::new(Endpoint::ManifestHost, manifest_pem),
            artifact: TrustAnchor::new(Endpoint::ArtifactHost, artifact_pem),
        }
    }

    /// Anchors baked into the firmware at build time
    pub const fn from_config() -> Self {
        Self::new(config::certs::MANIFEST_CA_PEM, config::certs::ARTIFACT_CA_PEM)
    }

    /// Anchor to use when contacting `endpoint`
    pub fn for_endpoint(&self, endpoint: Endpoint) -> TrustAnchor {
        match endpoint {
            Endpoint::ManifestHost => self.manifest,
            Endpoint::ArtifactHost => self.artifact,
        }
    }
    /// First endpoint whose bundle holds no certificate
    pub fn without_certificate(&self) -> Option<Endpoint> {
        [self.manifest, self.artifact]
            .into_iter()
            .find(|anchor| !anchor.has_certificate())
            .map(|anchor| anchor.endpoint())
    }
}
