use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore, SupportedProtocolVersion};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Lowest TLS protocol version a connection may negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    Tls12,
    #[default]
    Tls13,
}

impl TlsVersion {
    pub(crate) fn protocol_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsVersion::Tls12 => rustls::ALL_VERSIONS,
            TlsVersion::Tls13 => TLS13_ONLY,
        }
    }
}

/// How the transport authenticates and encrypts the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCredentials {
    /// Plaintext HTTP/2, nothing is verified.
    Insecure,
    /// TLS verified against the system trust roots.
    Tls { min_version: TlsVersion },
}

impl TransportCredentials {
    /// Credentials the client injects for `config`: plaintext when insecure,
    /// otherwise TLS 1.3 or newer.
    pub fn for_config(config: &Config) -> Self {
        if config.insecure {
            TransportCredentials::Insecure
        } else {
            TransportCredentials::Tls {
                min_version: TlsVersion::Tls13,
            }
        }
    }

    pub fn verifies_peer(&self) -> bool {
        matches!(self, TransportCredentials::Tls { .. })
    }
}

/// Builds the rustls configuration for a TLS connection.
///
/// Roots come from the platform store. Certificates that fail to load are
/// logged and skipped, so an empty store still yields a config whose
/// handshakes will fail verification.
pub(crate) fn tls_client_config(min_version: TlsVersion) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        warn!("Failed to load native root certificate: {}", error);
    }
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    debug!(added, ignored, "Loaded native root certificates");

    let config = ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(min_version.protocol_versions())?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}
