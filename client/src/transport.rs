use std::time::Duration;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use tonic::body::Body;
use tonic::client::GrpcService;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::credentials::{TlsVersion, TransportCredentials, tls_client_config};
use crate::error::{ClientError, Result};
use crate::options::{DialOption, effective_credentials};

/// Resolver prefixes accepted in gRPC targets; tonic wants a plain URI.
const RESOLVER_PREFIXES: [&str; 2] = ["dns:///", "passthrough:///"];

/// A multiplexed connection service stubs issue their calls over.
pub trait Connection: GrpcService<Body, ResponseBody = Body> + Clone + Send + 'static {
    /// Releases the connection and its background resources.
    fn close(self) -> Result<()>;
}

/// Builds connections from a target address and dial options.
pub trait Transport {
    type Connection: Connection;

    fn dial(&self, target: &str, options: &[DialOption]) -> Result<Self::Connection>;
}

impl Connection for Channel {
    fn close(self) -> Result<()> {
        // The channel worker stops once its last handle is dropped.
        drop(self);
        Ok(())
    }
}

/// Transport backed by a lazily connecting tonic [`Channel`].
///
/// Dialing spawns the channel's worker, so it must happen inside a Tokio
/// runtime. No network I/O happens until the first call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonicTransport;

impl Transport for TonicTransport {
    type Connection = Channel;

    fn dial(&self, target: &str, options: &[DialOption]) -> Result<Channel> {
        let credentials = effective_credentials(options)
            .cloned()
            .unwrap_or(TransportCredentials::Tls {
                min_version: TlsVersion::default(),
            });
        let uri = endpoint_uri(target, &credentials)?;

        let mut endpoint = Endpoint::from_shared(uri.clone())?;
        let mut tcp = TcpSettings::default();
        for option in options {
            endpoint = apply_option(endpoint, option, &mut tcp)?;
        }

        match credentials {
            TransportCredentials::Insecure => {
                debug!(%uri, "Dialing without transport security");
                Ok(endpoint.connect_lazy())
            }
            TransportCredentials::Tls { min_version } => {
                debug!(%uri, ?min_version, "Dialing over TLS");
                let connector = https_connector(min_version, &tcp)?;
                Ok(endpoint.connect_with_connector_lazy(connector))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TcpSettings {
    nodelay: bool,
    keepalive: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            nodelay: true,
            keepalive: None,
            connect_timeout: None,
        }
    }
}

fn apply_option(endpoint: Endpoint, option: &DialOption, tcp: &mut TcpSettings) -> Result<Endpoint> {
    let endpoint = match option {
        DialOption::TransportCredentials(_) => endpoint,
        DialOption::ConnectTimeout(timeout) => {
            tcp.connect_timeout = Some(*timeout);
            endpoint.connect_timeout(*timeout)
        }
        DialOption::Timeout(timeout) => endpoint.timeout(*timeout),
        DialOption::UserAgent(user_agent) => endpoint.user_agent(user_agent.as_str())?,
        DialOption::Origin(origin) => endpoint.origin(origin.clone()),
        DialOption::TcpNodelay(enabled) => {
            tcp.nodelay = *enabled;
            endpoint.tcp_nodelay(*enabled)
        }
        DialOption::TcpKeepalive(interval) => {
            tcp.keepalive = *interval;
            endpoint.tcp_keepalive(*interval)
        }
        DialOption::Http2KeepAliveInterval(interval) => endpoint.http2_keep_alive_interval(*interval),
        DialOption::KeepAliveTimeout(timeout) => endpoint.keep_alive_timeout(*timeout),
        DialOption::KeepAliveWhileIdle(enabled) => endpoint.keep_alive_while_idle(*enabled),
        DialOption::ConcurrencyLimit(limit) => endpoint.concurrency_limit(*limit),
        DialOption::BufferSize(size) => endpoint.buffer_size(*size),
        DialOption::InitialStreamWindowSize(size) => endpoint.initial_stream_window_size(*size),
        DialOption::InitialConnectionWindowSize(size) => {
            endpoint.initial_connection_window_size(*size)
        }
    };
    Ok(endpoint)
}

fn https_connector(
    min_version: TlsVersion,
    tcp: &TcpSettings,
) -> Result<HttpsConnector<HttpConnector>> {
    let tls = tls_client_config(min_version)?;

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_nodelay(tcp.nodelay);
    http.set_keepalive(tcp.keepalive);
    http.set_connect_timeout(tcp.connect_timeout);

    Ok(HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_only()
        .enable_http2()
        .wrap_connector(http))
}

/// Turns a gRPC target such as `dns:///host:443` or `host:443` into the URI
/// tonic dials, choosing the scheme from the credentials.
fn endpoint_uri(target: &str, credentials: &TransportCredentials) -> Result<String> {
    let target = target.trim();
    let target = RESOLVER_PREFIXES
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
        .unwrap_or(target);

    if target.contains("://") {
        let verifies_peer = credentials.verifies_peer();
        if verifies_peer && target.starts_with("http://") {
            return Err(ClientError::TlsSchemeMismatch(target.to_string()));
        }
        if !verifies_peer && target.starts_with("https://") {
            return Err(ClientError::InsecureSchemeMismatch(target.to_string()));
        }
        return Ok(target.to_string());
    }

    let scheme = match credentials {
        TransportCredentials::Insecure => "http",
        TransportCredentials::Tls { .. } => "https",
    };
    Ok(format!("{scheme}://{target}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tls() -> TransportCredentials {
        TransportCredentials::Tls {
            min_version: TlsVersion::Tls13,
        }
    }

    #[test]
    fn test_endpoint_uri_adds_scheme() {
        assert_eq!(
            endpoint_uri("secretmanager.api.cloud.ru:443", &tls()).unwrap(),
            "https://secretmanager.api.cloud.ru:443"
        );
        assert_eq!(
            endpoint_uri("localhost:50051", &TransportCredentials::Insecure).unwrap(),
            "http://localhost:50051"
        );
    }

    #[test]
    fn test_endpoint_uri_strips_resolver_prefix() {
        assert_eq!(
            endpoint_uri("dns:///csm.internal:443", &tls()).unwrap(),
            "https://csm.internal:443"
        );
        assert_eq!(
            endpoint_uri("passthrough:///10.0.0.1:8080", &TransportCredentials::Insecure).unwrap(),
            "http://10.0.0.1:8080"
        );
    }

    #[test]
    fn test_endpoint_uri_keeps_matching_explicit_scheme() {
        assert_eq!(
            endpoint_uri("https://csm.internal", &tls()).unwrap(),
            "https://csm.internal"
        );
        assert_eq!(
            endpoint_uri("http://localhost:50051", &TransportCredentials::Insecure).unwrap(),
            "http://localhost:50051"
        );
    }

    #[test]
    fn test_endpoint_uri_rejects_https_without_tls() {
        let err = endpoint_uri("https://csm.internal", &TransportCredentials::Insecure).unwrap_err();
        assert!(
            matches!(err, ClientError::InsecureSchemeMismatch(uri) if uri == "https://csm.internal")
        );
    }

    #[tokio::test]
    async fn test_dial_insecure_rejects_https_target() {
        let options = [DialOption::TransportCredentials(TransportCredentials::Insecure)];
        let err = TonicTransport.dial("dns:///https://csm.internal:443", &options).unwrap_err();
        assert!(matches!(err, ClientError::InsecureSchemeMismatch(_)));

        let err = TonicTransport.dial("https://csm.internal:443", &options).unwrap_err();
        assert!(matches!(err, ClientError::InsecureSchemeMismatch(_)));
    }

    #[test]
    fn test_endpoint_uri_rejects_plain_http_with_tls() {
        let err = endpoint_uri("http://csm.internal:80", &tls()).unwrap_err();
        assert!(matches!(err, ClientError::TlsSchemeMismatch(uri) if uri == "http://csm.internal:80"));
    }

    #[tokio::test]
    async fn test_dial_insecure_is_lazy() {
        let options = [DialOption::TransportCredentials(TransportCredentials::Insecure)];
        // Nothing listens on port 1; a lazy dial still succeeds.
        let channel = TonicTransport.dial("127.0.0.1:1", &options).unwrap();
        assert!(channel.close().is_ok());
    }

    #[tokio::test]
    async fn test_dial_tls_is_lazy() {
        let options = [
            DialOption::ConnectTimeout(Duration::from_secs(1)),
            DialOption::TcpKeepalive(Some(Duration::from_secs(30))),
            DialOption::TransportCredentials(tls()),
        ];
        let channel = TonicTransport.dial("localhost:1", &options).unwrap();
        assert!(channel.close().is_ok());
    }

    #[tokio::test]
    async fn test_dial_rejects_invalid_address() {
        let options = [DialOption::TransportCredentials(TransportCredentials::Insecure)];
        let err = TonicTransport.dial("not a host", &options).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_dial_applies_caller_options() {
        let options = [
            DialOption::UserAgent("bad\nagent".to_string()),
            DialOption::TransportCredentials(TransportCredentials::Insecure),
        ];
        let err = TonicTransport.dial("127.0.0.1:1", &options).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
