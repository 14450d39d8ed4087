use std::time::Duration;

use http::Uri;

use crate::credentials::TransportCredentials;

/// Transport-level option applied when the connection is built.
///
/// Options are applied in order, so when an option appears more than once the
/// last occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub enum DialOption {
    TransportCredentials(TransportCredentials),
    ConnectTimeout(Duration),
    /// Deadline applied to every request.
    Timeout(Duration),
    UserAgent(String),
    /// Overrides the `:authority` and scheme sent with requests.
    Origin(Uri),
    TcpNodelay(bool),
    TcpKeepalive(Option<Duration>),
    Http2KeepAliveInterval(Duration),
    KeepAliveTimeout(Duration),
    KeepAliveWhileIdle(bool),
    ConcurrencyLimit(usize),
    /// Capacity of the request buffer in front of the connection.
    BufferSize(usize),
    InitialStreamWindowSize(u32),
    InitialConnectionWindowSize(u32),
}

/// Credentials the transport will use for `options`.
pub fn effective_credentials(options: &[DialOption]) -> Option<&TransportCredentials> {
    options.iter().rev().find_map(|option| match option {
        DialOption::TransportCredentials(creds) => Some(creds),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::TlsVersion;

    #[test]
    fn test_no_credentials() {
        let options = vec![DialOption::ConnectTimeout(Duration::from_secs(5))];
        assert_eq!(effective_credentials(&options), None);
    }

    #[test]
    fn test_last_credentials_win() {
        let options = vec![
            DialOption::TransportCredentials(TransportCredentials::Tls {
                min_version: TlsVersion::Tls12,
            }),
            DialOption::UserAgent("csm-test".to_string()),
            DialOption::TransportCredentials(TransportCredentials::Insecure),
        ];
        assert_eq!(
            effective_credentials(&options),
            Some(&TransportCredentials::Insecure)
        );
    }
}
