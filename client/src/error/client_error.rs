use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The configuration is missing or carries no host.
    #[error("empty config")]
    EmptyConfig,

    #[error(transparent)]
    Tls(#[from] rustls::Error),

    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),

    /// Failure reported by a custom [`Transport`](crate::Transport).
    #[error(transparent)]
    Dial(Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS credentials require an https endpoint, got {0}")]
    TlsSchemeMismatch(String),

    #[error("insecure credentials require an http endpoint, got {0}")]
    InsecureSchemeMismatch(String),
}
