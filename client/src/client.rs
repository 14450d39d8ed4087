use csm_api::{FolderServiceClient, SecretManagerServiceClient, SecretServiceClient};
use tonic::transport::Channel;
use tracing::{debug, info};

use crate::config::Config;
use crate::credentials::TransportCredentials;
use crate::error::{ClientError, Result};
use crate::options::DialOption;
use crate::stub::Stub;
use crate::transport::{Connection, TonicTransport, Transport};

/// gRPC client of the secret manager.
///
/// Owns a single connection shared by every service stub. Stubs are clones
/// over that connection and may be used concurrently.
#[derive(Debug)]
pub struct Client<C = Channel> {
    connection: C,

    /// Version 2 of the API.
    pub v2: V2<C>,

    #[deprecated(note = "use `v2.secret_service` instead")]
    pub secret_service: SecretManagerServiceClient<C>,
}

/// Version 2 of the API.
#[derive(Debug, Clone)]
pub struct V2<C = Channel> {
    pub folder_service: FolderServiceClient<C>,
    pub secret_service: SecretServiceClient<C>,
}

impl Client<Channel> {
    /// Creates a client over a lazily connecting tonic channel.
    ///
    /// Must be called inside a Tokio runtime. See [`Client::with_transport`].
    pub fn new<I>(config: Option<&Config>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = DialOption>,
    {
        Self::with_transport(&TonicTransport, config, options)
    }
}

impl<C: Connection> Client<C> {
    /// Creates a client over a connection built by `transport`.
    ///
    /// The credentials chosen from `config` are appended after the caller's
    /// `options`, so they take effect over any credentials passed there.
    /// Errors from the transport are returned unchanged.
    #[allow(deprecated)]
    pub fn with_transport<T, I>(transport: &T, config: Option<&Config>, options: I) -> Result<Self>
    where
        T: Transport<Connection = C>,
        I: IntoIterator<Item = DialOption>,
    {
        let config = match config {
            Some(config) if !config.is_empty() => config,
            _ => return Err(ClientError::EmptyConfig),
        };

        let credentials = TransportCredentials::for_config(config);
        debug!(host = %config.host, ?credentials, "Selected transport credentials");

        let mut options: Vec<DialOption> = options.into_iter().collect();
        options.push(DialOption::TransportCredentials(credentials));

        let connection = transport.dial(&config.host, &options)?;
        info!(host = %config.host, insecure = config.insecure, "Created secret manager client");

        Ok(Self {
            v2: V2 {
                folder_service: Stub::bind(connection.clone()),
                secret_service: Stub::bind(connection.clone()),
            },
            secret_service: Stub::bind(connection.clone()),
            connection,
        })
    }

    /// Closes the connection. Every stub of this client goes with it.
    pub fn close(self) -> Result<()> {
        let Self { connection, .. } = self;
        connection.close()?;
        info!("Closed secret manager client");
        Ok(())
    }
}
