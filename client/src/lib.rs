//! Connection bootstrap for the secret manager gRPC API.
//!
//! [`Client`] dials one connection, plaintext or TLS 1.3, and binds the
//! legacy `v1` stub and the `v2` folder and secret stubs to it.
//!
//! ```no_run
//! use csm_client::{Client, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("secretmanager.api.cloud.ru:443");
//! let mut client = Client::new(Some(&config), Vec::new())?;
//!
//! let folders = client
//!     .v2
//!     .folder_service
//!     .list(csm_client::api::v2::ListFoldersRequest::default())
//!     .await?;
//! println!("{} folders", folders.into_inner().folders.len());
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod options;
pub mod stub;
pub mod transport;

#[cfg(test)]
mod mock;

pub use csm_api as api;

pub use client::{Client, V2};
pub use config::{Config, DEFAULT_HOST};
pub use credentials::{TlsVersion, TransportCredentials};
pub use error::{ClientError, Result};
pub use options::{DialOption, effective_credentials};
pub use stub::Stub;
pub use transport::{Connection, TonicTransport, Transport};
