use csm_api::{FolderServiceClient, SecretManagerServiceClient, SecretServiceClient};

use crate::transport::Connection;

/// Service client that can be bound to an existing connection.
pub trait Stub<C> {
    fn bind(connection: C) -> Self;
}

impl<C: Connection> Stub<C> for SecretManagerServiceClient<C> {
    fn bind(connection: C) -> Self {
        Self::new(connection)
    }
}

impl<C: Connection> Stub<C> for FolderServiceClient<C> {
    fn bind(connection: C) -> Self {
        Self::new(connection)
    }
}

impl<C: Connection> Stub<C> for SecretServiceClient<C> {
    fn bind(connection: C) -> Self {
        Self::new(connection)
    }
}
