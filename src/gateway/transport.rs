//! Transport traits for the remote repository
//!
//! A [`Connector`] opens fresh [`RemoteSession`]s. Each session is already
//! logged in and positioned in the configured remote directory, and is
//! owned by exactly one caller until it is closed.

use crate::config::RepositoryConfig;
use crate::error::TransportError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use std::path::Path;

/// Opens sessions against the remote repository
///
/// Implementations perform the whole connection handshake in [`open`]:
/// connect, optional explicit TLS upgrade, login, and change into
/// `config.remote_directory`. Every call returns an independent session.
///
/// [`open`]: Connector::open
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a session positioned in the configured remote directory
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MissingFile`] if the remote directory does
    /// not exist, and a connect, protocol, or I/O error for everything else.
    async fn open(
        &self,
        config: &RepositoryConfig,
    ) -> Result<Box<dyn RemoteSession>, TransportError>;
}

/// One open session on the remote repository
#[async_trait]
pub trait RemoteSession: Send {
    /// List the current remote directory
    async fn list(&mut self) -> Result<Vec<RemoteEntry>, TransportError>;

    /// Copy `remote_name` into the local file `local_path`
    ///
    /// Returns the number of bytes written. A file the server reports as
    /// unavailable yields [`TransportError::MissingFile`].
    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, TransportError>;

    /// End the session
    async fn close(&mut self) -> Result<(), TransportError>;
}
