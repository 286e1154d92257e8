//! Remote repository gateway
//!
//! [`RemoteGateway::connect`] opens a [`Connection`] positioned in the
//! warning directory, retrying transient failures with exponential backoff.
//! A connection stages downloads in the local staging directory and consumes
//! each staged file exactly once through [`crate::staging`].
//!
//! Only failing to connect is reported as an error. Everything that goes
//! wrong on an open connection is logged and turned into an empty result.

pub mod ftp;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use ftp::FtpConnector;
pub use transport::{Connector, RemoteSession};

use crate::config::RepositoryConfig;
use crate::error::{Error, Result, TransportError};
use crate::retry::retry_with_backoff;
use crate::staging::{self, TextEncoding};
use crate::types::{RemoteEntry, STRUCTURED_DOCUMENT_SUFFIX, WarningId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Entry point to the remote warning repository
#[derive(Clone)]
pub struct RemoteGateway {
    config: Arc<RepositoryConfig>,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for RemoteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteGateway")
            .field("host", &self.config.host)
            .field("remote_directory", &self.config.remote_directory)
            .finish_non_exhaustive()
    }
}

impl RemoteGateway {
    /// Gateway speaking FTP to the configured repository
    pub fn new(config: RepositoryConfig) -> Self {
        Self::with_connector(config, Arc::new(FtpConnector::new()))
    }

    /// Gateway using a custom transport
    pub fn with_connector(config: RepositoryConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Repository settings this gateway was built with
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Open a connection positioned in the configured remote directory
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if host or directory are blank; no attempt is made
    /// - [`Error::Connection`] once the retry budget is spent
    pub async fn connect(&self) -> Result<Connection> {
        self.config.validate()?;

        let label = format!(
            "FTP connect/navigate to {}{}",
            self.config.host, self.config.remote_directory
        );
        let session = retry_with_backoff(&self.config.retry, &label, || {
            let connector = Arc::clone(&self.connector);
            let config = Arc::clone(&self.config);
            async move { connector.open(&config).await }
        })
        .await
        .map_err(|source| Error::Connection {
            host: self.config.host.clone(),
            source,
        })?;

        debug!(host = %self.config.host, "Connected to remote repository");
        Ok(Connection {
            session: Some(session),
            host: self.config.host.clone(),
            staging_dir: self.config.local_staging_directory.clone(),
        })
    }
}

/// An open session on the remote repository
///
/// Call [`close`](Connection::close) when done. A connection dropped while
/// still open is closed on a background task.
pub struct Connection {
    session: Option<Box<dyn RemoteSession>>,
    host: String,
    staging_dir: PathBuf,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("open", &self.session.is_some())
            .finish()
    }
}

impl Connection {
    /// Whether [`close`](Connection::close) has already run
    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    /// List the remote warning directory
    pub async fn list(&mut self) -> std::result::Result<Vec<RemoteEntry>, TransportError> {
        self.session()?.list().await
    }

    /// Stage one remote entry at `local_path`
    pub async fn download_entry(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> std::result::Result<u64, TransportError> {
        self.session()?.download(remote_name, local_path).await
    }

    /// Close the session; later calls are no-ops
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            match session.close().await {
                Ok(()) => debug!(host = %self.host, "Connection closed"),
                Err(e) => warn!(host = %self.host, error = %e, "Error while closing connection"),
            }
        }
    }

    /// Identifiers of structured documents whose name starts with `prefix`
    ///
    /// Listing order is preserved. An empty `Ok` means the listing succeeded
    /// and nothing matched.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the listing itself fails.
    pub async fn list_warning_identifiers(
        &mut self,
        prefix: &str,
    ) -> std::result::Result<Vec<WarningId>, TransportError> {
        let entries = self.list().await?;

        Ok(entries
            .iter()
            .filter(|entry| !entry.is_directory && entry.name.starts_with(prefix))
            .filter_map(|entry| entry.name.strip_suffix(STRUCTURED_DOCUMENT_SUFFIX))
            .map(WarningId::new)
            .collect())
    }

    /// Content of `<id>.amoc.xml`, or `None` if it is not published
    ///
    /// Failures after the document was found are logged and also give `None`.
    pub async fn download_structured_document(&mut self, id: &WarningId) -> Option<String> {
        let remote_name = id.structured_document_name();

        let entries = match self.list().await {
            Ok(entries) => entries,
            Err(e) => {
                error!(id = %id, error = %e, "Failed to list remote directory");
                return None;
            }
        };
        if !entries
            .iter()
            .any(|entry| !entry.is_directory && entry.name == remote_name)
        {
            warn!(id = %id, remote = %remote_name, "Structured document not found on remote repository");
            return None;
        }

        let local_path = self.staging_path(id, ".xml");
        match self.fetch_staged(&remote_name, &local_path).await {
            Ok(content) => {
                info!(id = %id, bytes = content.len(), "Fetched structured document");
                Some(content)
            }
            Err(e) => {
                error!(id = %id, error = %e, "Error downloading structured document");
                None
            }
        }
    }

    /// Content of `<id>.txt`, or an empty string if it cannot be fetched
    pub async fn download_free_text_document(&mut self, id: &WarningId) -> String {
        let remote_name = id.free_text_document_name();
        let local_path = self.staging_path(id, ".txt");

        match self.fetch_staged(&remote_name, &local_path).await {
            Ok(content) => content,
            Err(Error::Transport(TransportError::MissingFile { .. })) => {
                warn!(id = %id, remote = %remote_name, "Free-text document not found on remote repository");
                String::new()
            }
            Err(e) => {
                error!(id = %id, error = %e, "Error downloading free-text document");
                String::new()
            }
        }
    }

    fn session(&mut self) -> std::result::Result<&mut Box<dyn RemoteSession>, TransportError> {
        self.session
            .as_mut()
            .ok_or_else(|| TransportError::Protocol("connection is closed".to_string()))
    }

    /// Unique staging path so concurrent fetches of one id never collide
    fn staging_path(&self, id: &WarningId, extension: &str) -> PathBuf {
        self.staging_dir
            .join(format!("{id}-{}{extension}", Uuid::new_v4()))
    }

    /// Download into `local_path`, then read and delete the staged file
    async fn fetch_staged(&mut self, remote_name: &str, local_path: &Path) -> Result<String> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;

        if let Err(e) = self.download_entry(remote_name, local_path).await {
            remove_leftover(local_path).await;
            return Err(e.into());
        }

        match staging::read_and_delete(local_path, TextEncoding::Utf8).await {
            Ok(content) => Ok(content),
            Err(e) => {
                remove_leftover(local_path).await;
                Err(e.into())
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let host = std::mem::take(&mut self.host);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!(host = %host, error = %e, "Error closing dropped connection");
                    }
                });
            }
            Err(_) => warn!(host = %host, "Connection dropped outside a runtime, not closed"),
        }
    }
}

/// Remove a staged file that was not consumed, ignoring a missing file
async fn remove_leftover(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed leftover staged file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove leftover staged file"),
    }
}
