//! FTP transport built on `suppaftp`
//!
//! suppaftp's synchronous client is driven from `spawn_blocking`; the
//! stream is moved into the blocking task for each command and handed back
//! afterwards, so a session never blocks the async runtime.

use super::transport::{Connector, RemoteSession};
use crate::config::RepositoryConfig;
use crate::error::TransportError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use suppaftp::list::File;
use suppaftp::types::FileType;
use suppaftp::{FtpError, NativeTlsConnector, NativeTlsFtpStream, Status};
use tracing::{debug, info};

/// [`Connector`] for a plain or explicit-TLS FTP server
#[derive(Clone, Copy, Debug, Default)]
pub struct FtpConnector;

impl FtpConnector {
    /// Create a connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for FtpConnector {
    async fn open(
        &self,
        config: &RepositoryConfig,
    ) -> Result<Box<dyn RemoteSession>, TransportError> {
        let config = config.clone();

        let stream = tokio::task::spawn_blocking(move || open_stream(&config))
            .await
            .map_err(|e| TransportError::Connect(format!("connect task failed: {e}")))??;

        Ok(Box::new(FtpSession {
            stream: Some(stream),
        }))
    }
}

fn open_stream(config: &RepositoryConfig) -> Result<NativeTlsFtpStream, TransportError> {
    let address = config.address();
    debug!(address = %address, secure = config.use_secure_transport, "Opening FTP connection");

    let mut stream = NativeTlsFtpStream::connect(address.as_str())
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    if config.use_secure_transport {
        let tls = suppaftp::native_tls::TlsConnector::new()
            .map_err(|e| TransportError::Connect(format!("TLS setup failed: {e}")))?;
        stream = stream
            .into_secure(NativeTlsConnector::from(tls), &config.host)
            .map_err(|e| TransportError::Connect(format!("TLS upgrade failed: {e}")))?;
    }

    stream
        .login(config.username.as_str(), config.password.as_str())
        .map_err(|e| TransportError::Connect(format!("login failed: {e}")))?;
    stream
        .transfer_type(FileType::Binary)
        .map_err(|e| map_ftp_error(e, None))?;
    stream
        .cwd(config.remote_directory.as_str())
        .map_err(|e| map_ftp_error(e, Some(&config.remote_directory)))?;

    info!(host = %config.host, directory = %config.remote_directory, "FTP session ready");
    Ok(stream)
}

/// An FTP control connection positioned in the warning directory
struct FtpSession {
    /// `None` once closed, or while a blocking command holds the stream
    stream: Option<NativeTlsFtpStream>,
}

impl FtpSession {
    /// Run `command` against the stream on the blocking pool
    async fn with_stream<T, F>(&mut self, command: F) -> Result<T, TransportError>
    where
        F: FnOnce(&mut NativeTlsFtpStream) -> Result<T, TransportError> + Send + 'static,
        T: Send + 'static,
    {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| TransportError::Protocol("session is closed".to_string()))?;

        let (stream, result) = tokio::task::spawn_blocking(move || {
            let result = command(&mut stream);
            (stream, result)
        })
        .await
        .map_err(|e| TransportError::Protocol(format!("FTP task failed: {e}")))?;

        self.stream = Some(stream);
        result
    }
}

#[async_trait]
impl RemoteSession for FtpSession {
    async fn list(&mut self) -> Result<Vec<RemoteEntry>, TransportError> {
        let lines = self
            .with_stream(|stream| stream.list(None).map_err(|e| map_ftp_error(e, None)))
            .await?;
        Ok(parse_listing(&lines))
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, TransportError> {
        let name = remote_name.to_string();
        let buffer = self
            .with_stream(move |stream| {
                stream
                    .retr_as_buffer(&name)
                    .map(|cursor| cursor.into_inner())
                    .map_err(|e| map_ftp_error(e, Some(&name)))
            })
            .await?;

        tokio::fs::write(local_path, &buffer).await?;
        debug!(
            remote = remote_name,
            path = %local_path.display(),
            bytes = buffer.len(),
            "Downloaded remote file"
        );
        Ok(buffer.len() as u64)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.stream.is_none() {
            return Ok(());
        }
        let result = self
            .with_stream(|stream| stream.quit().map_err(|e| map_ftp_error(e, None)))
            .await;
        self.stream = None;
        result
    }
}

/// Translate a suppaftp error; `name` is the file or directory involved
fn map_ftp_error(error: FtpError, name: Option<&str>) -> TransportError {
    match (error, name) {
        (FtpError::UnexpectedResponse(response), Some(name))
            if response.status == Status::FileUnavailable =>
        {
            TransportError::MissingFile {
                name: name.to_string(),
            }
        }
        (FtpError::ConnectionError(e), _) => TransportError::Io(e),
        (other, _) => TransportError::Protocol(other.to_string()),
    }
}

/// Parse `LIST` output lines, skipping any the parser does not understand
pub(crate) fn parse_listing(lines: &[String]) -> Vec<RemoteEntry> {
    lines
        .iter()
        .filter_map(|line| match line.parse::<File>() {
            Ok(file) => Some(RemoteEntry {
                name: file.name().to_string(),
                size_bytes: file.size() as u64,
                modified_at: DateTime::<Utc>::from(file.modified()),
                is_directory: file.is_directory(),
            }),
            Err(e) => {
                debug!(line = %line, error = %e, "Skipping unparseable listing line");
                None
            }
        })
        .collect()
}
