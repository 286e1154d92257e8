//! In-memory transport for unit tests

use super::transport::{Connector, RemoteSession};
use crate::config::RepositoryConfig;
use crate::error::TransportError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RemoteState {
    entries: Vec<(RemoteEntry, Vec<u8>)>,
    broken: HashSet<String>,
    failing_opens: u32,
    failing_lists: u32,
    missing_directory: bool,
    opens: AtomicU32,
    closes: AtomicU32,
    lists: AtomicU32,
    downloads: Mutex<Vec<String>>,
}

/// Connector serving a fixed directory listing from memory
#[derive(Clone, Default)]
pub(crate) struct MemoryConnector {
    state: Arc<RemoteState>,
}

impl MemoryConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut RemoteState {
        Arc::get_mut(&mut self.state).unwrap_or_else(|| panic!("configure before sharing"))
    }

    pub(crate) fn with_file(mut self, name: &str, content: &str) -> Self {
        let modified = Utc.with_ymd_and_hms(2024, 9, 5, 22, 44, 0).unwrap();
        self.state_mut().entries.push((
            RemoteEntry::file(name, content.len() as u64, modified),
            content.as_bytes().to_vec(),
        ));
        self
    }

    pub(crate) fn with_directory(mut self, name: &str) -> Self {
        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        self.state_mut().entries.push((
            RemoteEntry {
                name: name.to_string(),
                size_bytes: 4096,
                modified_at: modified,
                is_directory: true,
            },
            Vec::new(),
        ));
        self
    }

    /// Downloads of `name` fail with a protocol error after writing a partial file
    pub(crate) fn with_broken_download(mut self, name: &str) -> Self {
        self.state_mut().broken.insert(name.to_string());
        self
    }

    /// The first `count` opens fail with a transient error
    pub(crate) fn failing_opens(mut self, count: u32) -> Self {
        self.state_mut().failing_opens = count;
        self
    }

    /// The first `count` listings fail with a data connection error
    pub(crate) fn failing_lists(mut self, count: u32) -> Self {
        self.state_mut().failing_lists = count;
        self
    }

    /// Every open fails because the remote directory does not exist
    pub(crate) fn missing_directory(mut self) -> Self {
        self.state_mut().missing_directory = true;
        self
    }

    pub(crate) fn opens(&self) -> u32 {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn downloads(&self) -> Vec<String> {
        self.state.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(
        &self,
        config: &RepositoryConfig,
    ) -> Result<Box<dyn RemoteSession>, TransportError> {
        let attempt = self.state.opens.fetch_add(1, Ordering::SeqCst) + 1;

        if self.state.missing_directory {
            return Err(TransportError::MissingFile {
                name: config.remote_directory.clone(),
            });
        }
        if attempt <= self.state.failing_opens {
            return Err(TransportError::Connect(format!(
                "connection refused (attempt {attempt})"
            )));
        }

        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    state: Arc<RemoteState>,
}

#[async_trait]
impl RemoteSession for MemorySession {
    async fn list(&mut self) -> Result<Vec<RemoteEntry>, TransportError> {
        let attempt = self.state.lists.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.state.failing_lists {
            return Err(TransportError::Protocol(
                "425 can't open data connection".to_string(),
            ));
        }

        Ok(self
            .state
            .entries
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect())
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, TransportError> {
        self.state
            .downloads
            .lock()
            .unwrap()
            .push(remote_name.to_string());

        let Some((_, content)) = self
            .state
            .entries
            .iter()
            .find(|(entry, _)| entry.name == remote_name && !entry.is_directory)
        else {
            return Err(TransportError::MissingFile {
                name: remote_name.to_string(),
            });
        };

        if self.state.broken.contains(remote_name) {
            tokio::fs::write(local_path, &content[..content.len() / 2]).await?;
            return Err(TransportError::Protocol("426 transfer aborted".to_string()));
        }

        tokio::fs::write(local_path, content).await?;
        Ok(content.len() as u64)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
