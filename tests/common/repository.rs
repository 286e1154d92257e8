//! Scripted in-memory repository implementing the public transport traits

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use flood_warnings::{Connector, RemoteEntry, RemoteSession, RepositoryConfig, TransportError};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Default)]
struct Shared {
    files: Mutex<Vec<(String, Vec<u8>)>>,
    refuse_opens: AtomicU32,
    opens: AtomicU32,
    closes: AtomicU32,
    open_times: Mutex<Vec<Instant>>,
    retrievals: Mutex<Vec<String>>,
}

/// Fake FTP repository whose contents can change between calls
#[derive(Clone, Default)]
pub struct ScriptedRepository {
    shared: Arc<Shared>,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) a file
    pub fn publish(&self, name: &str, content: &str) -> &Self {
        let mut files = self.shared.files.lock().unwrap();
        files.retain(|(existing, _)| existing != name);
        files.push((name.to_string(), content.as_bytes().to_vec()));
        self
    }

    /// Remove a published file
    pub fn withdraw(&self, name: &str) {
        self.shared
            .files
            .lock()
            .unwrap()
            .retain(|(existing, _)| existing != name);
    }

    /// Refuse the next `count` connection attempts
    pub fn refuse_next_opens(&self, count: u32) {
        self.shared.refuse_opens.store(count, Ordering::SeqCst);
    }

    pub fn opens(&self) -> u32 {
        self.shared.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Instants at which connection attempts were made
    pub fn open_times(&self) -> Vec<Instant> {
        self.shared.open_times.lock().unwrap().clone()
    }

    /// Remote names requested for download, in order
    pub fn retrievals(&self) -> Vec<String> {
        self.shared.retrievals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedRepository {
    async fn open(
        &self,
        _config: &RepositoryConfig,
    ) -> Result<Box<dyn RemoteSession>, TransportError> {
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        self.shared.open_times.lock().unwrap().push(Instant::now());

        let refused = self
            .shared
            .refuse_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(TransportError::Connect("421 service not available".to_string()));
        }

        Ok(Box::new(ScriptedSession {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ScriptedSession {
    shared: Arc<Shared>,
}

#[async_trait]
impl RemoteSession for ScriptedSession {
    async fn list(&mut self) -> Result<Vec<RemoteEntry>, TransportError> {
        let modified = Utc.with_ymd_and_hms(2024, 9, 5, 22, 44, 0).unwrap();
        Ok(self
            .shared
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, content)| RemoteEntry::file(name.clone(), content.len() as u64, modified))
            .collect())
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<u64, TransportError> {
        self.shared
            .retrievals
            .lock()
            .unwrap()
            .push(remote_name.to_string());

        let content = self
            .shared
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == remote_name)
            .map(|(_, content)| content.clone());

        match content {
            Some(content) => {
                tokio::fs::write(local_path, &content).await?;
                Ok(content.len() as u64)
            }
            None => Err(TransportError::MissingFile {
                name: remote_name.to_string(),
            }),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
