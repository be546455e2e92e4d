//! Local stand-ins for browser object URLs of accepted documents.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::PreviewId;
use tracing::debug;

struct PreviewEntry {
    file_name: String,
    bytes: Arc<[u8]>,
}

#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<PreviewId, PreviewEntry>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PreviewId, PreviewEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, file_name: &str, bytes: &[u8]) -> PreviewHandle {
        let id = PreviewId::random();
        self.entries().insert(
            id.clone(),
            PreviewEntry {
                file_name: file_name.to_string(),
                bytes: Arc::from(bytes),
            },
        );
        debug!(preview_id = %id, file_name, size_bytes = bytes.len(), "created preview");

        PreviewHandle {
            info: PreviewInfo {
                url: id.url(),
                id,
                file_name: file_name.to_string(),
                size_bytes: bytes.len(),
            },
            registry: self.clone(),
        }
    }

    /// Bytes behind a preview URL, while its handle is alive.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = PreviewId::from_url(url)?;
        self.entries().get(&id).map(|entry| Arc::clone(&entry.bytes))
    }

    pub fn file_name(&self, id: &PreviewId) -> Option<String> {
        self.entries().get(id).map(|entry| entry.file_name.clone())
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn release(&self, id: &PreviewId) {
        if self.entries().remove(id).is_some() {
            debug!(preview_id = %id, "released preview");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub id: PreviewId,
    pub url: String,
    pub file_name: String,
    pub size_bytes: usize,
}

/// Owning reference to a registered preview. Dropping it releases the entry.
pub struct PreviewHandle {
    info: PreviewInfo,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn info(&self) -> &PreviewInfo {
        &self.info
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.registry.resolve(&self.info.url)
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.info.id);
    }
}
