//! In-memory contents store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::traits::{ContentsApi, FileUpdate, RemoteFile, StoreError};
use crate::config::AccessToken;
use crate::document::RevisionToken;

/// In-process stand-in for the remote contents API.
///
/// Mirrors the remote's revision-check semantics: overwrites need the
/// current revision, creations need none. Counts requests so tests can
/// assert that credential-gated operations never reach the transport,
/// and supports injecting outages and revision conflicts.
#[derive(Default)]
pub struct InMemoryContents {
    files: RwLock<HashMap<String, RemoteFile>>,
    requests: AtomicUsize,
    offline: AtomicBool,
    put_conflicts: AtomicUsize,
}

impl InMemoryContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of get/put calls made so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Simulate a network outage: every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next `count` puts fail with a revision conflict, for
    /// exercising retry paths.
    pub fn inject_put_conflicts(&self, count: usize) {
        self.put_conflicts.store(count, Ordering::SeqCst);
    }

    /// Insert a file directly, bypassing request counting.
    pub fn seed(&self, path: &str, content: &[u8]) -> RevisionToken {
        let revision = Self::revision_of(content);
        self.files.write().unwrap().insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                revision: revision.clone(),
            },
        );
        revision
    }

    /// Content-derived revision token, like the remote's blob sha.
    fn revision_of(content: &[u8]) -> RevisionToken {
        let mut hasher = Sha256::new();
        hasher.update(content);
        RevisionToken::new(hex::encode(hasher.finalize()))
    }

    fn record_request(&self) -> Result<(), StoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentsApi for InMemoryContents {
    async fn get(
        &self,
        path: &str,
        _token: &AccessToken,
    ) -> Result<Option<RemoteFile>, StoreError> {
        self.record_request()?;
        Ok(self.files.read().unwrap().get(path).cloned())
    }

    async fn put(
        &self,
        path: &str,
        update: FileUpdate<'_>,
        _token: &AccessToken,
    ) -> Result<(), StoreError> {
        self.record_request()?;

        let pending = self.put_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.put_conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::RevisionConflict {
                path: path.to_string(),
            });
        }

        let mut files = self.files.write().unwrap();
        let current = files.get(path).map(|f| &f.revision);
        match (current, update.revision) {
            // Overwrite with the current revision, or create with none.
            (Some(current), Some(supplied)) if current == supplied => {}
            (None, None) => {}
            _ => {
                return Err(StoreError::RevisionConflict {
                    path: path.to_string(),
                });
            }
        }

        files.insert(
            path.to_string(),
            RemoteFile {
                content: update.content.to_vec(),
                revision: Self::revision_of(update.content),
            },
        );
        Ok(())
    }
}
