use std::collections::HashMap;

use tokio::sync::RwLock;

use super::SandboxInfo;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// In-memory record of the sandboxes this process believes are running, keyed by id.
///
/// Every method takes the lock for exactly one read or write and never holds it
/// across a runtime call, so each mutation is a single atomic step. Nothing is
/// persisted: the registry starts empty and is discarded with the process.
#[derive(Debug, Default)]
pub struct SandboxRegistry {
    sandboxes: RwLock<HashMap<String, SandboxInfo>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SandboxRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `id`.
    pub async fn put(&self, id: impl Into<String>, info: SandboxInfo) {
        self.sandboxes.write().await.insert(id.into(), info);
    }

    /// Returns the entry for `id`, if any.
    pub async fn get(&self, id: &str) -> Option<SandboxInfo> {
        self.sandboxes.read().await.get(id).cloned()
    }

    /// Deletes the entry for `id`. Removing an unknown id is not an error.
    pub async fn remove(&self, id: &str) -> Option<SandboxInfo> {
        self.sandboxes.write().await.remove(id)
    }

    /// Returns whether an entry for `id` exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.sandboxes.read().await.contains_key(id)
    }

    /// Returns the number of entries.
    pub async fn len(&self) -> usize {
        self.sandboxes.read().await.len()
    }

    /// Returns whether the registry has no entries.
    pub async fn is_empty(&self) -> bool {
        self.sandboxes.read().await.is_empty()
    }

    /// Returns a snapshot of all entries, oldest first.
    pub async fn list(&self) -> Vec<SandboxInfo> {
        let mut sandboxes: Vec<SandboxInfo> =
            self.sandboxes.read().await.values().cloned().collect();
        sandboxes.sort_by(|a, b| a.get_created_at().cmp(b.get_created_at()));
        sandboxes
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
