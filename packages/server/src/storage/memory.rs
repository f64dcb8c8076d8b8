//! In-memory storage implementation.
//!
//! Workspaces are held in RAM behind a [`RwLock`] as their serialised JSON,
//! so a load goes through the same decode path as the SQLite backend and
//! returns an independent copy. Everything is lost when the process exits.

use std::collections::HashMap;
use std::sync::RwLock;

use apigraph::Workspace;
use async_trait::async_trait;

use super::{Storage, StorageError};

/// Thread-safe, in-memory implementation of [`Storage`].
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_workspace(&self, key: &str) -> Result<Option<Workspace>, StorageError> {
        let inner = self.inner.read().unwrap();
        let Some(data) = inner.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(data)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save_workspace(&self, key: &str, workspace: &Workspace) -> Result<(), StorageError> {
        let data = serde_json::to_string(workspace)
            .map_err(|e| StorageError::Internal(format!("JSON error: {e}")))?;
        self.inner.write().unwrap().insert(key.to_string(), data);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use apigraph::{NodeDraft, NodeKind, WORKSPACE_KEY};

    #[tokio::test]
    async fn load_missing_is_none() {
        let s = MemoryStorage::new();
        assert!(s.load_workspace(WORKSPACE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let s = MemoryStorage::new();
        let mut ws = Workspace::default();
        ws.graph.add_node(NodeDraft::new(NodeKind::Path).with_id("p1"));

        s.save_workspace(WORKSPACE_KEY, &ws).await.unwrap();
        let got = s.load_workspace(WORKSPACE_KEY).await.unwrap().unwrap();
        assert_eq!(got, ws);
    }

    #[tokio::test]
    async fn save_replaces_previous_value() {
        let s = MemoryStorage::new();
        let mut ws = Workspace::default();
        s.save_workspace("k", &ws).await.unwrap();
        ws.header.info.title = "Second".into();
        s.save_workspace("k", &ws).await.unwrap();

        let got = s.load_workspace("k").await.unwrap().unwrap();
        assert_eq!(got.header.info.title, "Second");
        assert!(s.load_workspace("other").await.unwrap().is_none());
    }
}
