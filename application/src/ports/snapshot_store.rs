//! Snapshot storage port
//!
//! All round-snapshot reads and writes go through [`SnapshotStore`].
//! Implementations must make `save` atomic: a reader sees either the previous
//! snapshot for that round or the new one, never a partial write.

use agora_domain::RoundSnapshot;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by snapshot storage
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable per-round snapshot storage
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the snapshot stored for `snapshot.round_num`
    async fn save(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError>;

    /// Load the snapshot of `round_num`, if one was saved
    async fn load(&self, round_num: u32) -> Result<Option<RoundSnapshot>, StoreError>;

    /// Highest round number with a stored snapshot
    async fn latest_round(&self) -> Result<Option<u32>, StoreError>;
}

/// Snapshot store kept in memory
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<BTreeMap<u32, RoundSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u32, RoundSnapshot>> {
        self.snapshots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of stored rounds
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError> {
        self.lock().insert(snapshot.round_num, snapshot.clone());
        Ok(())
    }

    async fn load(&self, round_num: u32) -> Result<Option<RoundSnapshot>, StoreError> {
        Ok(self.lock().get(&round_num).cloned())
    }

    async fn latest_round(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.lock().keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::{DiscussionChain, RoundStatus, Topic};
    use chrono::Utc;

    fn snapshot(round: u32, status: RoundStatus) -> RoundSnapshot {
        let chain = DiscussionChain::new(&Topic::new("Is ethics universal?").unwrap());
        RoundSnapshot::capture(round, round, &chain, &[], status, Utc::now())
    }

    #[tokio::test]
    async fn test_save_overwrites_same_round() {
        let store = InMemorySnapshotStore::new();
        store.save(&snapshot(1, RoundStatus::Ongoing)).await.unwrap();
        store.save(&snapshot(1, RoundStatus::Completed)).await.unwrap();

        assert_eq!(store.len(), 1);
        let loaded = store.load(1).await.unwrap().unwrap();
        assert!(loaded.is_completed());
    }

    #[tokio::test]
    async fn test_latest_round() {
        let store = InMemorySnapshotStore::new();
        assert_eq!(store.latest_round().await.unwrap(), None);

        store.save(&snapshot(2, RoundStatus::Completed)).await.unwrap();
        store.save(&snapshot(1, RoundStatus::Completed)).await.unwrap();
        assert_eq!(store.latest_round().await.unwrap(), Some(2));
        assert!(store.load(3).await.unwrap().is_none());
    }
}
