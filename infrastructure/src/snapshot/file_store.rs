//! File-backed snapshot store
//!
//! One pretty-printed JSON document per round, named `round_<N>.json`, in a
//! single directory. Writes go to a hidden temp file that is renamed over the
//! target so readers never observe a partial snapshot.

use agora_application::ports::snapshot_store::{SnapshotStore, StoreError};
use agora_domain::RoundSnapshot;
use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Snapshot store writing `round_<N>.json` files under one directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot for `round_num`
    pub fn snapshot_path(&self, round_num: u32) -> PathBuf {
        self.dir.join(RoundSnapshot::file_name(round_num))
    }

    fn temp_path(&self, round_num: u32) -> PathBuf {
        self.dir
            .join(format!(".{}.tmp", RoundSnapshot::file_name(round_num)))
    }
}

/// Round number encoded in a snapshot file name
fn parse_round(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("round_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

async fn write_then_rename(temp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp, target).await
}

/// Flush the directory entry written by a rename
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let temp_path = self.temp_path(snapshot.round_num);
        let final_path = self.snapshot_path(snapshot.round_num);

        if let Err(e) = write_then_rename(&temp_path, &final_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        sync_dir(&self.dir).await?;

        debug!(
            "Saved {} snapshot of round {} to {}",
            snapshot.status.as_str(),
            snapshot.round_num,
            final_path.display()
        );
        Ok(())
    }

    async fn load(&self, round_num: u32) -> Result<Option<RoundSnapshot>, StoreError> {
        let bytes = match fs::read(self.snapshot_path(round_num)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn latest_round(&self) -> Result<Option<u32>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest = None;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(round) = entry.file_name().to_str().and_then(parse_round) {
                latest = latest.max(Some(round));
            }
        }
        Ok(latest)
    }
}
