//! User timezone storage.

use super::{StoreError, load_json, save_json};
use async_trait::async_trait;
use blep_dispatch::ShutdownHook;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Normalized UTC offsets (`+05:30`) keyed by user id.
pub struct TimezoneStore {
    path: PathBuf,
    offsets: DashMap<String, String>,
}

impl TimezoneStore {
    /// Load the store from `path`. A missing file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let saved: HashMap<String, String> = load_json(&path).await?;
        info!(path = %path.display(), users = saved.len(), "Loaded timezone store");
        Ok(Self {
            path,
            offsets: saved.into_iter().collect(),
        })
    }

    /// The stored offset for `user_id`.
    pub fn get(&self, user_id: &str) -> Option<String> {
        self.offsets
            .get(user_id)
            .map(|offset| offset.value().clone())
    }

    /// Set or replace the offset for `user_id`.
    pub fn set(&self, user_id: &str, offset: String) {
        self.offsets.insert(user_id.to_string(), offset);
    }

    /// Write every entry to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let snapshot: HashMap<String, String> = self
            .offsets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        save_json(&self.path, &snapshot).await?;
        debug!(path = %self.path.display(), users = snapshot.len(), "Timezone store saved");
        Ok(())
    }
}

#[async_trait]
impl ShutdownHook for TimezoneStore {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.save().await?;
        Ok(())
    }
}
