//! Per-group tag storage.

use super::{StoreError, load_json, save_json};
use async_trait::async_trait;
use blep_dispatch::ShutdownHook;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use tracing::{debug, info};

/// A stored snippet of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub owner_id: String,
    pub content: String,
}

/// Tags keyed by group id, then by tag name.
pub struct TagStore {
    path: PathBuf,
    groups: DashMap<String, HashMap<String, Tag>>,
}

impl TagStore {
    /// Load the store from `path`. A missing file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let saved: HashMap<String, HashMap<String, Tag>> = load_json(&path).await?;
        let tags: usize = saved.values().map(HashMap::len).sum();
        info!(path = %path.display(), groups = saved.len(), tags, "Loaded tag store");
        Ok(Self {
            path,
            groups: saved.into_iter().collect(),
        })
    }

    /// Look up a tag.
    pub fn get(&self, group_id: &str, name: &str) -> Option<Tag> {
        self.groups.get(group_id)?.get(name).cloned()
    }

    /// Whether `name` exists in `group_id`.
    pub fn contains(&self, group_id: &str, name: &str) -> bool {
        self.groups
            .get(group_id)
            .is_some_and(|tags| tags.contains_key(name))
    }

    /// Insert a tag unless the name is already taken. Returns `false` on a
    /// conflict, leaving the existing tag untouched.
    pub fn insert_new(&self, group_id: &str, tag: Tag) -> bool {
        let mut tags = self.groups.entry(group_id.to_string()).or_default();
        match tags.entry(tag.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(tag);
                true
            }
        }
    }

    /// Replace the content of an existing tag. Returns `false` if it is gone.
    pub fn update_content(&self, group_id: &str, name: &str, content: String) -> bool {
        self.groups
            .get_mut(group_id)
            .and_then(|mut tags| tags.get_mut(name).map(|tag| tag.content = content))
            .is_some()
    }

    /// Remove a tag, returning it.
    pub fn remove(&self, group_id: &str, name: &str) -> Option<Tag> {
        self.groups.get_mut(group_id)?.remove(name)
    }

    /// Write every group to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let snapshot: HashMap<String, HashMap<String, Tag>> = self
            .groups
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        save_json(&self.path, &snapshot).await?;
        debug!(path = %self.path.display(), groups = snapshot.len(), "Tag store saved");
        Ok(())
    }
}

#[async_trait]
impl ShutdownHook for TagStore {
    async fn shutdown(&self) -> anyhow::Result<()> {
        info!(path = %self.path.display(), "Writing tag data");
        self.save().await?;
        Ok(())
    }
}
