//! JSON-file backed stores.
//!
//! Stores are loaded once at startup and flushed by the owning command's
//! shutdown hook. Writes go to a sibling temp file first and are renamed
//! into place.

mod tags;
mod timezones;

pub use tags::{Tag, TagStore};
pub use timezones::TimezoneStore;

use crate::config::StorageConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Store persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every store the commands share.
pub struct Stores {
    pub tags: Arc<TagStore>,
    pub timezones: Arc<TimezoneStore>,
}

impl Stores {
    /// Open every store under the configured data directory.
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        Ok(Self {
            tags: Arc::new(TagStore::open(config.tags_path()).await?),
            timezones: Arc::new(TimezoneStore::open(config.timezones_path()).await?),
        })
    }
}

/// Read `path` as JSON. A missing file yields `T::default()`.
pub async fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` to `path` as pretty JSON, creating parent directories.
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}
