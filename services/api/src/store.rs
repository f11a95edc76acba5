//! Flat JSON file collections.
//!
//! Each call reads or writes the whole file. There is no locking: two
//! requests writing at once race and the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. A missing file is an empty one; anything that
    /// doesn't parse is an error so writers never overwrite it.
    pub async fn load<T: DeserializeOwned>(&self) -> anyhow::Result<Vec<T>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// `load` for read-only endpoints: a broken store lists as empty.
    pub async fn load_or_empty<T: DeserializeOwned>(&self) -> Vec<T> {
        self.load().await.unwrap_or_else(|e| {
            warn!("Ignoring unreadable store: {:#}", e);
            Vec::new()
        })
    }

    /// Replace the collection with `items`, pretty-printed.
    pub async fn save<T: Serialize>(&self, items: &[T]) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(items).context("Failed to serialize collection")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Next id for a collection: one past the largest id, or 1 when empty.
pub fn next_id(ids: impl IntoIterator<Item = i64>) -> i64 {
    ids.into_iter().max().map_or(1, |max| max + 1)
}
