//! Filesystem adapter: one `{app}.{env}.env` file per block under a root
//! directory. Listing is a directory scan with filename parsing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared_types::{EnvConfig, EnvKey};
use std::io;
use std::path::PathBuf;
use tokio::fs;

use super::envfile;
use super::error::StorageError;
use super::traits::StorageBackend;

pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// The root directory must already exist; a missing root is a
    /// configuration error, not something to create on the fly.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StorageError::InvalidConfig(format!(
                "root directory '{}' must be an existing directory",
                root.display()
            ))
            .into());
        }
        Ok(Self { root })
    }

    fn block_path(&self, key: &EnvKey) -> PathBuf {
        self.root.join(envfile::block_file_name(key))
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn list_blocks(&self, app: Option<&str>, env: Option<&str>) -> Result<Vec<EnvKey>> {
        // Bind each read before `?` so temporaries drop in a fixed order
        // (tail_expr_drop_order).
        let read = fs::read_dir(&self.root).await;
        let mut entries =
            read.with_context(|| format!("failed to scan '{}'", self.root.display()))?;

        let mut keys = Vec::new();
        loop {
            let next = entries.next_entry().await;
            let Some(entry) =
                next.with_context(|| format!("failed to scan '{}'", self.root.display()))?
            else {
                break;
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = envfile::parse_file_name(name) {
                if key.matches(app, env) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn read_block(&self, key: &EnvKey) -> Result<Option<EnvConfig>> {
        let path = self.block_path(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                let content = String::from_utf8(bytes).map_err(|e| StorageError::CorruptBlock {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Some(envfile::parse_block(&content)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read block {key}")),
        }
    }

    async fn write_block(&self, key: &EnvKey, block: &EnvConfig) -> Result<()> {
        fs::write(self.block_path(key), envfile::serialize_block(block))
            .await
            .with_context(|| format!("failed to write block {key}"))
    }

    async fn delete_block(&self, key: &EnvKey) -> Result<()> {
        match fs::remove_file(self.block_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete block {key}")),
        }
    }
}
