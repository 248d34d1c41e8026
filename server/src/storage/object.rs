//! Object-storage adapter: one object per block under a configured key
//! prefix, through the `object_store` API. `LocalFileSystem` serves
//! development and tests; `AmazonS3` serves real deployments.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use shared_types::{EnvConfig, EnvKey};
use std::path::PathBuf;
use std::sync::Arc;

use super::envfile;
use super::error::StorageError;
use super::traits::StorageBackend;

pub struct ObjectStorageBackend {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ObjectStorageBackend {
    /// Local directory exposed through the object-store API.
    pub fn local(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let store = LocalFileSystem::new_with_prefix(path.into())
            .context("failed to open local object store")?;
        Ok(Self::with_store(Arc::new(store), prefix))
    }

    /// S3 bucket. The bucket name is required and validated eagerly.
    #[allow(clippy::too_many_arguments)]
    pub fn s3(
        bucket: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        allow_http: bool,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        if bucket.trim().is_empty() {
            return Err(StorageError::InvalidConfig(
                "bucket name must be a non-empty string".to_string(),
            )
            .into());
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_allow_http(allow_http);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(access_key_id) = access_key_id {
            builder = builder.with_access_key_id(access_key_id);
        }
        if let Some(secret_access_key) = secret_access_key {
            builder = builder.with_secret_access_key(secret_access_key);
        }

        let store = builder.build().context("failed to build S3 client")?;
        Ok(Self::with_store(Arc::new(store), prefix))
    }

    pub fn with_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn block_path(&self, key: &EnvKey) -> Path {
        let name = envfile::block_file_name(key);
        if self.prefix.is_empty() {
            Path::from(name)
        } else {
            Path::from(format!("{}/{name}", self.prefix))
        }
    }

    fn list_prefix(&self) -> Option<Path> {
        if self.prefix.is_empty() {
            None
        } else {
            Some(Path::from(self.prefix.clone()))
        }
    }
}

#[async_trait]
impl StorageBackend for ObjectStorageBackend {
    async fn list_blocks(&self, app: Option<&str>, env: Option<&str>) -> Result<Vec<EnvKey>> {
        let prefix = self.list_prefix();
        let mut stream = self.store.list(prefix.as_ref());

        let mut keys = Vec::new();
        while let Some(meta) = stream
            .next()
            .await
            .transpose()
            .context("failed to list blocks")?
        {
            let Some(name) = meta.location.filename() else {
                continue;
            };
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
        match self.store.get(&path).await {
            Ok(result) => {
                let bytes = result
                    .bytes()
                    .await
                    .with_context(|| format!("failed to read block {key}"))?;
                let content =
                    std::str::from_utf8(&bytes).map_err(|e| StorageError::CorruptBlock {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(envfile::parse_block(content)))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read block {key}")),
        }
    }

    async fn write_block(&self, key: &EnvKey, block: &EnvConfig) -> Result<()> {
        let body = Bytes::from(envfile::serialize_block(block));
        self.store
            .put(&self.block_path(key), PutPayload::from(body))
            .await
            .with_context(|| format!("failed to write block {key}"))?;
        Ok(())
    }

    async fn delete_block(&self, key: &EnvKey) -> Result<()> {
        match self.store.delete(&self.block_path(key)).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete block {key}")),
        }
    }
}
