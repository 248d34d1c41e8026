use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::fs::FilesystemBackend;
use super::object::ObjectStorageBackend;
use super::sqlite::SqliteBackend;
use super::traits::StorageBackend;

/// Default object key prefix under which blocks are stored.
pub const DEFAULT_OBJECT_PREFIX: &str = ".config";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageConfig {
    /// Plain files in a directory, one file per environment block.
    Filesystem { root: PathBuf },
    /// Object-store API backed by a local directory (dev/testing).
    Local { path: PathBuf, prefix: String },
    /// Object-store API backed by an S3 bucket.
    S3 {
        bucket: String,
        region: Option<String>,
        endpoint: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        allow_http: bool,
        prefix: String,
    },
    /// SQLite database, one row per `(app, env, key)` triple.
    Sqlite { path: PathBuf },
}

impl StorageConfig {
    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::Filesystem { root: root.into() }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local {
            path: path.into(),
            prefix: DEFAULT_OBJECT_PREFIX.to_string(),
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite { path: path.into() }
    }

    /// Reads the backend selection and its options from the process
    /// environment. Missing required options fail here, before any I/O.
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "fs".to_string());

        match backend.as_str() {
            "fs" => {
                let root = std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./data".to_string());
                Ok(Self::filesystem(root))
            }
            "local" => {
                let path = std::env::var("STORAGE_PATH").unwrap_or_else(|_| "./data".to_string());
                let prefix = std::env::var("STORAGE_PREFIX")
                    .unwrap_or_else(|_| DEFAULT_OBJECT_PREFIX.to_string());
                Ok(Self::Local {
                    path: path.into(),
                    prefix,
                })
            }
            "s3" => {
                let bucket = std::env::var("AWS_BUCKET")
                    .map_err(|_| anyhow::anyhow!("AWS_BUCKET is required for the s3 backend"))?;
                let region = std::env::var("AWS_REGION").ok();
                let endpoint = std::env::var("AWS_ENDPOINT").ok();
                let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok();
                let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok();
                let allow_http = std::env::var("AWS_ALLOW_HTTP")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse::<bool>()
                    .unwrap_or(false);
                let prefix = std::env::var("STORAGE_PREFIX")
                    .unwrap_or_else(|_| DEFAULT_OBJECT_PREFIX.to_string());

                Ok(Self::S3 {
                    bucket,
                    region,
                    endpoint,
                    access_key_id,
                    secret_access_key,
                    allow_http,
                    prefix,
                })
            }
            "sqlite" => {
                let path =
                    std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./configs.db".to_string());
                Ok(Self::sqlite(path))
            }
            _ => anyhow::bail!(
                "Unknown storage backend: {}. Must be 'fs', 'local', 's3' or 'sqlite'",
                backend
            ),
        }
    }
}

/// Constructs the backend selected by `config`. Option validation happens
/// inside the adapter constructors, eagerly, before any operation runs.
pub fn build_backend(config: StorageConfig) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config {
        StorageConfig::Filesystem { root } => Ok(Arc::new(FilesystemBackend::new(root)?)),
        StorageConfig::Local { path, prefix } => {
            Ok(Arc::new(ObjectStorageBackend::local(path, prefix)?))
        }
        StorageConfig::S3 {
            bucket,
            region,
            endpoint,
            access_key_id,
            secret_access_key,
            allow_http,
            prefix,
        } => Ok(Arc::new(ObjectStorageBackend::s3(
            &bucket,
            region.as_deref(),
            endpoint.as_deref(),
            access_key_id.as_deref(),
            secret_access_key.as_deref(),
            allow_http,
            prefix,
        )?)),
        StorageConfig::Sqlite { path } => Ok(Arc::new(SqliteBackend::open(path)?)),
    }
}
