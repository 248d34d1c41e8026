use shared_types::EnvKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid name {0:?}: names must be non-empty and must not contain '.', '/' or '\\'")]
    InvalidName(String),

    #[error("corrupt block {key}: {reason}")]
    CorruptBlock { key: EnvKey, reason: String },
}
