mod config;
mod envfile;
mod error;
mod expand;
mod fs;
mod object;
mod provider;
mod sqlite;
mod traits;


pub use config::{build_backend, StorageConfig};
pub use error::StorageError;
pub use fs::FilesystemBackend;
pub use object::ObjectStorageBackend;
pub use provider::Provider;
pub use sqlite::SqliteBackend;
pub use traits::StorageBackend;
