use anyhow::Result;
use async_trait::async_trait;
use shared_types::{AppConfig, EnvConfig, EnvKey};

/// Contract every storage medium implements: CRUD over environment blocks.
///
/// "Not found" from the medium is never an error here: reads report it as
/// `None` and deletes treat it as success. Every other medium failure
/// propagates unchanged.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Enumerates every block matching the optional filters
    /// (an omitted filter is a wildcard).
    async fn list_blocks(&self, app: Option<&str>, env: Option<&str>) -> Result<Vec<EnvKey>>;

    async fn read_block(&self, key: &EnvKey) -> Result<Option<EnvConfig>>;

    /// Full overwrite of the block's native storage unit; never merges.
    async fn write_block(&self, key: &EnvKey, block: &EnvConfig) -> Result<()>;

    /// Removes the block's native unit; a missing unit is success.
    async fn delete_block(&self, key: &EnvKey) -> Result<()>;

    /// Replaces every block of `app` with exactly the blocks in `config`.
    /// Backends with multi-unit atomicity override this with a transaction.
    async fn replace_app(&self, app: &str, config: &AppConfig) -> Result<()> {
        for key in self.list_blocks(Some(app), None).await? {
            self.delete_block(&key).await?;
        }
        for (env, block) in config {
            self.write_block(&EnvKey::new(app, env.clone()), block).await?;
        }
        Ok(())
    }

    /// Removes every block of `app`; no-op when the app has none.
    async fn delete_app(&self, app: &str) -> Result<()> {
        for key in self.list_blocks(Some(app), None).await? {
            self.delete_block(&key).await?;
        }
        Ok(())
    }

    /// Removes every block in the store.
    async fn clear(&self) -> Result<()> {
        for key in self.list_blocks(None, None).await? {
            self.delete_block(&key).await?;
        }
        Ok(())
    }
}
