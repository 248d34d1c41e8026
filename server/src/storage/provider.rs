//! The façade external callers depend on. Composes a [`StorageBackend`]
//! with value expansion: reads return expanded blocks, writes store raw
//! values so the data on the medium stays replayable.

use anyhow::Result;
use shared_types::{AppConfig, EnvConfig, EnvKey, Store};
use std::sync::Arc;

use super::envfile;
use super::expand::expand_block;
use super::traits::StorageBackend;

/// App/env names end up as file, object and row identifiers, so the façade
/// rejects names the backends cannot address before touching any of them.
fn validate_address(app: &str, env: Option<&str>) -> Result<()> {
    envfile::validate_name(app)?;
    if let Some(env) = env {
        envfile::validate_name(env)?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct Provider {
    backend: Arc<dyn StorageBackend>,
}

impl Provider {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Every application's configuration; empty store when nothing exists.
    pub async fn get_all(&self) -> Result<Store> {
        let mut store = Store::new();
        for key in self.backend.list_blocks(None, None).await? {
            if let Some(block) = self.backend.read_block(&key).await? {
                store
                    .entry(key.application)
                    .or_default()
                    .insert(key.environment, expand_block(&block));
            }
        }
        Ok(store)
    }

    /// Deletes everything; idempotent.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }

    pub async fn get_app_config(&self, app: &str) -> Result<Option<AppConfig>> {
        validate_address(app, None)?;
        let keys = self.backend.list_blocks(Some(app), None).await?;
        let mut config = AppConfig::new();
        for key in keys {
            if let Some(block) = self.backend.read_block(&key).await? {
                config.insert(key.environment, expand_block(&block));
            }
        }
        Ok((!config.is_empty()).then_some(config))
    }

    /// Full replace: blocks the app previously had and that are missing
    /// from `config` are discarded.
    pub async fn set_app_config(&self, app: &str, config: &AppConfig) -> Result<()> {
        validate_address(app, None)?;
        for env in config.keys() {
            validate_address(app, Some(env))?;
        }
        self.backend.replace_app(app, config).await
    }

    pub async fn delete_app_config(&self, app: &str) -> Result<()> {
        validate_address(app, None)?;
        self.backend.delete_app(app).await
    }

    pub async fn get_env_config(&self, app: &str, env: &str) -> Result<Option<EnvConfig>> {
        validate_address(app, Some(env))?;
        let block = self.backend.read_block(&EnvKey::new(app, env)).await?;
        Ok(block.map(|b| expand_block(&b)))
    }

    /// Full replace of one environment block; sibling environments of the
    /// same app are untouched.
    pub async fn set_env_config(&self, app: &str, env: &str, block: &EnvConfig) -> Result<()> {
        validate_address(app, Some(env))?;
        self.backend.write_block(&EnvKey::new(app, env), block).await
    }

    pub async fn delete_env_config(&self, app: &str, env: &str) -> Result<()> {
        validate_address(app, Some(env))?;
        self.backend.delete_block(&EnvKey::new(app, env)).await
    }

    /// Single value, expanded against its siblings (expansion needs the
    /// whole block as context, so the block is loaded either way).
    pub async fn get_config(&self, app: &str, env: &str, key: &str) -> Result<Option<String>> {
        validate_address(app, Some(env))?;
        let Some(block) = self.backend.read_block(&EnvKey::new(app, env)).await? else {
            return Ok(None);
        };
        Ok(expand_block(&block).remove(key))
    }

    /// Inserts or replaces one key; sibling keys are preserved. On the
    /// file/object backends this is a read-modify-write of the block.
    pub async fn set_config(&self, app: &str, env: &str, key: &str, val: &str) -> Result<()> {
        validate_address(app, Some(env))?;
        let id = EnvKey::new(app, env);
        let mut block = self.backend.read_block(&id).await?.unwrap_or_default();
        block.insert(key.to_string(), val.to_string());
        self.backend.write_block(&id, &block).await
    }

    /// Removes one key; no-op when the environment or the key is absent.
    /// The (possibly now empty) block is kept.
    pub async fn delete_config(&self, app: &str, env: &str, key: &str) -> Result<()> {
        validate_address(app, Some(env))?;
        let id = EnvKey::new(app, env);
        let Some(mut block) = self.backend.read_block(&id).await? else {
            return Ok(());
        };
        if block.remove(key).is_some() {
            self.backend.write_block(&id, &block).await?;
        }
        Ok(())
    }
}
