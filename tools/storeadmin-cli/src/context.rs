//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use storeadmin_core::events::TracingPublisher;
use storeadmin_core::permissions::Principal;
use storeadmin_core::store::InMemoryCatalogStore;
use storeadmin_core::CatalogAdmin;

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["storeadmin.toml", ".storeadmin.toml", "storeadmin.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Catalog snapshot file.
    pub catalog_path: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, catalog: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        let catalog_path = resolve(&cwd, catalog.unwrap_or_else(|| config.catalog_path()));
        Ok(Self {
            config,
            output,
            cwd,
            catalog_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        tracing::debug!(path = %config_path.display(), "loaded config");
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    pub fn principal(&self) -> Principal {
        self.config.principal.principal()
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }

    /// Read the catalog snapshot. A missing file yields an empty catalog.
    pub async fn load_store(&self) -> Result<Arc<InMemoryCatalogStore>> {
        if !tokio::fs::try_exists(&self.catalog_path).await.unwrap_or(false) {
            self.output.debug(&format!(
                "No catalog at {}, starting empty",
                self.catalog_path.display()
            ));
            return Ok(Arc::new(InMemoryCatalogStore::new()));
        }

        let content = tokio::fs::read_to_string(&self.catalog_path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", self.catalog_path.display()))?;
        let store = InMemoryCatalogStore::from_json(&content)
            .with_context(|| format!("Failed to parse catalog: {}", self.catalog_path.display()))?;
        Ok(Arc::new(store))
    }

    /// Write the catalog snapshot back.
    pub async fn save_store(&self, store: &InMemoryCatalogStore) -> Result<()> {
        let content = store.to_json_pretty()?;
        let tmp = self.catalog_path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write catalog: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.catalog_path)
            .await
            .with_context(|| format!("Failed to replace catalog: {}", self.catalog_path.display()))?;
        self.output
            .debug(&format!("Saved catalog to {}", self.catalog_path.display()));
        Ok(())
    }

    /// Admin facade over a loaded store.
    pub fn admin(&self, store: Arc<InMemoryCatalogStore>) -> CatalogAdmin {
        CatalogAdmin::new(store, self.config.admin.clone(), Arc::new(TracingPublisher))
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        cwd.join(path)
    }
}
