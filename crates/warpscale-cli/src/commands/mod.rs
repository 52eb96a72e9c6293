//! Subcommand implementations and the state they share.

pub mod deployments;
pub mod scale;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;
use warpscale_core::{ClientConfig, RegionCatalog};
use warpscale_state::{LocalControlPlane, PlanLimits, StateStore};

const DEFAULT_DATA_DIR: &str = ".warpscale";
const DB_FILE: &str = "warpscale.redb";

/// Loaded configuration plus the resolved data directory.
pub struct Context {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn load(config_path: &Path, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = ClientConfig::load_or_default(config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;
        let data_dir = data_dir
            .or_else(|| config.control_plane().data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Ok(Self { config, data_dir })
    }

    pub fn catalog(&self) -> Result<RegionCatalog> {
        self.config
            .region_catalog()
            .context("invalid [scale].regions")
    }

    pub fn open_store(&self) -> Result<StateStore> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        let path = self.data_dir.join(DB_FILE);
        debug!(path = %path.display(), "opening local control plane");
        StateStore::open(&path).with_context(|| format!("failed to open {}", path.display()))
    }

    pub fn open_plane(&self) -> Result<LocalControlPlane> {
        let settings = self.config.control_plane();
        let defaults = PlanLimits::default();
        let limits = PlanLimits {
            max_min_instances: settings
                .max_min_instances
                .unwrap_or(defaults.max_min_instances),
            max_max_instances: settings
                .max_max_instances
                .unwrap_or(defaults.max_max_instances),
            min_scale_slots: settings.min_scale_slots.unwrap_or(defaults.min_scale_slots),
        };
        Ok(LocalControlPlane::new(self.open_store()?, limits, self.catalog()?))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use warpscale_core::{Deployment, DeploymentState, DeploymentType};

    use super::Context;

    pub fn context(dir: &tempfile::TempDir) -> Context {
        Context {
            config: Default::default(),
            data_dir: dir.path().join("state"),
        }
    }

    pub fn deployment(id: &str, deployment_type: DeploymentType) -> Deployment {
        Deployment {
            id: id.to_string(),
            url: format!("https://{id}.example.sh"),
            deployment_type,
            state: DeploymentState::Ready,
            scale: BTreeMap::new(),
        }
    }
}
