//! warpscale.toml client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::RegionCatalog;

pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Shortest delay the poller waits between convergence checks.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub scale: Option<ScaleConfig>,
    pub control_plane: Option<ControlPlaneConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// How long to wait for a scale change to converge (e.g., "2m").
    pub verify_timeout: Option<String>,
    /// Delay between convergence checks (e.g., "1s", "500ms").
    pub poll_interval: Option<String>,
    /// Region codes accepted as targets.
    pub regions: Option<Vec<String>>,
}

/// Settings for the local standalone control plane.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    pub data_dir: Option<PathBuf>,
    pub max_min_instances: Option<u32>,
    pub max_max_instances: Option<u32>,
    pub min_scale_slots: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration \"{0}\": expected e.g. \"500ms\", \"30s\", \"5m\"")]
pub struct InvalidDuration(pub String);

impl ClientConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn verify_timeout(&self) -> Result<Duration, InvalidDuration> {
        self.scale
            .as_ref()
            .and_then(|s| s.verify_timeout.as_deref())
            .map_or(Ok(DEFAULT_VERIFY_TIMEOUT), parse_duration)
    }

    /// The configured poll interval; zero is rejected.
    pub fn poll_interval(&self) -> Result<Duration, InvalidDuration> {
        let Some(raw) = self.scale.as_ref().and_then(|s| s.poll_interval.as_deref()) else {
            return Ok(DEFAULT_POLL_INTERVAL);
        };
        let interval = parse_duration(raw)?;
        if interval.is_zero() {
            return Err(InvalidDuration(raw.trim().to_string()));
        }
        Ok(interval)
    }

    pub fn region_catalog(&self) -> anyhow::Result<RegionCatalog> {
        let catalog = match self.scale.as_ref().and_then(|s| s.regions.as_ref()) {
            Some(regions) => RegionCatalog::new(regions)?,
            None => RegionCatalog::with_defaults()?,
        };
        Ok(catalog)
    }

    pub fn control_plane(&self) -> ControlPlaneConfig {
        self.control_plane.clone().unwrap_or_default()
    }
}

/// Parse a duration string like "500ms", "30s", "5m", or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration, InvalidDuration> {
    let s = s.trim();
    let (digits, millis_per_unit) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1_000)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60_000)
    } else {
        (s, 1_000)
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(millis_per_unit))
        .map(Duration::from_millis)
        .ok_or_else(|| InvalidDuration(s.to_string()))
}
