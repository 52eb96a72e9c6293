//! Domain types for scale requests and the deployments they act on.
//!
//! `Target` and `Bound` serialize to the same tokens a user types on the
//! command line (`sfo1`, `all`, `auto`), so a `ScaleSpec` goes over the
//! wire as `{"sfo1": {"min": 0, "max": "auto"}}`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier for a deployment.
pub type DeploymentId = String;

// ── Target ─────────────────────────────────────────────────────────

/// A datacenter or region a scale request applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// Every region the platform runs the deployment in.
    All,
    /// A region (`sfo`) or datacenter (`sfo1`) code, lowercased.
    Region(String),
}

impl Target {
    pub const ALL: &'static str = "all";

    pub fn as_str(&self) -> &str {
        match self {
            Target::All => Self::ALL,
            Target::Region(code) => code,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Target::All)
    }
}

impl From<&str> for Target {
    fn from(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        if token == Self::ALL {
            Target::All
        } else {
            Target::Region(token)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Target::from(token.as_str()))
    }
}

// ── Bound ──────────────────────────────────────────────────────────

/// One end of a scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Let the platform decide.
    Auto,
    /// A fixed instance count.
    Count(u32),
}

impl Bound {
    pub const AUTO: &'static str = "auto";

    pub fn count(self) -> Option<u32> {
        match self {
            Bound::Auto => None,
            Bound::Count(n) => Some(n),
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Bound::Auto)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Auto => f.write_str(Self::AUTO),
            Bound::Count(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bound::Auto => serializer.serialize_str(Self::AUTO),
            Bound::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(Bound::Count(n)),
            Raw::Text(s) if s == Self::AUTO => Ok(Bound::Auto),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected an instance count or \"auto\", got \"{s}\""
            ))),
        }
    }
}

/// A `(min, max)` bound pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: Bound,
    pub max: Bound,
}

impl ScaleRange {
    pub fn new(min: Bound, max: Bound) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for ScaleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min={} max={}", self.min, self.max)
    }
}

// ── Deployment ─────────────────────────────────────────────────────

/// A deployed workload as reported by the control plane.
///
/// Read-only from the client's point of view: scale changes happen
/// remotely as a side effect of `ControlPlane::update_scale`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deployment {
    pub id: DeploymentId,
    /// Public URL (`https://my-app-x1y2.example.sh`).
    pub url: String,
    #[serde(rename = "type")]
    pub deployment_type: DeploymentType,
    pub state: DeploymentState,
    /// Applied scale and live instance count, keyed by region or datacenter.
    #[serde(default)]
    pub scale: BTreeMap<String, ScaleSnapshot>,
}

impl Deployment {
    /// Host part of the deployment URL, without scheme or path.
    pub fn host(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        rest.split('/').next().unwrap_or(rest)
    }
}

/// Workload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentType {
    Static,
    Npm,
    Docker,
    Lambdas,
}

impl DeploymentType {
    /// Static deployments are served from a CDN and have no instances.
    pub fn is_scalable(self) -> bool {
        !matches!(self, DeploymentType::Static)
    }

    /// Whether the runtime reports live instance counts.
    pub fn reports_instances(self) -> bool {
        matches!(self, DeploymentType::Npm | DeploymentType::Docker)
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeploymentType::Static => "STATIC",
            DeploymentType::Npm => "NPM",
            DeploymentType::Docker => "DOCKER",
            DeploymentType::Lambdas => "LAMBDAS",
        })
    }
}

/// Deployment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    Initializing,
    Building,
    Deploying,
    Ready,
    Frozen,
    Error,
}

/// Scale state of one region or datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSnapshot {
    pub min: Bound,
    pub max: Bound,
    /// Instances currently running.
    pub current: u32,
}
