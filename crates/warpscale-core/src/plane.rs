//! The control-plane collaborator.
//!
//! Anything that can look up a deployment and accept a scale update:
//! a remote platform API, or the local redb-backed store in
//! `warpscale-state`. Rejections come back as raw codes; turning them into
//! typed errors is the Scale Applier's job.

use std::future::Future;

use thiserror::Error;

use crate::spec::ScaleSpec;
use crate::types::Deployment;

/// Raw failure reported by a control plane.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    #[error("deployment not found: {0}")]
    NotFound(String),

    #[error("permission denied for deployment {0}")]
    Forbidden(String),

    /// The control plane refused the request. `limit` carries the plan
    /// limit the request ran into, when the rejection has one.
    #[error("rejected ({code}): {message}")]
    Rejected {
        code: String,
        message: String,
        limit: Option<u32>,
    },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ControlPlaneError {
    pub fn rejected(code: &str, message: impl Into<String>, limit: Option<u32>) -> Self {
        Self::Rejected {
            code: code.to_string(),
            message: message.into(),
            limit,
        }
    }
}

/// Rejection codes understood by the Scale Applier.
pub mod codes {
    pub const FORBIDDEN_MIN_INSTANCES: &str = "forbidden_min_instances";
    pub const FORBIDDEN_MAX_INSTANCES: &str = "forbidden_max_instances";
    pub const INVALID_MIN_MAX_RELATION: &str = "invalid_min_max_relation";
    pub const NOT_SUPPORTED_MIN_SCALE_SLOTS: &str = "not_supported_min_scale_slots";
}

/// Deployment lookup and scale mutation.
pub trait ControlPlane: Send + Sync {
    /// Fetch a deployment by id or by URL host.
    fn get_deployment(
        &self,
        id_or_host: &str,
    ) -> impl Future<Output = Result<Deployment, ControlPlaneError>> + Send;

    /// Submit a scale spec. Returns the spec the control plane accepted.
    fn update_scale(
        &self,
        deployment_id: &str,
        spec: &ScaleSpec,
    ) -> impl Future<Output = Result<ScaleSpec, ControlPlaneError>> + Send;
}
