//! Error types for each stage of a scale request.

use std::time::Duration;

use thiserror::Error;
use warpscale_core::{ArgsError, Bound, ControlPlaneError, DeploymentType};

/// Failures looking a deployment up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error("permission denied for deployment {0}")]
    PermissionDenied(String),

    #[error("control plane request failed: {0}")]
    Transport(String),
}

impl From<ControlPlaneError> for LookupError {
    fn from(err: ControlPlaneError) -> Self {
        match err {
            ControlPlaneError::NotFound(id) => Self::DeploymentNotFound(id),
            ControlPlaneError::Forbidden(id) => Self::PermissionDenied(id),
            ControlPlaneError::Transport(msg) => Self::Transport(msg),
            rejected @ ControlPlaneError::Rejected { .. } => Self::Transport(rejected.to_string()),
        }
    }
}

/// The deployment cannot be scaled in its current form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("deployment {id} is {deployment_type} and cannot be scaled")]
    StaticDeploymentNotScalable {
        id: String,
        deployment_type: DeploymentType,
    },

    #[error("deployment {0} is in the ERROR state")]
    DeploymentInErrorState(String),
}

/// Rejections of a submitted scale spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("requested min exceeds the plan's instance limit{}", limit_suffix(.max))]
    ForbiddenScaleMinInstances { max: Option<u32> },

    #[error("requested max exceeds the plan's instance limit{}", limit_suffix(.max))]
    ForbiddenScaleMaxInstances { max: Option<u32> },

    #[error("min ({min}) resolves greater than max ({max})")]
    InvalidScaleMinMaxRelation { min: Bound, max: Bound },

    #[error("a non-zero minimum instance count is not supported for this deployment")]
    NotSupportedMinScaleSlots,

    #[error("scale request rejected ({code}): {message}")]
    Rejected { code: String, message: String },
}

fn limit_suffix(max: &Option<u32>) -> String {
    max.map(|m| format!(" of {m}")).unwrap_or_default()
}

/// Outcomes of convergence polling other than success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The request was accepted but not observed to converge in time.
    #[error("scale not verified within {}s", .timeout.as_secs_f64())]
    VerifyScaleTimeout { timeout: Duration },

    #[error("verification cancelled")]
    Cancelled,

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Any failure of a scale request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl ScaleError {
    /// True when the scale was applied and only verification timed out.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ScaleError::Verify(VerifyError::VerifyScaleTimeout { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_plane_errors_map_to_lookup() {
        assert_eq!(
            LookupError::from(ControlPlaneError::NotFound("d1".into())),
            LookupError::DeploymentNotFound("d1".into())
        );
        assert_eq!(
            LookupError::from(ControlPlaneError::Forbidden("d1".into())),
            LookupError::PermissionDenied("d1".into())
        );
        assert!(matches!(
            LookupError::from(ControlPlaneError::rejected("weird", "nope", None)),
            LookupError::Transport(msg) if msg.contains("weird")
        ));
    }

    #[test]
    fn messages_carry_limits() {
        let err = ApplyError::ForbiddenScaleMaxInstances { max: Some(10) };
        assert_eq!(err.to_string(), "requested max exceeds the plan's instance limit of 10");

        let err = ApplyError::ForbiddenScaleMinInstances { max: None };
        assert_eq!(err.to_string(), "requested min exceeds the plan's instance limit");

        let err = VerifyError::VerifyScaleTimeout {
            timeout: Duration::from_secs(120),
        };
        assert_eq!(err.to_string(), "scale not verified within 120s");
    }

    #[test]
    fn only_timeout_is_soft() {
        let soft = ScaleError::from(VerifyError::VerifyScaleTimeout {
            timeout: Duration::from_secs(1),
        });
        assert!(soft.is_soft());
        assert!(!ScaleError::from(VerifyError::Cancelled).is_soft());
        assert!(!ScaleError::from(ApplyError::NotSupportedMinScaleSlots).is_soft());
    }
}
