//! Scale Applier: submits a spec and types the control plane's answer.

use tracing::{info, warn};

use warpscale_core::plane::codes;
use warpscale_core::*;

use crate::error::{ApplyError, LookupError};

/// Submit `spec` for `deployment_id`. Returns the accepted spec as echoed
/// by the control plane. Not retried here.
pub async fn apply_scale<P: ControlPlane>(
    plane: &P,
    deployment_id: &str,
    spec: &ScaleSpec,
) -> Result<ScaleSpec, ApplyError> {
    info!(deployment = %deployment_id, targets = spec.len(), "submitting scale request");

    match plane.update_scale(deployment_id, spec).await {
        Ok(accepted) => {
            info!(deployment = %deployment_id, "scale request accepted");
            Ok(accepted)
        }
        Err(err) => {
            let err = classify(err, spec);
            warn!(deployment = %deployment_id, error = %err, "scale request rejected");
            Err(err)
        }
    }
}

fn classify(err: ControlPlaneError, spec: &ScaleSpec) -> ApplyError {
    let (code, message, limit) = match err {
        ControlPlaneError::Rejected {
            code,
            message,
            limit,
        } => (code, message, limit),
        other => return ApplyError::Lookup(LookupError::from(other)),
    };

    match code.as_str() {
        codes::FORBIDDEN_MIN_INSTANCES => ApplyError::ForbiddenScaleMinInstances { max: limit },
        codes::FORBIDDEN_MAX_INSTANCES => ApplyError::ForbiddenScaleMaxInstances { max: limit },
        codes::INVALID_MIN_MAX_RELATION => {
            // Every target shares one range.
            let range = spec
                .iter()
                .next()
                .map(|(_, range)| *range)
                .unwrap_or(ScaleRange::new(Bound::Auto, Bound::Auto));
            ApplyError::InvalidScaleMinMaxRelation {
                min: range.min,
                max: range.max,
            }
        }
        codes::NOT_SUPPORTED_MIN_SCALE_SLOTS => ApplyError::NotSupportedMinScaleSlots,
        _ => ApplyError::Rejected { code, message },
    }
}
