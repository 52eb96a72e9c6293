//! Scale orchestration: parse, validate, apply, verify.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use warpscale_core::*;

use crate::apply::apply_scale;
use crate::error::{LookupError, PreconditionError, ScaleError};
use crate::verify::{verify_scale, Timer, TokioTimer, VerificationOutcome, VerifyOptions};

/// Per-invocation scale settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleOptions {
    /// Poll for convergence after the spec is accepted.
    pub verify: bool,
    pub verify_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            verify: true,
            verify_timeout: config::DEFAULT_VERIFY_TIMEOUT,
            poll_interval: config::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ScaleOptions {
    fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            timeout: self.verify_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

/// Result of a successful scale request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOutcome {
    /// The deployment as fetched before the change.
    pub deployment: Deployment,
    /// The spec the control plane accepted.
    pub spec: ScaleSpec,
    pub verification: VerificationOutcome,
}

/// Runs scale requests against one control plane.
pub struct Scaler<P, T = TokioTimer> {
    plane: P,
    catalog: RegionCatalog,
    options: ScaleOptions,
    timer: T,
}

impl<P: ControlPlane> Scaler<P> {
    pub fn new(plane: P, catalog: RegionCatalog, options: ScaleOptions) -> Self {
        Self {
            plane,
            catalog,
            options,
            timer: TokioTimer,
        }
    }
}

impl<P: ControlPlane, T: Timer> Scaler<P, T> {
    /// Replace the clock used by convergence polling.
    pub fn with_timer<U: Timer>(self, timer: U) -> Scaler<P, U> {
        Scaler {
            plane: self.plane,
            catalog: self.catalog,
            options: self.options,
            timer,
        }
    }

    pub fn plane(&self) -> &P {
        &self.plane
    }

    pub fn options(&self) -> &ScaleOptions {
        &self.options
    }

    /// Scale `deployment` (id or URL host) according to `args`
    /// (`<targets> [min] [max]`).
    ///
    /// Nothing is submitted unless the arguments are valid and the
    /// deployment is scalable. `shutdown` aborts convergence polling.
    pub async fn scale<S: AsRef<str>>(
        &self,
        deployment: &str,
        args: &[S],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<ScaleOutcome, ScaleError> {
        let parsed = parse_scale_args(args, &self.catalog)?;
        debug!(
            deployment,
            targets = parsed.targets.len(),
            range = %parsed.range,
            "scale arguments parsed"
        );

        let current = self
            .plane
            .get_deployment(deployment)
            .await
            .map_err(LookupError::from)?;
        check_preconditions(&current)?;

        let spec = parsed.to_spec();
        let accepted = apply_scale(&self.plane, &current.id, &spec).await?;

        let verification = if self.options.verify {
            verify_scale(
                &self.plane,
                &self.timer,
                &current,
                &accepted,
                self.options.verify_options(),
                &mut shutdown,
            )
            .await?
        } else {
            info!(deployment = %current.id, "verification skipped");
            VerificationOutcome::Skipped
        };

        Ok(ScaleOutcome {
            deployment: current,
            spec: accepted,
            verification,
        })
    }
}

fn check_preconditions(deployment: &Deployment) -> Result<(), PreconditionError> {
    if !deployment.deployment_type.is_scalable() {
        return Err(PreconditionError::StaticDeploymentNotScalable {
            id: deployment.id.clone(),
            deployment_type: deployment.deployment_type,
        });
    }
    if deployment.state == DeploymentState::Error {
        return Err(PreconditionError::DeploymentInErrorState(deployment.id.clone()));
    }
    Ok(())
}
