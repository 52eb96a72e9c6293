//! Convergence Poller: waits for the control plane to realize a scale spec.
//!
//! Only deployments whose runtime reports live instance counts (NPM,
//! DOCKER) are polled. A target is satisfied when its reported instance
//! count equals a concrete `min`, or always when `min` is `auto`.
//!
//! The deadline bounds the whole wait, fetches included. Poll intervals
//! below `config::MIN_POLL_INTERVAL` are raised to it.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use warpscale_core::*;

use crate::error::{LookupError, VerifyError};

/// Source of monotonic time and delays for the poller.
pub trait Timer: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// `tokio::time` backed timer; honours a paused test clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            timeout: config::DEFAULT_VERIFY_TIMEOUT,
            poll_interval: config::DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Reported state matched the spec after `polls` fetches.
    Converged { polls: u32, elapsed: Duration },
    /// Verification did not apply (skipped by request, or the deployment
    /// type reports no instances).
    Skipped,
}

/// Poll `deployment` until it satisfies `spec`, the timeout elapses, or
/// `shutdown` flips to `true`.
pub async fn verify_scale<P, T>(
    plane: &P,
    timer: &T,
    deployment: &Deployment,
    spec: &ScaleSpec,
    options: VerifyOptions,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<VerificationOutcome, VerifyError>
where
    P: ControlPlane,
    T: Timer,
{
    if !deployment.deployment_type.reports_instances() {
        debug!(
            deployment = %deployment.id,
            deployment_type = %deployment.deployment_type,
            "deployment reports no instances, skipping verification"
        );
        return Ok(VerificationOutcome::Skipped);
    }

    let started = timer.now();
    let interval = options.poll_interval.max(config::MIN_POLL_INTERVAL);
    let mut polls = 0u32;

    loop {
        let remaining = options
            .timeout
            .saturating_sub(timer.now().saturating_duration_since(started));
        let current = tokio::select! {
            biased;
            _ = cancelled(shutdown) => return Err(VerifyError::Cancelled),
            fetched = plane.get_deployment(&deployment.id) => fetched.map_err(LookupError::from)?,
            _ = timer.sleep(remaining) => {
                warn!(
                    deployment = %deployment.id,
                    polls,
                    timeout_ms = options.timeout.as_millis() as u64,
                    "deployment fetch outlived the verification deadline"
                );
                return Err(VerifyError::VerifyScaleTimeout {
                    timeout: options.timeout,
                });
            }
        };
        polls += 1;

        let elapsed = timer.now().saturating_duration_since(started);
        if is_converged(spec, &current.scale) {
            info!(
                deployment = %deployment.id,
                polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "scale verified"
            );
            return Ok(VerificationOutcome::Converged { polls, elapsed });
        }

        if elapsed >= options.timeout {
            warn!(
                deployment = %deployment.id,
                polls,
                timeout_ms = options.timeout.as_millis() as u64,
                "scale not verified before timeout"
            );
            return Err(VerifyError::VerifyScaleTimeout {
                timeout: options.timeout,
            });
        }

        let wait = interval.min(options.timeout - elapsed);
        debug!(
            deployment = %deployment.id,
            polls,
            wait_ms = wait.as_millis() as u64,
            "scale not converged yet"
        );

        tokio::select! {
            biased;
            _ = cancelled(shutdown) => return Err(VerifyError::Cancelled),
            _ = timer.sleep(wait) => {}
        }
    }
}

/// Whether every target in `spec` is satisfied by the reported scale.
pub fn is_converged(spec: &ScaleSpec, reported: &BTreeMap<String, ScaleSnapshot>) -> bool {
    spec.iter().all(|(target, range)| match target {
        Target::All => !reported.is_empty() && reported.values().all(|s| satisfies(range, s)),
        Target::Region(code) => reported.get(code).is_some_and(|s| satisfies(range, s)),
    })
}

fn satisfies(range: &ScaleRange, snapshot: &ScaleSnapshot) -> bool {
    match range.min {
        Bound::Auto => true,
        Bound::Count(n) => snapshot.current == n,
    }
}

/// Resolves once shutdown is requested. Never resolves if the sender is
/// gone without having signalled.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
