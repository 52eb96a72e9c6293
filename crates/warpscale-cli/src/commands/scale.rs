//! `warpscale scale`: submit a scale spec and wait for it to converge.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tokio::sync::watch;
use tracing::warn;
use warpscale_engine::{
    ScaleError, ScaleOptions, ScaleOutcome, Scaler, VerificationOutcome, VerifyError,
};

use super::Context;

/// Exit status for a request that was applied but not observed to converge.
pub const EXIT_UNVERIFIED: u8 = 2;

/// Command-line overrides for the configured scale options.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaleFlags {
    pub no_verify: bool,
    pub verify_timeout: Option<Duration>,
}

pub fn options(ctx: &Context, flags: ScaleFlags) -> Result<ScaleOptions> {
    let verify_timeout = match flags.verify_timeout {
        Some(timeout) => timeout,
        None => ctx.config.verify_timeout().context("invalid [scale].verify_timeout")?,
    };
    let poll_interval = ctx
        .config
        .poll_interval()
        .context("invalid [scale].poll_interval")?;

    Ok(ScaleOptions {
        verify: !flags.no_verify,
        verify_timeout,
        poll_interval,
    })
}

/// Run the `warpscale scale` command.
pub async fn scale(
    ctx: &Context,
    deployment: &str,
    args: &[String],
    flags: ScaleFlags,
    shutdown: watch::Receiver<bool>,
) -> Result<ExitCode> {
    let scaler = Scaler::new(ctx.open_plane()?, ctx.catalog()?, options(ctx, flags)?);

    match scaler.scale(deployment, args, shutdown).await {
        Ok(outcome) => {
            report(&outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(ScaleError::Verify(err @ VerifyError::VerifyScaleTimeout { .. })) => {
            warn!(deployment, error = %err, "scale applied but not verified");
            eprintln!("⚠ Scale applied to {deployment}, but {err}");
            Ok(ExitCode::from(EXIT_UNVERIFIED))
        }
        Err(err) => Err(err).with_context(|| format!("failed to scale {deployment}")),
    }
}

fn report(outcome: &ScaleOutcome) {
    for (target, range) in &outcome.spec {
        println!("✓ Scaled {} in {target}: {range}", outcome.deployment.id);
    }
    match outcome.verification {
        VerificationOutcome::Converged { polls, elapsed } => {
            println!(
                "✓ Verified after {polls} check(s) in {:.1}s",
                elapsed.as_secs_f64()
            );
        }
        VerificationOutcome::Skipped => println!("  Verification skipped"),
    }
}
