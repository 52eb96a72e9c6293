//! `warpscale deployments`: inspect and seed the local control plane.

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use tracing::info;
use warpscale_core::Deployment;

use super::Context;

pub fn list(ctx: &Context) -> Result<()> {
    let deployments = ctx.open_store()?.list_deployments()?;
    if deployments.is_empty() {
        println!("No deployments.");
        return Ok(());
    }

    println!("{:<20} {:<8} {:<14} URL", "ID", "TYPE", "STATE");
    for deployment in &deployments {
        println!(
            "{:<20} {:<8} {:<14} {}",
            deployment.id,
            deployment.deployment_type.to_string(),
            format!("{:?}", deployment.state).to_uppercase(),
            deployment.url
        );
        for (region, snapshot) in &deployment.scale {
            println!(
                "    {region:<8} min={} max={} current={}",
                snapshot.min, snapshot.max, snapshot.current
            );
        }
    }
    Ok(())
}

pub fn get(ctx: &Context, deployment: &str) -> Result<()> {
    let Some(found) = ctx.open_store()?.find_deployment(deployment)? else {
        bail!("deployment not found: {deployment}");
    };
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

pub fn put(ctx: &Context, file: &Path) -> Result<()> {
    let deployment = read_deployment(file)?;
    ctx.open_store()?.put_deployment(&deployment)?;
    info!(deployment = %deployment.id, "deployment stored");
    println!("✓ Stored {} ({})", deployment.id, deployment.deployment_type);
    Ok(())
}

fn read_deployment(file: &Path) -> Result<Deployment> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let deployment: Deployment = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid deployment", file.display()))?;
    if deployment.id.trim().is_empty() {
        bail!("{}: deployment id must not be empty", file.display());
    }
    Ok(deployment)
}
