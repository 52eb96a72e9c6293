use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;
use warpscale_core::config::parse_duration;

mod commands;

#[derive(Parser)]
#[command(
    name = "warpscale",
    about = "warpscale: scale deployments across regions and verify the result",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Client configuration file (optional)
    #[arg(long, global = true, default_value = "warpscale.toml")]
    config: PathBuf,
    /// Local control plane data directory (overrides [control_plane].data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set min/max instance bounds for a deployment.
    ///
    /// ARGS are `<targets> [min] [max]`: targets is `all`, a region
    /// (`sfo`), a datacenter (`sfo1`), or a comma-separated list. Bounds
    /// are counts or `auto`; they default to min=0 max=1.
    Scale {
        /// Deployment id or URL host
        deployment: String,
        /// Targets followed by optional min and max
        #[arg(num_args = 0.., allow_negative_numbers = true)]
        args: Vec<String>,
        /// Return once the request is accepted, without polling
        #[arg(long)]
        no_verify: bool,
        /// How long to wait for convergence (e.g. "90s", "2m")
        #[arg(long, value_parser = parse_duration)]
        verify_timeout: Option<Duration>,
    },
    /// Manage deployments known to the local control plane
    Deployments {
        #[command(subcommand)]
        action: DeploymentsAction,
    },
}

#[derive(Subcommand)]
enum DeploymentsAction {
    /// List deployments and their current scale
    List,
    /// Show one deployment as JSON
    Get {
        /// Deployment id or URL host
        deployment: String,
    },
    /// Create or replace a deployment from a JSON file
    Put {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warpscale=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load(&cli.config, cli.data_dir)?;

    match cli.command {
        Commands::Scale {
            deployment,
            args,
            no_verify,
            verify_timeout,
        } => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, stopping verification");
                    let _ = shutdown_tx.send(true);
                }
            });

            let flags = commands::scale::ScaleFlags {
                no_verify,
                verify_timeout,
            };
            commands::scale::scale(&ctx, &deployment, &args, flags, shutdown_rx).await
        }
        Commands::Deployments { action } => {
            match action {
                DeploymentsAction::List => commands::deployments::list(&ctx)?,
                DeploymentsAction::Get { deployment } => {
                    commands::deployments::get(&ctx, &deployment)?
                }
                DeploymentsAction::Put { file } => commands::deployments::put(&ctx, &file)?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
