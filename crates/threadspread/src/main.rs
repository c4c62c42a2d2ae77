use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::{Path, PathBuf};
use std::time::Duration;
use threadspread_scheduler::{Scheduler, SchedulerConfig, DEFAULT_SCHEDULER_NAME};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "threadspread",
    about = "Secondary Kubernetes scheduler that spreads a namespace's CPU limits across nodes"
)]
struct Cli {
    /// Absolute path to a kubeconfig file (defaults to in-cluster config or ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
    /// Scheduler identity that pods claim via spec.schedulerName
    #[arg(long, default_value = DEFAULT_SCHEDULER_NAME)]
    scheduler_name: String,
    /// Seconds between scheduling cycles
    #[arg(long, default_value_t = 5)]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let client = init_kube_client(cli.kubeconfig.as_deref()).await?;

    let config = SchedulerConfig {
        scheduler_name: cli.scheduler_name,
        poll_interval: Duration::from_secs(cli.poll_interval_secs),
    };

    info!(
        "Starting threadspread (scheduler name: '{}', poll interval: {}s)",
        config.scheduler_name, cli.poll_interval_secs
    );

    let token = CancellationToken::new();
    let scheduler = Scheduler::new(client, config);
    let scheduler_token = token.clone();
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.run(scheduler_token).await {
            error!("Scheduler error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| miette::miette!("Failed to listen for ctrl-c: {}", e))?;

    info!("Shutting down gracefully...");
    token.cancel();

    let shutdown_timeout = Duration::from_secs(5);
    let _ = tokio::time::timeout(shutdown_timeout, scheduler_handle).await;

    info!("Shutdown complete");

    Ok(())
}

/// Build a Kubernetes client from an explicit kubeconfig path, or fall back
/// to the default resolution (in-cluster config, then ~/.kube/config).
async fn init_kube_client(kubeconfig: Option<&Path>) -> miette::Result<Client> {
    match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                miette::miette!("Failed to read kubeconfig '{}': {}", path.display(), e)
            })?;

            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    miette::miette!(
                        "Failed to build client config from '{}': {}",
                        path.display(),
                        e
                    )
                })?;

            Client::try_from(config)
                .map_err(|e| miette::miette!("Failed to create Kubernetes client: {}", e))
        }
        None => Client::try_default()
            .await
            .map_err(|e| miette::miette!("Failed to create Kubernetes client: {}", e)),
    }
}
