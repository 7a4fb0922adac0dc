//! Proxy group inspector.
//!
//! Loads a group configuration and runs one operation against a group:
//! resolve its backend set, probe latency, or run a health-check sweep.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use proxy_group::config::load_config;
use proxy_group::fallback::FallbackRegistry;
use proxy_group::health::SweepOutcome;
use proxy_group::lifecycle::{build_groups, signals};
use proxy_group::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "proxy-group")]
#[command(about = "Inspect proxy group membership and health", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "proxy-group.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the group's current backend set
    Resolve {
        group: String,
        /// Ask providers to refresh first
        #[arg(long)]
        touch: bool,
    },
    /// Probe latency of every backend in the group
    Probe {
        group: String,
        /// Override the group's test URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Run a provider health-check sweep
    Check { group: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability);
    tracing::info!(
        path = %cli.config.display(),
        providers = config.providers.len(),
        groups = config.groups.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let set = build_groups(&config, &FallbackRegistry::new())?;
    let group_name = match &cli.command {
        Commands::Resolve { group, .. }
        | Commands::Probe { group, .. }
        | Commands::Check { group } => group.clone(),
    };
    let group = set
        .group(&group_name)
        .ok_or_else(|| format!("unknown group `{}`", group_name))?;

    let output = match cli.command {
        Commands::Resolve { touch, .. } => {
            let backends: Vec<_> = group
                .resolve(touch)
                .iter()
                .map(|b| json!({ "name": b.name(), "kind": b.kind().as_str() }))
                .collect();
            json!({ "group": group.name(), "backends": backends })
        }
        Commands::Probe { url, .. } => {
            let url = match url {
                Some(url) => url,
                None => config
                    .groups
                    .iter()
                    .find(|g| g.name == group_name)
                    .map(|g| g.test_url.clone())
                    .unwrap_or_default(),
            };

            let cancel = CancellationToken::new();
            signals::cancel_on_ctrl_c(cancel.clone());
            let delays = group.probe_all(&cancel, &url).await;
            cancel.cancel();

            let delays: BTreeMap<String, u64> = delays?
                .into_iter()
                .map(|(name, delay)| (name, delay.as_millis() as u64))
                .collect();
            json!({ "group": group.name(), "url": url, "delay_ms": delays })
        }
        Commands::Check { .. } => match group.health_check().await {
            SweepOutcome::Completed { failed } => {
                json!({ "group": group.name(), "failed_providers": failed })
            }
            SweepOutcome::AlreadyRunning => json!({ "group": group.name(), "skipped": true }),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
