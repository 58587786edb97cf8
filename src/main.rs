//! Observability endpoint resolver CLI.
//!
//! Resolves the observer and RCA agent URLs for an environment or a project
//! by walking its reference chain through the resource API.
//!
//! ```text
//! obs-resolver [--config FILE] [--resources FILE] env   <namespace> <environment>
//! obs-resolver [--config FILE] [--resources FILE] build <namespace> <project>
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use obs_resolver::config::loader::apply_env_overrides;
use obs_resolver::config::{load_config, ResolverConfig};
use obs_resolver::observability::{logging, metrics};
use obs_resolver::resolver::ReferenceCache;
use obs_resolver::{
    ChainResolver, HttpResourceClient, InMemoryResources, ObservabilityClientFactory,
    ResourceLookup,
};

#[derive(Parser)]
#[command(name = "obs-resolver")]
#[command(about = "Resolve observability endpoints for environments and projects", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resolve against a JSON resource set instead of the resource API.
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// Bearer token for the resource API (overrides config and environment).
    #[arg(long)]
    token: Option<String>,

    /// After resolving, GET this path on the observer and print the response.
    #[arg(long)]
    probe: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the runtime observer of an environment
    Env { namespace: String, environment: String },
    /// Resolve the build observer of a project
    Build { namespace: String, project: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = ResolverConfig::default();
            apply_env_overrides(&mut config);
            config
        }
    };
    if let Some(token) = &cli.token {
        config.resource_api.token = Some(token.clone());
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        base_url = %config.resource_api.base_url,
        cache_ttl_secs = config.cache.ttl_secs,
        offline = cli.resources.is_some(),
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

    let lookup: Arc<dyn ResourceLookup> = match &cli.resources {
        Some(path) => Arc::new(InMemoryResources::load_from_file(path)?),
        None => Arc::new(HttpResourceClient::new(&config.resource_api)?),
    };
    let resolver = ChainResolver::with_cache(lookup, ReferenceCache::new(config.cache.ttl()));

    // The client carries the configured token; per-call tokens are not needed here.
    let urls = match &cli.command {
        Commands::Env { namespace, environment } => {
            resolver.resolve_for_environment(namespace, environment, None).await?
        }
        Commands::Build { namespace, project } => {
            resolver.resolve_for_build(namespace, project, None).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&urls)?);

    if let Some(path) = &cli.probe {
        let factory = ObservabilityClientFactory::new(&config.observer)?;
        match factory.for_observer(&urls)? {
            Some(observer) => {
                let body: serde_json::Value = observer.get_json(path, &[], None).await?;
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            None => eprintln!("Observability is not configured; nothing to probe"),
        }
    }

    Ok(())
}
