//! replica-router command line.
//!
//! ```text
//! replica-router --config router.toml check    validate, print endpoint plan
//! replica-router --config router.toml probe    open one read and one write session
//! replica-router --config router.toml run      provision, watch for reloads, wait for Ctrl+C
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use replica_router::config::loader::{load_config, save_config};
use replica_router::config::watcher::ConfigWatcher;
use replica_router::lifecycle::{signals, Shutdown};
use replica_router::observability::{logging, metrics};
use replica_router::provider::{StatementCatalog, TcpProvider};
use replica_router::{Manager, RouterConfig, RouterError};

#[derive(Parser)]
#[command(name = "replica-router")]
#[command(about = "Read/write-splitting database session router", long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json).
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the endpoint plan
    Check,
    /// Connect every endpoint and open one read and one write session
    Probe,
    /// Provision the schema and keep the router up until interrupted
    Run {
        /// Drop schema objects before creating them
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability.log_level);

    match cli.command {
        Commands::Check => check(&config),
        Commands::Probe => probe(&config).await?,
        Commands::Run { reset } => run(&cli.config, config, reset).await?,
    }

    Ok(())
}

fn build_manager(config: &RouterConfig) -> Manager {
    let provider = TcpProvider::new(Duration::from_secs(config.timeouts.connect_secs));
    let catalog = StatementCatalog::from_config(&config.schema);
    Manager::new(Arc::new(provider), Arc::new(catalog))
}

fn check(config: &RouterConfig) {
    let database = &config.database;
    println!("balancing: {}", database.balancing);
    println!("Primary: {}", database.primary.redacted_url());
    for replica in &database.replicas {
        println!("Replica: {}", replica.redacted_url());
    }
    if database.replicas.is_empty() {
        println!("warning: no replicas configured, read sessions will fail");
    }
    println!(
        "schema: {} create / {} drop statements",
        config.schema.create.len(),
        config.schema.drop.len()
    );
}

async fn probe(config: &RouterConfig) -> Result<(), RouterError> {
    let manager = build_manager(config);
    manager.initialize(&config.database).await?;

    let result = probe_sessions(&manager).await;
    let teardown = manager.teardown().await;
    result.and(teardown)
}

async fn probe_sessions(manager: &Manager) -> Result<(), RouterError> {
    for endpoint in manager.router()?.endpoints() {
        println!("{}", endpoint);
    }

    match manager.acquire_session().await {
        Ok(mut session) => {
            println!("read  -> {}", session.endpoint());
            session.close().await?;
        }
        Err(RouterError::NoEligibleEndpoint { role }) => println!("read  -> no {} endpoint", role),
        Err(e) => return Err(e),
    }

    let mut session = manager.acquire(true).await?;
    println!("write -> {}", session.endpoint());
    session.close().await
}

async fn run(path: &Path, config: RouterConfig, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let manager = Arc::new(build_manager(&config));
    manager
        .start(&config.database, reset || config.database.reset_schema)
        .await?;

    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    let mut config = config;
    let mut unapplied = false;
    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                match manager.reload(&mut config, new_config).await {
                    Ok(_) => unapplied = false,
                    Err(e) => {
                        tracing::error!(error = %e, "Reconfiguration failed, keeping current router");
                        unapplied = true;
                    }
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    manager.teardown().await?;
    if unapplied {
        tracing::warn!(path = %path.display(), "Configuration file has unapplied changes, not saving");
    } else {
        save_config(path, &config)?;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
