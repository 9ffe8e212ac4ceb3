//! spindle-worker - connects to a command source and runs the builtin hooks

use anyhow::Context;
use clap::Parser;
use spindle::std::hooks::{LoggingHook, PingHook, ServerDirectoryHook};
use spindle::std::storage::JsonStore;
use spindle::std::transport::TcpTransport;
use spindle::{EventType, PluginRegistry, Worker, WorkerConfig, config::DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Event worker for chat command plugins
#[derive(Parser, Debug)]
#[command(name = "spindle-worker")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the startup file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = WorkerConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    for path in &config.plugin_paths {
        tracing::info!(path = %path.display(), "plugin path (plugins are linked in)");
    }

    let store = JsonStore::new(config.storage_dir.clone());
    tracing::info!(root = %store.root().display(), "json storage");

    let registry = PluginRegistry::builder()
        .register(PingHook::descriptor(), PingHook)
        .register(LoggingHook::descriptor(EventType::Ready), LoggingHook)
        .register(ServerDirectoryHook::descriptor(), ServerDirectoryHook::new(store))
        .with_help("help")
        .build()
        .context("building plugin registry")?;

    let transport = TcpTransport::new(&config.server, &config.identifier);
    let mut worker = Worker::new(transport, registry, config.settings())?;
    if let Some(database) = &config.database {
        worker = with_database(worker, database)?;
    }

    worker
        .connect()
        .await
        .with_context(|| format!("connecting to {}", config.server))?;
    tracing::info!(server = %config.server, identifier = %config.identifier, "worker started");

    let outcome = tokio::select! {
        result = worker.run() => result.context("worker loop failed"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl-c")?;
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    };

    let grace = config.shutdown_grace();
    if tokio::time::timeout(grace, worker.drain()).await.is_err() {
        tracing::warn!(in_flight = worker.in_flight(), ?grace, "commands still running at shutdown");
    }
    outcome
}

#[cfg(feature = "sqlite")]
fn with_database(
    worker: Worker<TcpTransport>,
    database: &std::path::Path,
) -> anyhow::Result<Worker<TcpTransport>> {
    tracing::info!(path = %database.display(), "using sqlite sessions");
    let sessions = spindle::std::sqlite::SqliteSessions::open_path(database);
    Ok(worker.with_sessions(std::sync::Arc::new(sessions)))
}

#[cfg(not(feature = "sqlite"))]
fn with_database(
    _worker: Worker<TcpTransport>,
    database: &std::path::Path,
) -> anyhow::Result<Worker<TcpTransport>> {
    anyhow::bail!(
        "database {} configured but sqlite support is not compiled in",
        database.display()
    )
}
