//! HTTP request acceptor (v1)
//!
//! A listener-owning acceptor thread feeding a fixed pool of worker threads.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!                     │                    HTTP ACCEPTOR                       │
//!                     │                                                        │
//!   Client            │  ┌─────────┐  ready   ┌──────────┐  push  ┌─────────┐  │
//!   connection ───────┼─▶│   net   │─────────▶│ acceptor │───────▶│dispatch │  │
//!                     │  │listener │   gate   │  thread  │        │  queue  │  │
//!                     │  └─────────┘          └──────────┘        └────┬────┘  │
//!                     │                                   work gate    │       │
//!                     │                    ┌───────────┬───────────┬──┘       │
//!                     │                    ▼           ▼           ▼          │
//!                     │               ┌────────┐  ┌────────┐  ┌────────┐      │
//!                     │               │worker 0│  │worker 1│  │worker N│      │
//!                     │               └───┬────┘  └───┬────┘  └───┬────┘      │
//!                     │                   └───────────┼───────────┘           │
//!                     │                               ▼                        │
//!                     │                      ┌────────────────┐               │
//!                     │                      │ RequestHandler │               │
//!                     │                      └────────────────┘               │
//!                     │  ┌──────────────────────────────────────────────────┐ │
//!                     │  │ lifecycle (start/stop, joins) · config · logging │ │
//!                     │  └──────────────────────────────────────────────────┘ │
//!                     └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use http_acceptor::config::loader::load_config;
use http_acceptor::config::validation::validate_config;
use http_acceptor::config::AcceptorConfig;
use http_acceptor::http::StatusService;
use http_acceptor::lifecycle::signals::shutdown_signal;
use http_acceptor::lifecycle::startup::launch;
use http_acceptor::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "http-acceptor")]
#[command(about = "Concurrent HTTP request acceptor with a worker-thread pool", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of worker threads (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Advertise the https scheme
    #[arg(long)]
    secure: bool,
}

impl Cli {
    fn into_config(self) -> Result<AcceptorConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AcceptorConfig::default(),
        };
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(workers) = self.workers {
            config.workers.max_workers = workers;
        }
        if self.secure {
            config.listener.secure = true;
        }
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.observability);

    tracing::info!("http-acceptor v0.1.0 starting");

    let service = Arc::new(StatusService::new());
    let mut server = launch(&config, Arc::clone(&service))?;
    service.attach_stats(server.stats_handle());

    if let Some(addr) = server.local_addr() {
        tracing::info!(address = %addr, prefix = %server.prefix(), "Listening for connections");
    }

    shutdown_signal().await;

    // Joining pool threads blocks; keep it off the async runtime.
    tokio::task::spawn_blocking(move || server.stop()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
