//! SlateKV Server Binary
//!
//! Starts the TCP server for SlateKV.

use std::sync::Arc;

use clap::Parser;
use slatekv::{Config, Database, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// SlateKV Server
#[derive(Parser, Debug)]
#[command(name = "slatekv-server")]
#[command(about = "Collection-based key-value store over an append-only record log")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./slatekv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Extension of collection files
    #[arg(short, long, default_value = "dat")]
    extension: String,

    /// Per-connection read/write timeout in milliseconds (0 disables)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slatekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SlateKV Server v{}", slatekv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .file_extension(&args.extension)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let database = match Database::open(config.clone()) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Database initialized with {} collections",
        database.collection_names().len()
    );

    let server = match Server::bind(config, database) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
