//! Cache Report Tool
//!
//! Prints a human-readable dump and metrics of the durable cache file, or
//! clears the cache namespace with `--clear`. Reads the same configuration
//! the application uses, so it always points at the live cache file.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calldeck::cache::CacheDebug;
use calldeck::{Config, FileStore};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_report=info,calldeck=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let store = Arc::new(FileStore::open(&config.cache_path));
    let debug = CacheDebug::new(store);

    if std::env::args().any(|arg| arg == "--clear") {
        let removed = debug.clear();
        println!("cleared {} cache entries from {}", removed, config.cache_path.display());
        return Ok(());
    }

    println!("cache file: {}", config.cache_path.display());
    debug.print();

    let metrics = debug.metrics();
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
