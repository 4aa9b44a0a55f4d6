//! `cached` — a tokio TCP server speaking a subset of the memcached ASCII
//! protocol (§4.8). One task per connection, one `Cache` behind a mutex
//! shared across every connection; `main` just wires the pieces together.

mod cli;
mod connection;

use std::sync::Arc;

use cache_core::{Cache, SystemClock};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache = Arc::new(Mutex::new(Cache::with_capacity(
        SystemClock,
        cli.max_items,
    )));

    let listener = TcpListener::bind(&cli.listen_addr).await?;
    tracing::info!(addr = %cli.listen_addr, max_items = cli.max_items, "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                tracing::info!(%peer, "accepted connection");
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    connection::handle_connection(stream, peer, cache).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, exiting");
                break;
            }
        }
    }

    Ok(())
}
