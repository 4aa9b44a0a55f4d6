//! Command-line surface (§4.9). A thin `clap` derive struct — the binary
//! reads it once in `main` and never touches `std::env` anywhere else.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cached", about = "An in-memory cache server speaking a subset of the memcached ASCII protocol")]
pub struct Cli {
    /// Address to listen on.
    #[arg(short = 'l', long = "listen-addr", default_value = "127.0.0.1:11211")]
    pub listen_addr: String,

    /// Maximum number of entries held before the least-recently-used one is
    /// evicted.
    #[arg(long = "max-items", default_value_t = cache_core::store::DEFAULT_MAX_ITEMS)]
    pub max_items: usize,
}
