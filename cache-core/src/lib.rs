//! Runtime-agnostic protocol parsing, dispatch, and cache engine for a
//! server speaking a subset of the memcached ASCII protocol.
//!
//! This crate has no knowledge of sockets, tokio, or any other I/O runtime —
//! see `cache-server` for the binary that wires [`connection::ConnectionState`]
//! up to real `TcpStream`s. Everything here is plain, synchronous, and
//! unit-testable in isolation.

pub mod clock;
pub mod connection;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod stats;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use connection::ConnectionState;
pub use engine::Cache;
pub use error::{EngineError, FramingError, ParseError};
pub use stats::Stats;
