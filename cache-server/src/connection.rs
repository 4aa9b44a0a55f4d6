//! Bridges a live `TcpStream` to the runtime-agnostic
//! [`cache_core::ConnectionState`] (§4.7, §5). All protocol logic lives in
//! `cache-core`; this module only does I/O and logging.

use std::net::SocketAddr;
use std::sync::Arc;

use cache_core::{Cache, ConnectionState, SystemClock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

const READ_BUFFER_SIZE: usize = 4096;

/// Owns one connection end-to-end until the client disconnects or a socket
/// error occurs. Errors here only ever terminate this one task — they never
/// propagate to the accept loop or to other connections.
pub async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    cache: Arc<Mutex<Cache<SystemClock>>>,
) {
    let mut state = ConnectionState::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                tracing::info!(%peer, "connection closed by peer");
                return;
            }
            Ok(n) => n,
            Err(err) => {
                tracing::error!(%peer, error = %err, "read error, dropping connection");
                return;
            }
        };

        let reply = {
            // The lock is only ever held for the synchronous duration of
            // `feed`, never across an `.await` point.
            let mut cache = cache.lock().await;
            state.feed(&buf[..n], &mut cache)
        };

        if reply.is_empty() {
            continue;
        }

        if let Err(err) = stream.write_all(&reply).await {
            tracing::error!(%peer, error = %err, "write error, dropping connection");
            return;
        }
    }
}
