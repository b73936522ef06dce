//! Connect/listen helpers. Family-agnostic resolution is delegated to
//! `tokio::net::lookup_host`, which wraps the platform resolver the same
//! way `getaddrinfo(AF_UNSPEC)` does.

use std::io;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use crate::error::{RelayError, Result};

/// Resolves `host:port` and tries each candidate address in turn, wrapping
/// the whole attempt (resolution plus every connect) in a single deadline
/// when `timeout_secs > 0`. `0` disables the deadline.
pub async fn connect_with_timeout(host: &str, port: u16, timeout_secs: u64) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");

    if timeout_secs == 0 {
        return try_all_addrs(&addr).await;
    }

    match tokio::time::timeout(Duration::from_secs(timeout_secs), try_all_addrs(&addr)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(RelayError::ConnectTimeout),
    }
}

async fn try_all_addrs(addr: &str) -> Result<TcpStream> {
    let resolved = tokio::net::lookup_host(addr).await?;
    let mut last_err = None;

    for socket_addr in resolved {
        match TcpStream::connect(socket_addr).await {
            Ok(stream) => {
                tracing::info!(%socket_addr, "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(%socket_addr, error = %e, "connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(RelayError::Io(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no addresses resolved for {addr}"))
    })))
}

/// Binds the wildcard address on `port`, accepts exactly one peer, then
/// closes the listening socket — there is never more than one session per
/// invocation.
pub async fn listen_and_accept_one(port: u16) -> Result<TcpStream> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");

    let (stream, peer) = listener.accept().await?;
    tracing::info!(%peer, "connect from peer");

    // Dropping the listener closes it; there is no second accept to serve.
    drop(listener);
    Ok(stream)
}
