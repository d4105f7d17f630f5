use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use anyhow::Context;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::http::connection::{Connection, ReadLimits};
use crate::site::handler::StaticHandler;

/// Binds the listening socket with `SO_REUSEADDR` and the configured backlog.
pub fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = cfg
        .listen_addr
        .to_socket_addrs()
        .with_context(|| format!("Invalid listen address {}", cfg.listen_addr))?
        .next()
        .with_context(|| format!("Listen address {} resolved to nothing", cfg.listen_addr))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .context("Failed to create server socket")?;
    socket
        .set_reuse_address(true)
        .context("Failed to set socket options")?;
    socket
        .set_nonblocking(true)
        .context("Failed to set socket options")?;
    socket
        .bind(&addr.into())
        .with_context(|| format!("Failed to bind {addr}"))?;
    socket
        .listen(cfg.backlog)
        .context("Failed to listen on server socket")?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).context("Failed to register listener with runtime")
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = bind(cfg)?;
    serve(listener, cfg).await
}

/// Accepts connections forever, servicing at most `max_connections` at once.
///
/// A permit is taken before `accept`, so with one permit the next
/// connection is not accepted until the previous one is closed.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    let handler = Arc::new(StaticHandler::new(cfg));
    let limiter = Arc::new(Semaphore::new(cfg.max_connections));
    let limits = ReadLimits {
        max_request_bytes: cfg.max_request_bytes,
        read_timeout: cfg.read_timeout(),
    };

    loop {
        let permit = limiter.clone().acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Failed to accept client connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = handler.clone();
        tokio::spawn(async move {
            {
                let mut conn = Connection::new(socket, handler, limits);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {:#}", peer, e);
                }
            }
            // Socket is closed before the next accept may start
            drop(permit);
        });
    }
}
