//! Soundboard Trigger
//!
//! Sends one command datagram to a soundboard server.
//!
//! ```text
//! soundboard-trigger 192.168.1.20:1990 song alarm
//! soundboard-trigger 192.168.1.20 delay 2000
//! ```

use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use tokio::net::UdpSocket;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_soundboard::{constants::DEFAULT_UDP_PORT, protocol::Command};

/// Accepts `ip:port`, `[v6]:port`, a bare IP (v4 or v6) or `host[:port]`.
/// Targets without a port get [`DEFAULT_UDP_PORT`].
fn resolve(target: &str) -> Result<SocketAddr> {
    if let Ok(addr) = target.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_UDP_PORT));
    }
    let with_port = if target.contains(':') {
        target.to_string()
    } else {
        format!("{}:{}", target, DEFAULT_UDP_PORT)
    };
    with_port
        .to_socket_addrs()
        .with_context(|| format!("Invalid target address: {}", target))?
        .next()
        .with_context(|| format!("No address for {}", target))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(target) = args.next() else {
        bail!("usage: soundboard-trigger <host[:port]> <command...>");
    };
    let payload = args.collect::<Vec<_>>().join(" ");
    if payload.is_empty() {
        bail!("no command given");
    }

    // Local check only; the server parses again and has the final say
    match payload.parse::<Command>() {
        Ok(command) => tracing::debug!("Sending {:?}", command),
        Err(e) => tracing::warn!("Server will reject {:?}: {}", payload, e),
    }

    let target = resolve(&target)?;
    let bind = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind).await?;
    socket.send_to(payload.as_bytes(), target).await?;

    tracing::info!("Sent {:?} to {}", payload, target);
    Ok(())
}
