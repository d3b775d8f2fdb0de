//! UDP socket setup

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;

use crate::error::NetworkError;

pub use tokio::net::UdpSocket;

/// Create a non-blocking UDP socket bound to `addr`.
///
/// Address reuse is enabled so a restarted server can rebind the command
/// port immediately. Must be called from within a tokio runtime.
pub fn create_socket(addr: SocketAddr, recv_buffer_size: usize) -> Result<UdpSocket, NetworkError> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    socket
        .set_reuse_address(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    // Kernel buffer holds a backlog of commands, not just one
    if let Err(e) = socket.set_recv_buffer_size(recv_buffer_size.saturating_mul(64)) {
        tracing::warn!("Failed to set receive buffer size: {}", e);
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    socket
        .bind(&addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("{}: {}", addr, e)))?;

    UdpSocket::from_std(socket.into()).map_err(|e| NetworkError::BindFailed(e.to_string()))
}
