//! Network subsystem: the UDP command listener

pub mod dispatch;
pub mod server;
pub mod udp;

pub use dispatch::{Dispatcher, Outcome};
pub use server::{CommandServer, ServerHandle, ServerState, ServerStats};
pub use udp::{create_socket, UdpSocket};
