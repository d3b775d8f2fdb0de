//! Datagram command server
//!
//! Owns the command socket and the `Stopped → Running → Stopping → Stopped`
//! lifecycle. Datagrams are handled one at a time on the receive task;
//! playback completions arrive on audio threads and only touch the
//! coordinator.

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::ServerConfig;
use crate::error::NetworkError;
use crate::network::dispatch::{Dispatcher, Outcome};
use crate::network::udp::{create_socket, UdpSocket};

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
    Stopping,
}

/// Receive statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub datagrams_received: u64,
    pub receive_errors: u64,
    pub rejected: u64,
}

/// Cloneable view of a server for status and shutdown
#[derive(Clone)]
pub struct ServerHandle {
    state: Arc<Mutex<ServerState>>,
    stats: Arc<Mutex<ServerStats>>,
    shutdown: Arc<Notify>,
}

impl ServerHandle {
    pub fn state(&self) -> ServerState {
        *self.state.lock()
    }

    pub fn stats(&self) -> ServerStats {
        *self.stats.lock()
    }

    /// Ask the receive loop to stop at its next receive boundary
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    fn set_state(&self, state: ServerState) {
        *self.state.lock() = state;
    }
}

/// UDP command listener
pub struct CommandServer {
    socket: UdpSocket,
    local_addr: SocketAddr,
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    handle: ServerHandle,
}

impl CommandServer {
    /// Bind the command socket. Must be called from within a tokio runtime.
    pub fn bind(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Result<Self, NetworkError> {
        let socket = create_socket(config.socket_addr(), config.recv_buffer_size)?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

        Ok(Self {
            socket,
            local_addr,
            config,
            dispatcher,
            handle: ServerHandle {
                state: Arc::new(Mutex::new(ServerState::Stopped)),
                stats: Arc::new(Mutex::new(ServerStats::default())),
                shutdown: Arc::new(Notify::new()),
            },
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Receive and dispatch until `abort` or [`ServerHandle::shutdown`].
    ///
    /// Closes the socket, waits the configured grace period for in-flight
    /// completions, then returns with the server `Stopped`.
    pub async fn run(self) {
        let CommandServer {
            socket,
            local_addr,
            config,
            dispatcher,
            handle,
        } = self;

        handle.set_state(ServerState::Running);
        tracing::info!("Listening on {}", local_addr);

        let mut buf = vec![0u8; config.recv_buffer_size];
        loop {
            let received = tokio::select! {
                biased;
                _ = handle.shutdown.notified() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                received = socket.recv_from(&mut buf) => received,
            };

            let (len, source) = match received {
                Ok(pair) => pair,
                Err(e) => {
                    handle.stats.lock().receive_errors += 1;
                    tracing::debug!("Receive failed, retrying: {}", e);
                    continue;
                }
            };
            handle.stats.lock().datagrams_received += 1;

            match dispatcher.dispatch(source, &buf[..len]) {
                Outcome::Abort => break,
                Outcome::Rejected(_) => handle.stats.lock().rejected += 1,
                _ => {}
            }
        }

        handle.set_state(ServerState::Stopping);
        drop(socket);
        tracing::info!(
            "Socket closed, waiting {:?} for {} playing sound(s)",
            config.shutdown_grace(),
            dispatcher.coordinator().playing()
        );
        tokio::time::sleep(config.shutdown_grace()).await;

        handle.set_state(ServerState::Stopped);
        tracing::info!("Server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioOutput, SoundCatalog};
    use crate::config::SettingsStore;
    use crate::player::ExternalPlayer;
    use crate::testing::{FakeAudio, RecordingPlayer};
    use std::time::Duration;

    struct Fixture {
        _dir: tempfile::TempDir,
        audio: Arc<FakeAudio>,
        server: CommandServer,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alarm.wav"), b"RIFF").unwrap();
        let mut catalog = SoundCatalog::empty(dir.path());
        catalog.insert("alarm", "alarm.wav");

        let audio = Arc::new(FakeAudio::default());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(SettingsStore::default()),
            Arc::new(catalog),
            Arc::clone(&audio) as Arc<dyn AudioOutput>,
            Arc::new(RecordingPlayer::unavailable()) as Arc<dyn ExternalPlayer>,
        ));

        let config = ServerConfig {
            bind_address: "127.0.0.1".parse().unwrap(),
            port: 0,
            shutdown_grace_ms: 0,
            ..Default::default()
        };
        let server = CommandServer::bind(config, dispatcher).unwrap();
        Fixture { _dir: dir, audio, server }
    }

    async fn send_all(target: SocketAddr, payloads: &[&[u8]]) {
        let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for payload in payloads {
            client.send_to(payload, target).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_song_then_abort() {
        let f = fixture();
        let addr = f.server.local_addr();
        let handle = f.server.handle();
        assert_eq!(handle.state(), ServerState::Stopped);

        send_all(addr, &[b"song alarm", b"song alarm", b"abort"]).await;
        tokio::time::timeout(Duration::from_secs(5), f.server.run())
            .await
            .unwrap();

        assert_eq!(handle.state(), ServerState::Stopped);
        assert_eq!(f.audio.played().len(), 1);
        assert_eq!(handle.stats().datagrams_received, 3);
    }

    #[tokio::test]
    async fn test_nothing_dispatched_after_abort() {
        let f = fixture();
        let addr = f.server.local_addr();
        let handle = f.server.handle();

        send_all(addr, &[b"abort", b"song alarm", b"alarm"]).await;
        tokio::time::timeout(Duration::from_secs(5), f.server.run())
            .await
            .unwrap();

        assert!(f.audio.played().is_empty());
        assert_eq!(handle.stats().datagrams_received, 1);
    }

    #[tokio::test]
    async fn test_garbage_does_not_stop_loop() {
        let f = fixture();
        let addr = f.server.local_addr();
        let handle = f.server.handle();

        send_all(addr, &[&[0xff, 0x00, 0xfe], b"delay abc", b"", b"alarm", b"abort"]).await;
        tokio::time::timeout(Duration::from_secs(5), f.server.run())
            .await
            .unwrap();

        assert_eq!(f.audio.played().len(), 1);
        assert_eq!(handle.stats().rejected, 3);
    }

    #[tokio::test]
    async fn test_shutdown_handle() {
        let f = fixture();
        let handle = f.server.handle();

        let task = tokio::spawn(f.server.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.state(), ServerState::Running);

        handle.shutdown();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(handle.state(), ServerState::Stopped);
    }
}
