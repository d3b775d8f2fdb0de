//! # LAN Soundboard
//!
//! Network-triggered soundboard: clients on the LAN send one-line UDP
//! commands to play named sounds on a shared speaker, tune the debounce
//! window, or drive a co-located media player.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                           SOUNDBOARD HOST                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐  │
//! │  │        Command Server (network::server) - Single UDP Socket      │  │
//! │  │        "song alarm" / "alarm" / "delay 500" / "abort" ...        │  │
//! │  └───────────────────────────────┬─────────────────────────────────┘  │
//! │                                  ▼                                     │
//! │                      Command Interpreter (protocol)                    │
//! │                                  │                                     │
//! │         ┌────────────────────────┼──────────────────────┐             │
//! │         ▼                        ▼                      ▼             │
//! │  ┌─────────────┐        ┌────────────────┐      ┌──────────────┐      │
//! │  │  Settings   │        │ Admission      │      │ External     │      │
//! │  │  (config)   │        │ (per-source    │      │ Player       │      │
//! │  │             │        │  debounce)     │      │ play/pause   │      │
//! │  └─────────────┘        └───────┬────────┘      └──────▲───────┘      │
//! │                                 ▼                      │              │
//! │                      ┌────────────────────┐   duck at 0↔1             │
//! │                      │ Playback           │────────────┘              │
//! │                      │ Coordinator        │◀─────────┐                │
//! │                      └─────────┬──────────┘          │ on_complete    │
//! │                                ▼                     │                │
//! │                      ┌────────────────────┐          │                │
//! │                      │ Audio Output       │──────────┘                │
//! │                      │ (one thread/sound) │                           │
//! │                      └────────────────────┘                           │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod network;
pub mod playback;
pub mod player;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Application name used for the platform config directory
    pub const APP_NAME: &str = "lan-soundboard";

    /// Default UDP port for control commands
    pub const DEFAULT_UDP_PORT: u16 = 1990;

    /// Receive buffer for a single command datagram
    pub const MAX_DATAGRAM_SIZE: usize = 1024;

    /// Default per-source debounce window in milliseconds
    pub const DEFAULT_BLOCK_DELAY_MS: u64 = 5000;

    /// Largest debounce window; settings are stored as TOML (signed 64-bit) integers
    pub const MAX_BLOCK_DELAY_MS: u64 = i64::MAX as u64;

    /// Default ducked external player volume
    pub const DEFAULT_MIN_VOLUME: u8 = 64;

    /// Default restored external player volume
    pub const DEFAULT_MAX_VOLUME: u8 = 255;

    /// Grace period between closing the socket and exiting
    pub const SHUTDOWN_GRACE_MS: u64 = 500;

    /// Default sound folder
    pub const DEFAULT_SOUND_DIR: &str = "sounds";

    /// Catalog file inside the sound folder
    pub const CATALOG_FILE: &str = "sounds.toml";

    /// Startup configuration file name
    pub const CONFIG_FILE: &str = "config.toml";

    /// Persisted settings file name
    pub const SETTINGS_FILE: &str = "settings.toml";
}
