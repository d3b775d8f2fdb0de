//! Configuration
//!
//! [`AppConfig`] is the static startup configuration (socket, sound folder).
//! [`Settings`] is the mutable runtime view the command path reads before
//! every decision; it lives in a [`SettingsStore`] and is optionally
//! persisted to `settings.toml` next to the config file.

use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::ConfigError;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sounds: SoundsConfig,
}

/// Command listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Largest datagram accepted; longer payloads are truncated by the OS
    pub recv_buffer_size: usize,
    /// How long `Stopping` waits for in-flight playbacks to settle
    pub shutdown_grace_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_UDP_PORT,
            recv_buffer_size: MAX_DATAGRAM_SIZE,
            shutdown_grace_ms: SHUTDOWN_GRACE_MS,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Sound folder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundsConfig {
    pub directory: PathBuf,
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_SOUND_DIR),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Load from `path`, or the platform config file, or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match config_dir() {
            Some(dir) if dir.join(CONFIG_FILE).exists() => Self::load(&dir.join(CONFIG_FILE)),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

/// How the external player is ducked while sounds play
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuckMode {
    /// Drop to `min_volume`, restore `max_volume`
    #[default]
    Volume,
    /// Pause, then resume
    Pause,
}

/// Runtime settings mutated by control commands and the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub block_delay_ms: u64,
    pub min_volume: u8,
    pub max_volume: u8,
    pub duck_mode: DuckMode,
    pub external_player_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            block_delay_ms: DEFAULT_BLOCK_DELAY_MS,
            min_volume: DEFAULT_MIN_VOLUME,
            max_volume: DEFAULT_MAX_VOLUME,
            duck_mode: DuckMode::default(),
            external_player_path: None,
        }
    }
}

/// Thread-safe settings view with best-effort persistence
pub struct SettingsStore {
    inner: RwLock<Settings>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// In-memory store, never written to disk
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
            path: None,
        }
    }

    /// Store backed by a TOML file. A missing file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let settings = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Settings::default()
        };
        Ok(Self {
            inner: RwLock::new(settings),
            path: Some(path),
        })
    }

    /// Store backed by `settings.toml` in the platform config directory
    pub fn open_default() -> Result<Self, ConfigError> {
        let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::open(dir.join(SETTINGS_FILE))
    }

    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    pub fn block_delay(&self) -> Duration {
        Duration::from_millis(self.inner.read().block_delay_ms)
    }

    /// Values beyond [`MAX_BLOCK_DELAY_MS`] are clamped so the settings
    /// file stays writable.
    pub fn set_block_delay(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis())
            .unwrap_or(u64::MAX)
            .min(MAX_BLOCK_DELAY_MS);
        self.update(|s| s.block_delay_ms = ms);
    }

    pub fn min_volume(&self) -> u8 {
        self.inner.read().min_volume
    }

    pub fn set_min_volume(&self, volume: u8) {
        self.update(|s| s.min_volume = volume);
    }

    pub fn max_volume(&self) -> u8 {
        self.inner.read().max_volume
    }

    pub fn set_max_volume(&self, volume: u8) {
        self.update(|s| s.max_volume = volume);
    }

    pub fn duck_mode(&self) -> DuckMode {
        self.inner.read().duck_mode
    }

    pub fn set_duck_mode(&self, mode: DuckMode) {
        self.update(|s| s.duck_mode = mode);
    }

    pub fn has_external_player(&self) -> bool {
        self.inner.read().external_player_path.is_some()
    }

    pub fn external_player_path(&self) -> Option<PathBuf> {
        self.inner.read().external_player_path.clone()
    }

    /// Set or clear the external player executable
    pub fn set_external_player_path(&self, path: Option<PathBuf>) {
        self.update(|s| s.external_player_path = path);
    }

    /// Write the current settings to the backing file, if any
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = toml::to_string_pretty(&*self.inner.read()).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, text).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn update(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.inner.write());
        if let Err(e) = self.save() {
            tracing::warn!("Failed to persist settings: {}", e);
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Platform configuration directory for this application
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}
