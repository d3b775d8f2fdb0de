//! Silverjuke jukebox integration
//!
//! Silverjuke accepts scripting commands on its command line:
//! `Silverjuke --execute=player.volume=128`.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use crate::config::SettingsStore;
use crate::error::PlayerError;
use crate::player::ExternalPlayer;

const PAUSE_SCRIPT: &str = "player.pause()";
const RESUME_SCRIPT: &str = "player.play()";

fn volume_script(volume: u8) -> String {
    format!("player.volume={}", volume)
}

/// Drives Silverjuke through its `--execute` flag
pub struct Silverjuke {
    settings: Arc<SettingsStore>,
}

impl Silverjuke {
    /// The executable path is read from `settings` on every call so the
    /// operator can change or remove it at runtime.
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }

    /// Build the `--execute` argument for a script statement
    pub fn execute_arg(script: &str) -> String {
        format!("--execute={}", script)
    }

    fn executable(&self) -> Result<PathBuf, PlayerError> {
        let path = self
            .settings
            .external_player_path()
            .ok_or(PlayerError::NotConfigured)?;
        if !path.exists() {
            return Err(PlayerError::Missing(path.display().to_string()));
        }
        Ok(path)
    }

    fn execute(&self, script: &str) -> Result<(), PlayerError> {
        let exe = self.executable()?;
        let mut child = Command::new(&exe)
            .arg(Self::execute_arg(script))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(PlayerError::Spawn)?;

        tracing::debug!("Sent {:?} to {}", script, exe.display());

        // Reap in the background; nobody waits on the result
        let reaper = thread::Builder::new()
            .name("player-reaper".into())
            .spawn(move || {
                if let Err(e) = child.wait() {
                    tracing::warn!("External player did not exit cleanly: {}", e);
                }
            });
        if let Err(e) = reaper {
            tracing::warn!("Failed to spawn reaper thread: {}", e);
        }
        Ok(())
    }
}

impl ExternalPlayer for Silverjuke {
    fn is_available(&self) -> bool {
        self.settings.has_external_player()
    }

    fn set_volume(&self, volume: u8) -> Result<(), PlayerError> {
        self.execute(&volume_script(volume))
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.execute(PAUSE_SCRIPT)
    }

    fn resume(&self) -> Result<(), PlayerError> {
        self.execute(RESUME_SCRIPT)
    }
}
