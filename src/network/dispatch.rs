//! Command dispatch
//!
//! Turns one datagram into at most one action. Nothing here returns an
//! error: every failure is terminal for its request only and ends up as a
//! logged [`Outcome`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{AudioOutput, SoundCatalog};
use crate::config::SettingsStore;
use crate::error::ParseError;
use crate::playback::{Blocker, PlaybackCoordinator, SourceId};
use crate::player::ExternalPlayer;
use crate::protocol::Command;

/// What happened to a datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Malformed or unrecognized arguments
    Rejected(ParseError),
    DelayUpdated(Duration),
    MinVolumeUpdated(u8),
    MaxVolumeUpdated(u8),
    /// The server should stop
    Abort,
    PlayerResumed,
    PlayerPaused,
    /// Operator toggle with no external player, or the call failed
    PlayerUnavailable(String),
    /// No catalog entry for this name
    NotFound(String),
    /// Source is inside its debounce window
    Blocked(SourceId),
    /// Catalog entry exists but its file does not
    ResourceMissing(PathBuf),
    /// Playback started; `playing` is the count after this sound
    Playing { name: String, playing: u32 },
    PlayFailed(String),
}

/// Shared state the command path acts on
pub struct Dispatcher {
    settings: Arc<SettingsStore>,
    catalog: Arc<SoundCatalog>,
    blocker: Blocker,
    coordinator: Arc<PlaybackCoordinator>,
    audio: Arc<dyn AudioOutput>,
    player: Arc<dyn ExternalPlayer>,
}

impl Dispatcher {
    pub fn new(
        settings: Arc<SettingsStore>,
        catalog: Arc<SoundCatalog>,
        audio: Arc<dyn AudioOutput>,
        player: Arc<dyn ExternalPlayer>,
    ) -> Self {
        let blocker = Blocker::new(Arc::clone(&settings));
        let coordinator = Arc::new(PlaybackCoordinator::new(
            Arc::clone(&player),
            Arc::clone(&settings),
        ));
        Self {
            settings,
            catalog,
            blocker,
            coordinator,
            audio,
            player,
        }
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn coordinator(&self) -> &Arc<PlaybackCoordinator> {
        &self.coordinator
    }

    pub fn blocker(&self) -> &Blocker {
        &self.blocker
    }

    /// Parse and act on one datagram from `source`.
    ///
    /// Must run inside a tokio runtime (admission schedules its unblock
    /// there).
    pub fn dispatch(&self, source: SocketAddr, payload: &[u8]) -> Outcome {
        let command = match Command::from_bytes(payload) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Rejected command from {}: {}", source, e);
                return Outcome::Rejected(e);
            }
        };
        tracing::debug!("Received {:?} from {}", command, source);
        self.execute(source, command)
    }

    fn execute(&self, source: SocketAddr, command: Command) -> Outcome {
        match command {
            Command::SetDelay(delay) => {
                self.settings.set_block_delay(delay);
                tracing::info!("Set blocking time to {} ms", delay.as_millis());
                Outcome::DelayUpdated(delay)
            }
            Command::SetMinVolume(volume) => {
                self.settings.set_min_volume(volume);
                tracing::info!("Set min volume to {}", volume);
                Outcome::MinVolumeUpdated(volume)
            }
            Command::SetMaxVolume(volume) => {
                self.settings.set_max_volume(volume);
                tracing::info!("Set max volume to {}", volume);
                Outcome::MaxVolumeUpdated(volume)
            }
            Command::Abort => {
                tracing::info!("Abort received from {}", source);
                Outcome::Abort
            }
            Command::Play => self.toggle_player(true),
            Command::Pause => self.toggle_player(false),
            Command::PlaySound(name) => self.request_sound(source.ip(), name),
        }
    }

    fn toggle_player(&self, resume: bool) -> Outcome {
        if !self.player.is_available() {
            tracing::warn!("No external player configured");
            return Outcome::PlayerUnavailable("not configured".into());
        }
        let result = if resume {
            self.player.resume()
        } else {
            self.player.pause()
        };
        match (result, resume) {
            (Ok(()), true) => {
                tracing::info!("Resumed external player");
                Outcome::PlayerResumed
            }
            (Ok(()), false) => {
                tracing::info!("Paused external player");
                Outcome::PlayerPaused
            }
            (Err(e), _) => {
                tracing::warn!("External player command failed: {}", e);
                Outcome::PlayerUnavailable(e.to_string())
            }
        }
    }

    fn request_sound(&self, source: SourceId, name: String) -> Outcome {
        tracing::info!("Received \"{}\" from {}", name, source);

        let Some(sound) = self.catalog.lookup(&name) else {
            tracing::info!("Sound not in catalog: {}", name);
            return Outcome::NotFound(name);
        };

        if !self.blocker.check_and_block(source) {
            tracing::info!("{} is blocked, ignoring \"{}\"", source, name);
            return Outcome::Blocked(source);
        }

        if !sound.exists() {
            tracing::warn!("Sound file not found: {}", sound.path().display());
            return Outcome::ResourceMissing(sound.path().to_path_buf());
        }

        let playing = self.coordinator.begin();
        let coordinator = Arc::clone(&self.coordinator);
        let finished = name.clone();
        let on_complete = Box::new(move || {
            let remaining = coordinator.end();
            tracing::debug!("\"{}\" finished, {} still playing", finished, remaining);
        });

        match self.audio.play(sound.path(), on_complete) {
            Ok(()) => {
                tracing::info!("Playing \"{}\" for {}", name, source);
                Outcome::Playing { name, playing }
            }
            Err(e) => {
                // The completion will never fire; balance the begin here
                self.coordinator.end();
                tracing::error!("Failed to play \"{}\": {}", name, e);
                Outcome::PlayFailed(e.to_string())
            }
        }
    }
}
