//! Playback coordinator
//!
//! Counts the sounds currently audible and ducks the external player on
//! the 0 → 1 transition, restoring it on 1 → 0. The count and the ducking
//! call share one critical section so a finishing sound and a starting one
//! cannot interleave their side effects.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::{DuckMode, SettingsStore};
use crate::player::ExternalPlayer;

/// Shared playback counter with ducking side effects
pub struct PlaybackCoordinator {
    playing: Mutex<u32>,
    player: Arc<dyn ExternalPlayer>,
    settings: Arc<SettingsStore>,
}

impl PlaybackCoordinator {
    pub fn new(player: Arc<dyn ExternalPlayer>, settings: Arc<SettingsStore>) -> Self {
        Self {
            playing: Mutex::new(0),
            player,
            settings,
        }
    }

    /// A sound started. Returns the new count.
    pub fn begin(&self) -> u32 {
        let mut playing = self.playing.lock();
        let was = *playing;
        *playing = was.saturating_add(1);

        if was == 0 && self.player.is_available() {
            self.duck_begin();
        }
        *playing
    }

    /// A sound finished. Returns the new count.
    ///
    /// An `end` without a matching `begin` is ignored and logged.
    pub fn end(&self) -> u32 {
        let mut playing = self.playing.lock();
        if *playing == 0 {
            tracing::warn!("Playback end reported with nothing playing");
            return 0;
        }
        *playing -= 1;

        if *playing == 0 && self.player.is_available() {
            self.duck_end();
        }
        *playing
    }

    /// Number of sounds currently playing
    pub fn playing(&self) -> u32 {
        *self.playing.lock()
    }

    // Both duck calls run with the count lock held.

    fn duck_begin(&self) {
        let result = match self.settings.duck_mode() {
            DuckMode::Volume => self.player.set_volume(self.settings.min_volume()),
            DuckMode::Pause => self.player.pause(),
        };
        match result {
            Ok(()) => tracing::debug!("Ducked external player"),
            Err(e) => tracing::warn!("Failed to duck external player: {}", e),
        }
    }

    fn duck_end(&self) {
        let result = match self.settings.duck_mode() {
            DuckMode::Volume => self.player.set_volume(self.settings.max_volume()),
            DuckMode::Pause => self.player.resume(),
        };
        match result {
            Ok(()) => tracing::debug!("Restored external player"),
            Err(e) => tracing::warn!("Failed to restore external player: {}", e),
        }
    }
}
