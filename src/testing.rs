//! In-memory fakes for the external collaborators

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::audio::{AudioOutput, OnComplete};
use crate::error::{AudioError, PlayerError};
use crate::player::ExternalPlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCall {
    SetVolume(u8),
    Pause,
    Resume,
}

/// Records every call; optionally fails each one
pub struct RecordingPlayer {
    available: bool,
    fail: bool,
    calls: Mutex<Vec<PlayerCall>>,
}

impl RecordingPlayer {
    pub fn available() -> Self {
        Self { available: true, fail: false, calls: Mutex::new(Vec::new()) }
    }

    pub fn unavailable() -> Self {
        Self { available: false, fail: false, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { available: true, fail: true, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: PlayerCall) -> Result<(), PlayerError> {
        self.calls.lock().push(call);
        if self.fail {
            Err(PlayerError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "fake spawn failure",
            )))
        } else {
            Ok(())
        }
    }
}

impl ExternalPlayer for RecordingPlayer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn set_volume(&self, volume: u8) -> Result<(), PlayerError> {
        self.record(PlayerCall::SetVolume(volume))
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.record(PlayerCall::Pause)
    }

    fn resume(&self) -> Result<(), PlayerError> {
        self.record(PlayerCall::Resume)
    }
}

/// Holds completions until the test fires them
#[derive(Default)]
pub struct FakeAudio {
    fail: bool,
    played: Mutex<Vec<PathBuf>>,
    pending: Mutex<Vec<OnComplete>>,
}

impl FakeAudio {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Fire every outstanding completion, newest first
    pub fn finish_all(&self) {
        let pending: Vec<OnComplete> = self.pending.lock().drain(..).rev().collect();
        for on_complete in pending {
            on_complete();
        }
    }
}

impl AudioOutput for FakeAudio {
    fn play(&self, path: &Path, on_complete: OnComplete) -> Result<(), AudioError> {
        if self.fail {
            return Err(AudioError::Playback("fake output failure".into()));
        }
        self.played.lock().push(path.to_path_buf());
        self.pending.lock().push(on_complete);
        Ok(())
    }
}
