//! External media player control
//!
//! The soundboard ducks a co-located jukebox while sounds play and lets
//! operators pause or resume it remotely. Every call is a best-effort,
//! fire-and-forget process invocation.

pub mod silverjuke;

pub use silverjuke::Silverjuke;

use crate::error::PlayerError;

/// Capability to drive an external player
pub trait ExternalPlayer: Send + Sync {
    /// Whether an external player is currently configured
    fn is_available(&self) -> bool;

    /// Set the player volume (0..=255)
    fn set_volume(&self, volume: u8) -> Result<(), PlayerError>;

    fn pause(&self) -> Result<(), PlayerError>;

    fn resume(&self) -> Result<(), PlayerError>;
}

/// Player used when no integration is wanted
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlayer;

impl ExternalPlayer for NoPlayer {
    fn is_available(&self) -> bool {
        false
    }

    fn set_volume(&self, _volume: u8) -> Result<(), PlayerError> {
        Err(PlayerError::NotConfigured)
    }

    fn pause(&self) -> Result<(), PlayerError> {
        Err(PlayerError::NotConfigured)
    }

    fn resume(&self) -> Result<(), PlayerError> {
        Err(PlayerError::NotConfigured)
    }
}
