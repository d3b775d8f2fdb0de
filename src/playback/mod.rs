//! Playback admission and concurrency tracking

pub mod admission;
pub mod coordinator;

pub use admission::{AdmissionRecord, Blocker, SourceId};
pub use coordinator::PlaybackCoordinator;
