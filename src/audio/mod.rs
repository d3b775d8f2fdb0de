//! Audio subsystem module

pub mod catalog;
pub mod output;

pub use catalog::{Sound, SoundCatalog};
pub use output::{AudioOutput, OnComplete, RodioOutput};
