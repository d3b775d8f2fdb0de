//! Audio output primitive
//!
//! Plays one audio resource and reports when it finished. Each playing
//! sound gets its own waiter thread, so completions arrive concurrently
//! and in any order.

use crossbeam_channel::{bounded, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::AudioError;

/// Completion notification, invoked once when a sound stops
pub type OnComplete = Box<dyn FnOnce() + Send + 'static>;

/// "Play this resource and tell me when it is done"
pub trait AudioOutput: Send + Sync {
    /// Start playing `path`.
    ///
    /// On `Ok`, `on_complete` runs exactly once after playback ends, possibly
    /// on another thread. On `Err`, `on_complete` is dropped without running.
    fn play(&self, path: &Path, on_complete: OnComplete) -> Result<(), AudioError>;
}

/// rodio-backed output on the default device
pub struct RodioOutput {
    handle: OutputStreamHandle,
    /// Dropping this sender lets the stream thread exit
    shutdown_tx: Option<Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
    next_id: Arc<AtomicU64>,
}

impl RodioOutput {
    /// Open the default output device.
    ///
    /// `OutputStream` is not `Send`, so it is created and kept alive on a
    /// dedicated thread; only the handle is shared.
    pub fn new() -> Result<Self, AudioError> {
        let (handle_tx, handle_rx) = bounded::<Result<OutputStreamHandle, AudioError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let stream_thread = thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || {
                let (_stream, handle): (OutputStream, OutputStreamHandle) =
                    match OutputStream::try_default() {
                        Ok(pair) => pair,
                        Err(e) => {
                            let _ = handle_tx.send(Err(AudioError::NoDevice(e.to_string())));
                            return;
                        }
                    };
                if handle_tx.send(Ok(handle)).is_err() {
                    return;
                }
                // Blocks until the sender is dropped
                let _ = shutdown_rx.recv();
                tracing::debug!("Audio output stream closed");
            })
            .map_err(|e| AudioError::NoDevice(e.to_string()))?;

        let handle = handle_rx
            .recv()
            .map_err(|_| AudioError::OutputClosed)??;

        tracing::info!("Audio output opened on default device");

        Ok(Self {
            handle,
            shutdown_tx: Some(shutdown_tx),
            stream_thread: Some(stream_thread),
            next_id: Arc::new(AtomicU64::new(0)),
        })
    }
}

impl AudioOutput for RodioOutput {
    fn play(&self, path: &Path, on_complete: OnComplete) -> Result<(), AudioError> {
        let file = File::open(path).map_err(AudioError::Open)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Playback(e.to_string()))?;
        sink.append(source);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = path.display().to_string();

        thread::Builder::new()
            .name(format!("playback-{}", id))
            .spawn(move || {
                sink.sleep_until_end();
                tracing::debug!("Finished playing {}", name);
                on_complete();
            })
            .map_err(|e| AudioError::Playback(e.to_string()))?;

        Ok(())
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.shutdown_tx.take();
        if let Some(handle) = self.stream_thread.take() {
            let _ = handle.join();
        }
    }
}
