//! Soundboard Server
//!
//! Listens for UDP commands and plays sounds on the default output device.
//!
//! ```text
//! soundboard [CONFIG] [--player PATH | --no-player]
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_soundboard::{
    audio::{AudioOutput, RodioOutput, SoundCatalog},
    config::{AppConfig, SettingsStore},
    network::{CommandServer, Dispatcher},
    player::{ExternalPlayer, Silverjuke},
};

/// Operator choice for the external player path
enum PlayerArg {
    Keep,
    Set(PathBuf),
    Clear,
}

fn parse_args() -> Result<(Option<PathBuf>, PlayerArg)> {
    let mut config_path = None;
    let mut player = PlayerArg::Keep;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--player" => {
                let path = args.next().context("--player needs a path")?;
                player = PlayerArg::Set(PathBuf::from(path));
            }
            "--no-player" => player = PlayerArg::Clear,
            _ => config_path = Some(PathBuf::from(arg)),
        }
    }
    Ok((config_path, player))
}

/// Load config and settings, open the audio device, and bind the socket.
/// Must be called from within a tokio runtime.
fn build_server(
    config_path: Option<PathBuf>,
    player_arg: PlayerArg,
) -> lan_soundboard::Result<CommandServer> {
    let config = AppConfig::load_or_default(config_path.as_deref())?;

    let settings = match SettingsStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Settings will not be saved: {}", e);
            Arc::new(SettingsStore::default())
        }
    };
    match player_arg {
        PlayerArg::Keep => {}
        PlayerArg::Set(path) => {
            tracing::info!("Saved the path to the external player: {}", path.display());
            settings.set_external_player_path(Some(path));
        }
        PlayerArg::Clear => settings.set_external_player_path(None),
    }

    let catalog = match SoundCatalog::load(&config.sounds.directory) {
        Ok(catalog) => {
            tracing::info!("Loaded {} sound(s): {}", catalog.len(), catalog.names().join(", "));
            catalog
        }
        Err(e) => {
            tracing::error!("Failed to initialize sounds: {}", e);
            SoundCatalog::empty(&config.sounds.directory)
        }
    };

    let audio: Arc<dyn AudioOutput> = Arc::new(RodioOutput::new()?);
    let player: Arc<dyn ExternalPlayer> = Arc::new(Silverjuke::new(Arc::clone(&settings)));
    if player.is_available() {
        tracing::info!("External player ducking enabled ({:?})", settings.duck_mode());
    }

    let dispatcher = Arc::new(Dispatcher::new(
        settings,
        Arc::new(catalog),
        audio,
        player,
    ));
    Ok(CommandServer::bind(config.server, dispatcher)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LAN Soundboard");

    let (config_path, player_arg) = parse_args()?;
    let server = build_server(config_path, player_arg)?;
    let handle = server.handle();

    let mut server_task = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_task => {
            result.context("server task panicked")?;
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
            handle.shutdown();
            server_task.await.context("server task panicked")?;
        }
    }

    Ok(())
}
