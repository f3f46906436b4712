//! # Ember
//!
//! Audio jukebox for the Ember client: loads `ember.toml`, opens the default
//! output device and plays the login track until it ends.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::Result;
use ember_audio::{AudioContext, PlaybackCoordinator, RodioOutput};
use ember_client::{ClientConfig, FrameLoop};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ember=info".parse()?))
        .init();

    info!("Ember starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(ClientConfig::config_path, PathBuf::from);
    let config = ClientConfig::load_from(&path);
    if !path.exists() {
        if let Err(e) = config.save_to(&path) {
            warn!("Failed to write default config: {e}");
        }
    }

    let context = AudioContext::with_profile(config.profile);
    context.set_login_music(config.login_music);

    let output = RodioOutput::open_default();
    let assets = output.assets(config.assets.clone());
    let mut audio = PlaybackCoordinator::new(output, assets, context, config.tuning);

    if !audio.is_enabled() {
        info!("No audio device, nothing to play");
        return Ok(());
    }

    audio.play_music(config.login_track, false, true);

    let reason = FrameLoop::new(config.frame_rate)
        .with_max_seconds(config.max_seconds)
        .run(&mut audio);
    info!(?reason, "Playback finished");

    audio.stop_sounds();
    audio.stop_music();

    info!("Ember shutdown complete");
    Ok(())
}
