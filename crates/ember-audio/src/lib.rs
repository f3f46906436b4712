//! # Ember Audio
//!
//! Sound effect and music playback for the Ember client.
//!
//! The center of this crate is [`PlaybackCoordinator`]: it owns every
//! playing sound effect and the ambient/combat music slots, and reconciles
//! their volumes with the user's [`AudioProfile`], the window focus and the
//! player's position once per frame.
//!
//! # Modules
//!
//! - [`coordinator`]: the playback coordinator
//! - [`device`]: contracts for output devices and asset sources
//! - [`music`]: the two music slots
//! - [`settings`]: profile, login music, runtime state and shared handles
//! - [`rodio_backend`]: rodio output device and file asset source
//!
//! # Quick Start
//!
//! ```ignore
//! use ember_audio::*;
//!
//! let output = RodioOutput::open_default();
//! let assets = output.assets(AssetConfig::default());
//! let ctx = AudioContext::with_profile(AudioProfile::default());
//!
//! let mut audio = PlaybackCoordinator::new(output, assets, ctx.clone(), AudioTuning::default());
//! audio.play_music(MusicId::new(0), false, true);
//!
//! // Each frame
//! audio.update();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coordinator;
pub mod device;
pub mod error;
pub mod music;
pub mod rodio_backend;
pub mod settings;

#[cfg(test)]
mod mock;

pub use coordinator::{attenuation_factor, ActiveSound, Emitter, PlaybackCoordinator};
pub use device::{
    AssetKey, AudioAssets, AudioOutput, MusicInstance, PlaybackHandle, SoundInstance,
};
pub use error::{AudioError, AudioResult};
pub use music::{MusicChannel, MusicSlot, MusicSlots};
pub use rodio_backend::{AssetConfig, FileAssets, MusicEntry, RodioMusic, RodioOutput, RodioSound};
pub use settings::{
    in_device_range, AudioContext, AudioProfile, AudioTuning, LoginMusic, RuntimeState, WorldView,
    DEFAULT_MAX_MUSIC_TRACKS, DEFAULT_VOLUME_DELTA,
};

pub use ember_common::{MusicId, SoundId, TileCoord};
