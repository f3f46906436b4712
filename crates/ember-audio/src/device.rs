//! Collaborator contracts consumed by the playback coordinator.
//!
//! The coordinator never talks to a sound card or the file system itself.
//! It drives an [`AudioOutput`] (master volume, capability probe) and pulls
//! playable handles out of an [`AudioAssets`] source. Releasing a handle is
//! dropping it: the coordinator owns every handle by value and drops it
//! exactly once, when it is removed from the active set.

use std::fmt;
use std::sync::Arc;

use ember_common::{MusicId, SoundId};

use crate::error::AudioResult;

/// Identity of a resolved music asset.
///
/// Two track indices may map to the same asset; the coordinator compares
/// keys, not indices, to decide whether a request would restart the track
/// that is already playing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(Arc<str>);

impl AssetKey {
    /// Creates a key from an asset name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the asset name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations shared by every playable handle.
pub trait PlaybackHandle {
    /// Starts playback at `volume`. Returns false if the device refused.
    fn play(&mut self, volume: f32) -> bool;

    /// Stops playback. The handle is released when dropped.
    fn stop(&mut self);

    /// Whether the device is still producing output for this handle.
    fn is_playing(&self) -> bool;

    /// Current volume as last set by the caller.
    fn volume(&self) -> f32;

    /// Changes the volume of a playing handle.
    fn set_volume(&mut self, volume: f32);
}

/// A one-shot sound effect.
pub trait SoundInstance: PlaybackHandle {
    /// Starts playback with a distance attenuation applied by the device
    /// next to the base volume.
    fn play_attenuated(&mut self, volume: f32, attenuation: f32) -> bool;
}

/// A streamed music track.
pub trait MusicInstance: PlaybackHandle {
    /// Advances internal playback state (looping, buffering). Called once
    /// per frame while the track occupies a slot.
    fn update(&mut self);
}

/// The output device.
pub trait AudioOutput {
    /// Checks that the host can produce audio at all.
    fn probe(&mut self) -> AudioResult<()>;

    /// Sets the device-wide master volume (0.0 - 1.0).
    fn set_master_volume(&mut self, volume: f32);
}

/// Source of playable sound and music handles.
pub trait AudioAssets {
    /// Sound effect handle type.
    type Sound: SoundInstance;
    /// Music track handle type.
    type Music: MusicInstance;

    /// Creates a fresh, not yet playing handle for a sound effect.
    fn sound_effect(&mut self, id: SoundId) -> Option<Self::Sound>;

    /// Resolves a track index to the asset it plays, without opening it.
    fn resolve_music(&self, id: MusicId) -> Option<AssetKey>;

    /// Opens a music asset for playback.
    fn open_music(&mut self, key: &AssetKey) -> Option<Self::Music>;
}
