//! Audio settings and runtime inputs.
//!
//! This module provides:
//! - `AudioProfile`: per-user sliders and toggles
//! - `LoginMusic`: global login-screen music settings
//! - `RuntimeState`: window focus and the player's place in the world
//! - `AudioContext`: shared read handles to all three
//!
//! The coordinator only ever reads these. The client owns a clone of the
//! [`AudioContext`] and writes through it when the user changes a setting
//! or the player moves.

use std::sync::Arc;

use ember_common::TileCoord;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default divisor turning a slider value into a normalized volume.
pub const DEFAULT_VOLUME_DELTA: f32 = 250.0;

/// Default number of known music track indices.
pub const DEFAULT_MAX_MUSIC_TRACKS: u16 = 150;

/// Per-user audio settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProfile {
    /// Sound effects enabled.
    pub enable_sound: bool,
    /// Music enabled.
    pub enable_music: bool,
    /// Combat music enabled (independent of `enable_music`).
    pub enable_combat_music: bool,
    /// Sound effects slider.
    pub sound_volume: i32,
    /// Music slider.
    pub music_volume: i32,
    /// Keep playing while the window is in the background.
    pub background_playback: bool,
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self {
            enable_sound: true,
            enable_music: true,
            enable_combat_music: true,
            sound_volume: 100,
            music_volume: 100,
            background_playback: false,
        }
    }
}

/// Login-screen music settings. Global, not tied to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginMusic {
    /// Login music enabled.
    pub enabled: bool,
    /// Login music slider.
    pub volume: i32,
}

impl Default for LoginMusic {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 70,
        }
    }
}

/// Fixed scaling parameters of the audio system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTuning {
    /// Divisor turning a slider value into a normalized volume.
    pub volume_delta: f32,
    /// Track indices at or above this are rejected.
    pub max_music_tracks: u16,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            volume_delta: DEFAULT_VOLUME_DELTA,
            max_music_tracks: DEFAULT_MAX_MUSIC_TRACKS,
        }
    }
}

impl AudioTuning {
    /// Converts a slider value into a normalized volume.
    #[must_use]
    pub fn slider_volume(&self, value: i32) -> f32 {
        value as f32 / self.volume_delta
    }
}

/// The player's view of the world, present only while in game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldView {
    /// Listener position.
    pub player: TileCoord,
    /// Visibility radius in tiles.
    pub view_range: u32,
}

/// Window and world state sampled by the coordinator on every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeState {
    /// Whether the client window has input focus.
    pub window_focused: bool,
    /// The world the player is in, if any.
    pub world: Option<WorldView>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            window_focused: true,
            world: None,
        }
    }
}

impl RuntimeState {
    /// Returns true if playback should be silenced because the window is in
    /// the background and the profile does not allow background playback.
    #[must_use]
    pub fn muted_in_background(&self, profile: &AudioProfile) -> bool {
        !self.window_focused && !profile.background_playback
    }
}

/// Shared read handles to the settings the coordinator consults.
#[derive(Debug, Clone, Default)]
pub struct AudioContext {
    profile: Arc<RwLock<Option<AudioProfile>>>,
    login_music: Arc<RwLock<LoginMusic>>,
    runtime: Arc<RwLock<RuntimeState>>,
}

impl AudioContext {
    /// Creates a context with no active profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with an active profile.
    #[must_use]
    pub fn with_profile(profile: AudioProfile) -> Self {
        let ctx = Self::new();
        ctx.set_profile(Some(profile));
        ctx
    }

    /// Snapshot of the active profile.
    #[must_use]
    pub fn profile(&self) -> Option<AudioProfile> {
        *self.profile.read()
    }

    /// Replaces the active profile (None logs the user out).
    pub fn set_profile(&self, profile: Option<AudioProfile>) {
        *self.profile.write() = profile;
    }

    /// Edits the active profile in place, if there is one.
    pub fn update_profile(&self, f: impl FnOnce(&mut AudioProfile)) {
        if let Some(profile) = self.profile.write().as_mut() {
            f(profile);
        }
    }

    /// Snapshot of the login music settings.
    #[must_use]
    pub fn login_music(&self) -> LoginMusic {
        *self.login_music.read()
    }

    /// Replaces the login music settings.
    pub fn set_login_music(&self, login_music: LoginMusic) {
        *self.login_music.write() = login_music;
    }

    /// Snapshot of the runtime state.
    #[must_use]
    pub fn runtime(&self) -> RuntimeState {
        *self.runtime.read()
    }

    /// Sets the window focus flag.
    pub fn set_window_focused(&self, focused: bool) {
        self.runtime.write().window_focused = focused;
    }

    /// Enters, moves within or leaves (None) the world.
    pub fn set_world(&self, world: Option<WorldView>) {
        self.runtime.write().world = world;
    }
}

/// Whether a computed volume may be handed to the device.
///
/// Values outside [-1, 1] (and NaN) abort the operation instead of being
/// clamped, since a rejected volume means the sound does not play at all.
#[must_use]
pub fn in_device_range(volume: f32) -> bool {
    (-1.0..=1.0).contains(&volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_volume() {
        let tuning = AudioTuning {
            volume_delta: 100.0,
            ..AudioTuning::default()
        };
        assert!((tuning.slider_volume(80) - 0.8).abs() < f32::EPSILON);
        assert!((tuning.slider_volume(0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_in_device_range() {
        assert!(in_device_range(0.0));
        assert!(in_device_range(1.0));
        assert!(in_device_range(-1.0));
        assert!(!in_device_range(1.01));
        assert!(!in_device_range(-1.5));
        assert!(!in_device_range(f32::NAN));
        assert!(!in_device_range(f32::INFINITY));
    }

    #[test]
    fn test_muted_in_background() {
        let profile = AudioProfile::default();
        let mut runtime = RuntimeState::default();
        assert!(!runtime.muted_in_background(&profile));

        runtime.window_focused = false;
        assert!(runtime.muted_in_background(&profile));

        let bg = AudioProfile {
            background_playback: true,
            ..profile
        };
        assert!(!runtime.muted_in_background(&bg));
    }

    #[test]
    fn test_context_clones_share_state() {
        let ctx = AudioContext::new();
        let writer = ctx.clone();

        assert!(ctx.profile().is_none());
        writer.set_profile(Some(AudioProfile::default()));
        writer.update_profile(|p| p.sound_volume = 42);
        writer.set_window_focused(false);

        assert_eq!(ctx.profile().map(|p| p.sound_volume), Some(42));
        assert!(!ctx.runtime().window_focused);
    }

    #[test]
    fn test_update_profile_without_profile_is_noop() {
        let ctx = AudioContext::new();
        ctx.update_profile(|p| p.sound_volume = 1);
        assert!(ctx.profile().is_none());
    }
}
