//! Playback coordination.
//!
//! [`PlaybackCoordinator`] owns every playing sound effect and the two music
//! slots. Each operation samples the current profile and runtime state,
//! derives the volume the device should use, and starts, retunes or stops
//! handles accordingly. Nothing here returns an error: a request that cannot
//! be honoured (no device, no profile, missing asset, volume outside
//! [-1, 1]) is dropped without side effects.
//!
//! # Frame loop
//!
//! ```ignore
//! let mut audio = PlaybackCoordinator::new(output, assets, ctx.clone(), AudioTuning::default());
//!
//! audio.play_music(MusicId::new(3), false, false);
//! audio.play_sound_at(SoundId::new(0x2A), TileCoord::new(1410, 1620));
//!
//! loop {
//!     // ...
//!     audio.update();
//! }
//! ```

use std::fmt;

use ember_common::{MusicId, SoundId, TileCoord};
use tracing::{debug, info, trace, warn};

use crate::device::{AudioAssets, AudioOutput, MusicInstance, PlaybackHandle, SoundInstance};
use crate::music::{MusicChannel, MusicSlot, MusicSlots};
use crate::settings::{in_device_range, AudioContext, AudioProfile, AudioTuning};

/// Where a sound effect is emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    /// UI and self sounds; no distance attenuation.
    Positionless,
    /// A fixed world tile; distance attenuation applies.
    Tile(TileCoord),
}

impl Emitter {
    /// Whether distance attenuation applies.
    #[must_use]
    pub const fn attenuates(self) -> bool {
        matches!(self, Self::Tile(_))
    }
}

/// A sound effect that is currently playing.
#[derive(Debug)]
pub struct ActiveSound<S> {
    id: SoundId,
    emitter: Emitter,
    attenuation: f32,
    instance: S,
}

impl<S> ActiveSound<S> {
    /// Sound effect index.
    #[must_use]
    pub fn id(&self) -> SoundId {
        self.id
    }

    /// Emission point.
    #[must_use]
    pub fn emitter(&self) -> Emitter {
        self.emitter
    }

    /// Attenuation factor supplied when playback started.
    #[must_use]
    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    /// The device handle.
    #[must_use]
    pub fn instance(&self) -> &S {
        &self.instance
    }
}

/// Distance attenuation handed to the device next to the base volume.
///
/// Grows linearly from 0 at the listener to `volume` one tile past the
/// view range.
#[must_use]
pub fn attenuation_factor(volume: f32, distance: u32, view_range: u32) -> f32 {
    if distance >= 1 {
        volume / (view_range as f32 + 1.0) * distance as f32
    } else {
        0.0
    }
}

/// Owns active sound effects and music slots and keeps their volumes in line
/// with the user's settings.
pub struct PlaybackCoordinator<O, A: AudioAssets> {
    output: O,
    assets: A,
    context: AudioContext,
    tuning: AudioTuning,
    /// False once the device probe failed; never flips back.
    enabled: bool,
    sounds: Vec<ActiveSound<A::Sound>>,
    music: MusicSlots<A::Music>,
}

impl<O, A: AudioAssets> fmt::Debug for PlaybackCoordinator<O, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("enabled", &self.enabled)
            .field("tuning", &self.tuning)
            .field("active_sounds", &self.sounds.len())
            .field(
                "ambient",
                &self.music.get(MusicSlot::Ambient).map(MusicChannel::track),
            )
            .field(
                "combat",
                &self.music.get(MusicSlot::Combat).map(MusicChannel::track),
            )
            .finish_non_exhaustive()
    }
}

impl<O: AudioOutput, A: AudioAssets> PlaybackCoordinator<O, A> {
    /// Creates a coordinator, probing the output device once.
    ///
    /// If the probe fails the coordinator stays in degraded mode for its
    /// whole lifetime and every operation is a no-op.
    pub fn new(mut output: O, assets: A, context: AudioContext, tuning: AudioTuning) -> Self {
        let enabled = match output.probe() {
            Ok(()) => {
                info!("Audio output ready");
                true
            },
            Err(e) => {
                warn!("Audio disabled: {e}");
                false
            },
        };

        Self {
            output,
            assets,
            context,
            tuning,
            enabled,
            sounds: Vec::new(),
            music: MusicSlots::new(),
        }
    }

    /// Whether the device probe succeeded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Shared settings handles.
    #[must_use]
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    /// Scaling parameters.
    #[must_use]
    pub fn tuning(&self) -> &AudioTuning {
        &self.tuning
    }

    /// The output device.
    #[must_use]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The asset source.
    #[must_use]
    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Number of sound effects currently tracked.
    #[must_use]
    pub fn active_sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Sound effects currently tracked, oldest first.
    pub fn active_sounds(&self) -> impl Iterator<Item = &ActiveSound<A::Sound>> {
        self.sounds.iter()
    }

    /// Channel loaded in `slot`, if any.
    #[must_use]
    pub fn music(&self, slot: MusicSlot) -> Option<&MusicChannel<A::Music>> {
        self.music.get(slot)
    }

    /// Last track index loaded in `slot`.
    #[must_use]
    pub fn last_track(&self, slot: MusicSlot) -> MusicId {
        self.music.last_track(slot)
    }

    /// Reacts to the window gaining or losing focus.
    ///
    /// Only acts when a profile is active and forbids background playback:
    /// the device master volume goes to 0 on deactivation and back to 1 on
    /// activation.
    pub fn on_focus_changed(&mut self, focused: bool) {
        if !self.enabled {
            return;
        }
        let Some(profile) = self.context.profile() else {
            return;
        };
        if profile.background_playback {
            return;
        }

        let master = if focused { 1.0 } else { 0.0 };
        debug!(focused, master, "Window focus changed");
        self.output.set_master_volume(master);
    }

    /// Plays a positionless sound effect.
    pub fn play_sound(&mut self, id: SoundId) {
        if !self.enabled {
            return;
        }
        let Some(profile) = self.context.profile() else {
            return;
        };
        let muted = self.context.runtime().muted_in_background(&profile);

        let volume = if muted {
            0.0
        } else {
            self.tuning.slider_volume(profile.sound_volume)
        };
        if !in_device_range(volume) {
            trace!(%id, volume, "Sound volume out of range");
            return;
        }
        let volume = if profile.enable_sound { volume } else { 0.0 };

        let Some(mut instance) = self.assets.sound_effect(id) else {
            trace!(%id, "No such sound effect");
            return;
        };
        if instance.play(volume) {
            self.sounds.push(ActiveSound {
                id,
                emitter: Emitter::Positionless,
                attenuation: 0.0,
                instance,
            });
        } else {
            debug!(%id, "Sound effect failed to start");
        }
    }

    /// Plays a sound effect emitted from a world tile.
    ///
    /// Requires the player to be in a world. Sounds beyond the view range
    /// are dropped.
    pub fn play_sound_at(&mut self, id: SoundId, position: TileCoord) {
        if !self.enabled {
            return;
        }
        let runtime = self.context.runtime();
        let Some(world) = runtime.world else {
            return;
        };
        let Some(profile) = self.context.profile() else {
            return;
        };

        let distance = world.player.distance_to(position);
        let volume = self.tuning.slider_volume(profile.sound_volume);
        let attenuation = attenuation_factor(volume, distance, world.view_range);

        if distance > world.view_range {
            trace!(%id, distance, view_range = world.view_range, "Sound out of view range");
            return;
        }
        if !in_device_range(volume) {
            trace!(%id, volume, "Sound volume out of range");
            return;
        }
        let volume = if !profile.enable_sound || runtime.muted_in_background(&profile) {
            0.0
        } else {
            volume
        };

        let Some(mut instance) = self.assets.sound_effect(id) else {
            trace!(%id, "No such sound effect");
            return;
        };
        if instance.play_attenuated(volume, attenuation) {
            self.sounds.push(ActiveSound {
                id,
                emitter: Emitter::Tile(position),
                attenuation,
                instance,
            });
        } else {
            debug!(%id, "Positional sound effect failed to start");
        }
    }

    fn login_music_volume(&self) -> f32 {
        let login = self.context.login_music();
        if login.enabled {
            self.tuning.slider_volume(login.volume)
        } else {
            0.0
        }
    }

    fn profile_music_volume(&self, profile: Option<&AudioProfile>) -> f32 {
        match profile {
            Some(p) if p.enable_music => self.tuning.slider_volume(p.music_volume),
            _ => 0.0,
        }
    }

    fn music_volume(&self, login: bool) -> f32 {
        if login {
            self.login_music_volume()
        } else {
            self.profile_music_volume(self.context.profile().as_ref())
        }
    }

    /// Plays a music track.
    ///
    /// `war_mode` loads the track into the combat slot; `login` takes the
    /// volume from the login music settings instead of the profile. A
    /// request for the asset already playing in the ambient slot is ignored
    /// unless it is a war mode request.
    pub fn play_music(&mut self, track: MusicId, war_mode: bool, login: bool) {
        if !self.enabled {
            return;
        }
        if track.raw() >= self.tuning.max_music_tracks {
            debug!(%track, max = self.tuning.max_music_tracks, "Music index out of range");
            return;
        }

        let volume = if login {
            self.login_music_volume()
        } else {
            let profile = self.context.profile();
            if war_mode && profile.is_some_and(|p| !p.enable_combat_music) {
                debug!(%track, "Combat music disabled");
                return;
            }
            self.profile_music_volume(profile.as_ref())
        };
        if !in_device_range(volume) {
            trace!(%track, volume, "Music volume out of range");
            return;
        }

        let Some(asset) = self.assets.resolve_music(track) else {
            if self.music.is_occupied(MusicSlot::Ambient) {
                debug!(%track, "Track has no asset, stopping music");
                self.stop_music();
            }
            return;
        };

        let already_playing = self
            .music
            .get(MusicSlot::Ambient)
            .is_some_and(|c| c.asset == asset);
        if already_playing && !war_mode {
            trace!(%track, %asset, "Track already playing");
            return;
        }

        self.stop_music();

        let slot = MusicSlot::for_mode(war_mode);
        let Some(mut stream) = self.assets.open_music(&asset) else {
            debug!(%track, %asset, "Failed to open music");
            return;
        };
        if !stream.play(volume) {
            debug!(%track, %asset, "Music failed to start");
            return;
        }

        info!(%track, %asset, ?slot, volume, "Playing music");
        let replaced = self.music.insert(
            slot,
            MusicChannel {
                track,
                asset,
                stream,
            },
        );
        debug_assert!(replaced.is_none(), "slot must be empty after stop_music");
    }

    /// Re-applies the music volume to the occupied slots.
    ///
    /// The ambient slot stays silent while the combat slot is occupied.
    pub fn update_music_volume(&mut self, login: bool) {
        if !self.enabled || self.music.is_empty() {
            return;
        }

        let volume = self.music_volume(login);
        if !in_device_range(volume) {
            trace!(volume, "Music volume out of range");
            return;
        }

        let ducked = self.music.is_occupied(MusicSlot::Combat);
        if let Some(channel) = self.music.get_mut(MusicSlot::Ambient) {
            channel
                .stream
                .set_volume(if ducked { 0.0 } else { volume });
        }
        if let Some(channel) = self.music.get_mut(MusicSlot::Combat) {
            channel.stream.set_volume(volume);
        }
    }

    /// Re-applies the sound volume to every active sound effect.
    pub fn update_sounds_volume(&mut self) {
        if !self.enabled {
            return;
        }

        let volume = match self.context.profile() {
            Some(p) if p.enable_sound => self.tuning.slider_volume(p.sound_volume),
            _ => 0.0,
        };
        if !in_device_range(volume) {
            trace!(volume, "Sound volume out of range");
            return;
        }

        for sound in &mut self.sounds {
            sound.instance.set_volume(volume);
        }
    }

    /// Stops and releases both music slots.
    pub fn stop_music(&mut self) {
        for slot in MusicSlot::ALL {
            if let Some(mut channel) = self.music.take(slot) {
                debug!(track = %channel.track, ?slot, "Stopping music");
                channel.stream.stop();
            }
        }
    }

    /// Resumes the last ambient track after combat music ends.
    pub fn stop_war_music(&mut self) {
        let track = self.music.last_track(MusicSlot::Ambient);
        self.play_music(track, false, false);
    }

    /// Stops and releases every active sound effect.
    pub fn stop_sounds(&mut self) {
        for mut sound in self.sounds.drain(..) {
            sound.instance.stop();
        }
    }

    /// Per-frame reconciliation.
    ///
    /// Keeps music volumes in line with focus and profile, lets each stream
    /// advance, and releases sound effects the device has finished.
    #[allow(clippy::float_cmp)]
    pub fn update(&mut self) {
        if !self.enabled {
            return;
        }

        let profile = self.context.profile();
        let focused = self.context.runtime().window_focused;
        let combat_playing = self.music.is_occupied(MusicSlot::Combat);
        let music_volume = self.profile_music_volume(profile.as_ref());

        for slot in MusicSlot::ALL {
            let Some(channel) = self.music.get_mut(slot) else {
                continue;
            };

            if let Some(profile) = profile.filter(|p| !p.background_playback) {
                if focused {
                    let ducked = slot == MusicSlot::Ambient && combat_playing;
                    let volume = if ducked || !profile.enable_music {
                        0.0
                    } else {
                        music_volume
                    };
                    if in_device_range(volume) {
                        channel.stream.set_volume(volume);
                    }
                } else if channel.stream.volume() != 0.0 {
                    channel.stream.set_volume(0.0);
                }
            }

            channel.stream.update();
        }

        self.sounds.retain_mut(|sound| {
            if sound.instance.is_playing() {
                return true;
            }
            trace!(id = %sound.id, "Sound effect finished");
            sound.instance.stop();
            false
        });
    }
}
