//! Recording backend for coordinator tests.
//!
//! Every device call lands in a shared [`Journal`] so tests can assert on
//! what reached the device, not just on coordinator state.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ember_common::{MusicId, SoundId};
use parking_lot::Mutex;

use crate::device::{
    AssetKey, AudioAssets, AudioOutput, MusicInstance, PlaybackHandle, SoundInstance,
};
use crate::error::{AudioError, AudioResult};

/// A device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Master(f32),
    SoundPlayed {
        id: SoundId,
        volume: f32,
        attenuation: Option<f32>,
    },
    SoundStopped(SoundId),
    MusicOpened(AssetKey),
    MusicPlayed {
        asset: AssetKey,
        volume: f32,
    },
    MusicStopped(AssetKey),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn last_master(&self) -> Option<f32> {
        self.0.lock().iter().rev().find_map(|c| match c {
            Call::Master(v) => Some(*v),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct MockOutput {
    journal: Journal,
    available: bool,
}

impl MockOutput {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            available: true,
        }
    }

    pub fn unavailable(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            available: false,
        }
    }
}

impl AudioOutput for MockOutput {
    fn probe(&mut self) -> AudioResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(AudioError::NoDevice)
        }
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.journal.push(Call::Master(volume));
    }
}

#[derive(Debug)]
pub struct MockAssets {
    journal: Journal,
    sounds: HashSet<SoundId>,
    music: HashMap<MusicId, AssetKey>,
    refuse_play: bool,
}

impl MockAssets {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            sounds: HashSet::new(),
            music: HashMap::new(),
            refuse_play: false,
        }
    }

    pub fn with_sound(mut self, id: u16) -> Self {
        self.sounds.insert(SoundId::new(id));
        self
    }

    pub fn with_music(mut self, id: u16, asset: &str) -> Self {
        self.music.insert(MusicId::new(id), AssetKey::new(asset));
        self
    }

    pub fn refusing_play(mut self) -> Self {
        self.refuse_play = true;
        self
    }
}

impl AudioAssets for MockAssets {
    type Sound = MockSound;
    type Music = MockMusic;

    fn sound_effect(&mut self, id: SoundId) -> Option<MockSound> {
        self.sounds.contains(&id).then(|| MockSound {
            id,
            journal: self.journal.clone(),
            volume: 0.0,
            attenuation: None,
            playing: Cell::new(false),
            refuse_play: self.refuse_play,
        })
    }

    fn resolve_music(&self, id: MusicId) -> Option<AssetKey> {
        self.music.get(&id).cloned()
    }

    fn open_music(&mut self, key: &AssetKey) -> Option<MockMusic> {
        self.journal.push(Call::MusicOpened(key.clone()));
        Some(MockMusic {
            asset: key.clone(),
            journal: self.journal.clone(),
            volume: 0.0,
            playing: false,
            updates: 0,
            refuse_play: self.refuse_play,
        })
    }
}

#[derive(Debug)]
pub struct MockSound {
    id: SoundId,
    journal: Journal,
    volume: f32,
    attenuation: Option<f32>,
    playing: Cell<bool>,
    refuse_play: bool,
}

impl MockSound {
    /// Simulates the device reaching the end of the sample.
    pub fn finish(&self) {
        self.playing.set(false);
    }

    pub fn attenuation(&self) -> Option<f32> {
        self.attenuation
    }
}

impl PlaybackHandle for MockSound {
    fn play(&mut self, volume: f32) -> bool {
        self.start(volume, None)
    }

    fn stop(&mut self) {
        self.playing.set(false);
        self.journal.push(Call::SoundStopped(self.id));
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

impl SoundInstance for MockSound {
    fn play_attenuated(&mut self, volume: f32, attenuation: f32) -> bool {
        self.start(volume, Some(attenuation))
    }
}

impl MockSound {
    fn start(&mut self, volume: f32, attenuation: Option<f32>) -> bool {
        if self.refuse_play {
            return false;
        }
        self.volume = volume;
        self.attenuation = attenuation;
        self.playing.set(true);
        self.journal.push(Call::SoundPlayed {
            id: self.id,
            volume,
            attenuation,
        });
        true
    }
}

#[derive(Debug)]
pub struct MockMusic {
    asset: AssetKey,
    journal: Journal,
    volume: f32,
    playing: bool,
    updates: u32,
    refuse_play: bool,
}

impl MockMusic {
    pub fn updates(&self) -> u32 {
        self.updates
    }
}

impl PlaybackHandle for MockMusic {
    fn play(&mut self, volume: f32) -> bool {
        if self.refuse_play {
            return false;
        }
        self.volume = volume;
        self.playing = true;
        self.journal.push(Call::MusicPlayed {
            asset: self.asset.clone(),
            volume,
        });
        true
    }

    fn stop(&mut self) {
        self.playing = false;
        self.journal.push(Call::MusicStopped(self.asset.clone()));
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

impl MusicInstance for MockMusic {
    fn update(&mut self) {
        self.updates += 1;
    }
}
