//! Rodio-backed output device and file asset source.
//!
//! - `RodioOutput`: wraps rodio's output stream and the master volume
//! - `FileAssets`: loads sound effects and music tracks from an asset tree
//! - `RodioSound` / `RodioMusic`: one sink per playing handle
//!
//! # Asset layout
//!
//! ```text
//! <root>/
//! ├── sounds/      0.wav, 1.wav, ... (index-named, wav/ogg/mp3/flac)
//! └── music/       file names listed in the music table
//! ```
//!
//! Rodio has no device-wide volume, so the master level lives in a shared
//! mixer and is multiplied into every sink. Changing it re-applies the
//! effective volume to every live sink.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use ember_common::{MusicId, SoundId};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::device::{
    AssetKey, AudioAssets, AudioOutput, MusicInstance, PlaybackHandle, SoundInstance,
};
use crate::error::{AudioError, AudioResult};

/// Extensions tried, in order, for index-named sound effects.
pub const SOUND_EXTENSIONS: [&str; 4] = ["wav", "ogg", "mp3", "flac"];

/// One entry of the music table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicEntry {
    /// Track index used by the game.
    pub index: u16,
    /// File name under the music directory.
    pub file: String,
    /// Restart the track when it ends.
    #[serde(default)]
    pub looping: bool,
}

/// Where audio assets live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset root directory.
    pub root: PathBuf,
    /// Sound effect directory, relative to `root`.
    pub sounds_dir: String,
    /// Music directory, relative to `root`.
    pub music_dir: String,
    /// Track index to file mapping.
    pub music: Vec<MusicEntry>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            sounds_dir: "sounds".to_string(),
            music_dir: "music".to_string(),
            music: Vec::new(),
        }
    }
}

/// Per-sink volume inputs.
#[derive(Debug, Clone, Copy)]
struct Gain {
    volume: f32,
    attenuation: f32,
}

impl Gain {
    fn effective(self, master: f32) -> f32 {
        (self.volume - self.attenuation).max(0.0) * master
    }
}

/// A sink together with the volume the caller asked for.
struct Voice {
    sink: Sink,
    gain: Mutex<Gain>,
}

impl Voice {
    fn apply(&self, master: f32) {
        let gain = *self.gain.lock();
        self.sink.set_volume(gain.effective(master));
    }
}

struct MixerState {
    master: f32,
    voices: Vec<Weak<Voice>>,
}

/// Shared master volume.
#[derive(Clone)]
struct Mixer(Arc<Mutex<MixerState>>);

impl Mixer {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(MixerState {
            master: 1.0,
            voices: Vec::new(),
        })))
    }

    fn master(&self) -> f32 {
        self.0.lock().master
    }

    fn register(&self, voice: &Arc<Voice>) {
        let mut state = self.0.lock();
        state.voices.retain(|v| v.strong_count() > 0);
        state.voices.push(Arc::downgrade(voice));
    }

    fn set_master(&self, master: f32) {
        let mut state = self.0.lock();
        state.master = master;
        state.voices.retain(|weak| match weak.upgrade() {
            Some(voice) => {
                voice.apply(master);
                true
            },
            None => false,
        });
    }

    fn set_gain(&self, voice: &Voice, volume: f32, attenuation: f32) {
        *voice.gain.lock() = Gain {
            volume,
            attenuation,
        };
        voice.apply(self.master());
    }

    fn live_voices(&self) -> usize {
        self.0.lock().voices.iter().filter(|v| v.strong_count() > 0).count()
    }
}

/// Rodio output device.
pub struct RodioOutput {
    /// The output stream (must be kept alive).
    stream: Option<(OutputStream, OutputStreamHandle)>,
    /// Why the stream could not be opened.
    init_error: Option<String>,
    mixer: Mixer,
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioOutput")
            .field("open", &self.stream.is_some())
            .field("master", &self.mixer.master())
            .field("live_voices", &self.mixer.live_voices())
            .finish_non_exhaustive()
    }
}

impl RodioOutput {
    /// Opens the default output device.
    ///
    /// Never fails: a missing device is reported by [`AudioOutput::probe`].
    #[must_use]
    pub fn open_default() -> Self {
        match OutputStream::try_default() {
            Ok(pair) => {
                info!("Audio device initialized");
                Self {
                    stream: Some(pair),
                    init_error: None,
                    mixer: Mixer::new(),
                }
            },
            Err(e) => Self {
                stream: None,
                init_error: Some(e.to_string()),
                mixer: Mixer::new(),
            },
        }
    }

    /// Creates an asset source that plays through this device.
    #[must_use]
    pub fn assets(&self, config: AssetConfig) -> FileAssets {
        FileAssets::new(
            self.stream.as_ref().map(|(_, handle)| handle.clone()),
            self.mixer.clone(),
            config,
        )
    }
}

impl AudioOutput for RodioOutput {
    fn probe(&mut self) -> AudioResult<()> {
        let Some((_, handle)) = &self.stream else {
            return Err(match &self.init_error {
                Some(message) => AudioError::DeviceInitFailed(message.clone()),
                None => AudioError::NoDevice,
            });
        };
        Sink::try_new(handle)
            .map(drop)
            .map_err(|e| AudioError::SinkCreationFailed(e.to_string()))
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.mixer.set_master(volume.clamp(0.0, 1.0));
    }
}

/// Loads sounds and music from an [`AssetConfig`] tree.
pub struct FileAssets {
    handle: Option<OutputStreamHandle>,
    mixer: Mixer,
    config: AssetConfig,
    tracks: HashMap<MusicId, MusicEntry>,
    sound_cache: HashMap<SoundId, Arc<[u8]>>,
}

impl std::fmt::Debug for FileAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAssets")
            .field("root", &self.config.root)
            .field("tracks", &self.tracks.len())
            .field("cached_sounds", &self.sound_cache.len())
            .finish_non_exhaustive()
    }
}

impl FileAssets {
    fn new(handle: Option<OutputStreamHandle>, mixer: Mixer, config: AssetConfig) -> Self {
        let tracks = config
            .music
            .iter()
            .map(|entry| (MusicId::new(entry.index), entry.clone()))
            .collect();

        Self {
            handle,
            mixer,
            config,
            tracks,
            sound_cache: HashMap::new(),
        }
    }

    /// Number of sound effects held in memory.
    #[must_use]
    pub fn cached_sounds(&self) -> usize {
        self.sound_cache.len()
    }

    fn sounds_dir(&self) -> PathBuf {
        self.config.root.join(&self.config.sounds_dir)
    }

    fn music_path(&self, key: &AssetKey) -> PathBuf {
        self.config
            .root
            .join(&self.config.music_dir)
            .join(key.as_str())
    }

    /// First existing file for a sound index.
    #[must_use]
    pub fn sound_path(&self, id: SoundId) -> Option<PathBuf> {
        let dir = self.sounds_dir();
        SOUND_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{ext}", id.raw())))
            .find(|path| path.is_file())
    }

    fn sound_bytes(&mut self, id: SoundId) -> AudioResult<Arc<[u8]>> {
        if let Some(bytes) = self.sound_cache.get(&id) {
            return Ok(Arc::clone(bytes));
        }

        let path = self.sound_path(id).ok_or_else(|| AudioError::LoadFailed {
            path: self.sounds_dir().join(id.raw().to_string()),
            message: "no sound file with a supported extension".to_string(),
        })?;
        let bytes: Arc<[u8]> = fs::read(&path)
            .map_err(|e| AudioError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?
            .into();

        debug!("Loaded sound: {:?} -> {}", path, id);
        self.sound_cache.insert(id, Arc::clone(&bytes));
        Ok(bytes)
    }

    fn new_voice(&self) -> AudioResult<Arc<Voice>> {
        let handle = self.handle.as_ref().ok_or(AudioError::NoDevice)?;
        let sink =
            Sink::try_new(handle).map_err(|e| AudioError::SinkCreationFailed(e.to_string()))?;
        sink.pause();

        let voice = Arc::new(Voice {
            sink,
            gain: Mutex::new(Gain {
                volume: 0.0,
                attenuation: 0.0,
            }),
        });
        self.mixer.register(&voice);
        Ok(voice)
    }

    fn load_sound(&mut self, id: SoundId) -> AudioResult<RodioSound> {
        let bytes = self.sound_bytes(id)?;
        let decoder =
            Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::DecodeFailed(e.to_string()))?;

        let voice = self.new_voice()?;
        voice.sink.append(decoder);

        Ok(RodioSound {
            voice,
            mixer: self.mixer.clone(),
        })
    }

    fn open_track(&self, path: &Path, looping: bool) -> AudioResult<RodioMusic> {
        let voice = self.new_voice()?;
        append_track(&voice.sink, path)?;

        Ok(RodioMusic {
            voice,
            mixer: self.mixer.clone(),
            path: path.to_path_buf(),
            looping,
            stopped: false,
        })
    }
}

/// Streams a track file into a sink.
fn append_track(sink: &Sink, path: &Path) -> AudioResult<()> {
    let file = File::open(path).map_err(|e| AudioError::LoadFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::LoadFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    sink.append(decoder);
    Ok(())
}

impl AudioAssets for FileAssets {
    type Sound = RodioSound;
    type Music = RodioMusic;

    fn sound_effect(&mut self, id: SoundId) -> Option<RodioSound> {
        match self.load_sound(id) {
            Ok(sound) => Some(sound),
            Err(e) => {
                warn!("Failed to load {id}: {e}");
                None
            },
        }
    }

    fn resolve_music(&self, id: MusicId) -> Option<AssetKey> {
        self.tracks
            .get(&id)
            .map(|entry| AssetKey::new(entry.file.as_str()))
    }

    fn open_music(&mut self, key: &AssetKey) -> Option<RodioMusic> {
        let looping = self
            .tracks
            .values()
            .any(|entry| entry.looping && entry.file == key.as_str());
        let path = self.music_path(key);

        match self.open_track(&path, looping) {
            Ok(music) => Some(music),
            Err(e) => {
                warn!("Failed to open music {key}: {e}");
                None
            },
        }
    }
}

/// A sound effect playing on its own sink.
pub struct RodioSound {
    voice: Arc<Voice>,
    mixer: Mixer,
}

impl std::fmt::Debug for RodioSound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSound")
            .field("gain", &*self.voice.gain.lock())
            .field("empty", &self.voice.sink.empty())
            .finish()
    }
}

impl PlaybackHandle for RodioSound {
    fn play(&mut self, volume: f32) -> bool {
        self.play_attenuated(volume, 0.0)
    }

    fn stop(&mut self) {
        self.voice.sink.stop();
    }

    fn is_playing(&self) -> bool {
        !self.voice.sink.empty()
    }

    fn volume(&self) -> f32 {
        self.voice.gain.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.mixer.set_gain(&self.voice, volume, 0.0);
    }
}

impl SoundInstance for RodioSound {
    fn play_attenuated(&mut self, volume: f32, attenuation: f32) -> bool {
        if self.voice.sink.empty() {
            return false;
        }
        self.mixer.set_gain(&self.voice, volume, attenuation);
        self.voice.sink.play();
        true
    }
}

/// A streamed music track.
pub struct RodioMusic {
    voice: Arc<Voice>,
    mixer: Mixer,
    path: PathBuf,
    looping: bool,
    stopped: bool,
}

impl std::fmt::Debug for RodioMusic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioMusic")
            .field("path", &self.path)
            .field("looping", &self.looping)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl PlaybackHandle for RodioMusic {
    fn play(&mut self, volume: f32) -> bool {
        if self.voice.sink.empty() {
            return false;
        }
        self.stopped = false;
        self.mixer.set_gain(&self.voice, volume, 0.0);
        self.voice.sink.play();
        true
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.voice.sink.stop();
    }

    fn is_playing(&self) -> bool {
        !self.stopped && !self.voice.sink.empty()
    }

    fn volume(&self) -> f32 {
        self.voice.gain.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.mixer.set_gain(&self.voice, volume, 0.0);
    }
}

impl MusicInstance for RodioMusic {
    fn update(&mut self) {
        if !self.looping || self.stopped || !self.voice.sink.empty() {
            return;
        }
        match append_track(&self.voice.sink, &self.path) {
            Ok(()) => debug!("Looping music {:?}", self.path),
            Err(e) => {
                warn!("Failed to loop music: {e}");
                self.looping = false;
            },
        }
    }
}
