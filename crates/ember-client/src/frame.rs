//! Fixed-rate frame loop.
//!
//! Calls [`PlaybackCoordinator::update`] once per frame and sleeps away the
//! rest of the frame budget. The loop ends when nothing is audible in either
//! music slot, or when the optional frame limit is reached.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use ember_audio::{AudioAssets, AudioOutput, MusicSlot, PlaybackCoordinator, PlaybackHandle};
use tracing::{debug, info};

/// Why a [`FrameLoop`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No music slot holds a playing stream
    MusicEnded,
    /// The configured frame limit elapsed
    FrameLimit,
}

/// Drives a coordinator at a fixed frame rate.
#[derive(Debug)]
pub struct FrameLoop {
    frame_rate: u32,
    frame_budget: Duration,
    max_frames: Option<u64>,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameLoop {
    /// Creates a loop running at `frame_rate` frames per second (at least 1).
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            frame_rate,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(frame_rate)),
            max_frames: None,
            frames: 0,
        }
    }

    /// Stops the loop after `seconds` worth of frames. Zero means no limit.
    #[must_use]
    pub fn with_max_seconds(mut self, seconds: u32) -> Self {
        self.max_frames = (seconds > 0).then(|| u64::from(seconds) * u64::from(self.frame_rate));
        self
    }

    /// Stops the loop after exactly `frames` frames.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Time allotted to one frame.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Frame limit, if any.
    #[must_use]
    pub fn max_frames(&self) -> Option<u64> {
        self.max_frames
    }

    /// Frames run so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs a single frame without sleeping.
    pub fn tick<O, A>(&mut self, audio: &mut PlaybackCoordinator<O, A>) -> ControlFlow<StopReason>
    where
        O: AudioOutput,
        A: AudioAssets,
    {
        if self.max_frames.is_some_and(|max| self.frames >= max) {
            return ControlFlow::Break(StopReason::FrameLimit);
        }

        audio.update();
        self.frames += 1;

        if music_audible(audio) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(StopReason::MusicEnded)
        }
    }

    /// Runs frames until one of the stop conditions holds.
    pub fn run<O, A>(&mut self, audio: &mut PlaybackCoordinator<O, A>) -> StopReason
    where
        O: AudioOutput,
        A: AudioAssets,
    {
        info!(
            frame_rate = self.frame_rate,
            max_frames = ?self.max_frames,
            "Frame loop started"
        );

        loop {
            let started = Instant::now();
            if let ControlFlow::Break(reason) = self.tick(audio) {
                debug!(frames = self.frames, ?reason, "Frame loop stopped");
                return reason;
            }

            let elapsed = started.elapsed();
            if elapsed < self.frame_budget {
                std::thread::sleep(self.frame_budget - elapsed);
            }
        }
    }
}

fn music_audible<O, A>(audio: &PlaybackCoordinator<O, A>) -> bool
where
    O: AudioOutput,
    A: AudioAssets,
{
    MusicSlot::ALL
        .into_iter()
        .filter_map(|slot| audio.music(slot))
        .any(|channel| channel.stream().is_playing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_audio::{
        AssetKey, AudioContext, AudioProfile, AudioResult, AudioTuning, MusicId, MusicInstance,
        SoundId, SoundInstance,
    };

    struct Output;

    impl AudioOutput for Output {
        fn probe(&mut self) -> AudioResult<()> {
            Ok(())
        }

        fn set_master_volume(&mut self, _volume: f32) {}
    }

    /// Music stream that drains after a fixed number of updates.
    struct Countdown {
        remaining: u32,
        playing: bool,
    }

    impl PlaybackHandle for Countdown {
        fn play(&mut self, _volume: f32) -> bool {
            self.playing = true;
            true
        }
        fn stop(&mut self) {
            self.playing = false;
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn volume(&self) -> f32 {
            0.0
        }
        fn set_volume(&mut self, _volume: f32) {}
    }

    impl SoundInstance for Countdown {
        fn play_attenuated(&mut self, volume: f32, _attenuation: f32) -> bool {
            self.play(volume)
        }
    }

    impl MusicInstance for Countdown {
        fn update(&mut self) {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.playing = false;
            }
        }
    }

    struct Tracks {
        length: u32,
    }

    impl AudioAssets for Tracks {
        type Sound = Countdown;
        type Music = Countdown;

        fn sound_effect(&mut self, _id: SoundId) -> Option<Countdown> {
            None
        }
        fn resolve_music(&self, id: MusicId) -> Option<AssetKey> {
            Some(AssetKey::new(format!("track{}.mp3", id.raw())))
        }
        fn open_music(&mut self, _key: &AssetKey) -> Option<Countdown> {
            Some(Countdown {
                remaining: self.length,
                playing: false,
            })
        }
    }

    fn coordinator(length: u32) -> PlaybackCoordinator<Output, Tracks> {
        PlaybackCoordinator::new(
            Output,
            Tracks { length },
            AudioContext::with_profile(AudioProfile::default()),
            AudioTuning::default(),
        )
    }

    #[test]
    fn test_frame_budget() {
        let frame = FrameLoop::new(50);
        assert_eq!(frame.frame_budget(), Duration::from_millis(20));

        let clamped = FrameLoop::new(0);
        assert_eq!(clamped.frame_budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_max_seconds_converts_to_frames() {
        assert_eq!(FrameLoop::new(60).with_max_seconds(3).max_frames(), Some(180));
        assert_eq!(FrameLoop::new(60).with_max_seconds(0).max_frames(), None);
    }

    #[test]
    fn test_stops_when_music_ends() {
        let mut audio = coordinator(3);
        audio.play_music(MusicId::new(1), false, false);

        let mut frame = FrameLoop::new(1000);
        assert_eq!(frame.run(&mut audio), StopReason::MusicEnded);
        assert_eq!(frame.frames(), 3);
    }

    #[test]
    fn test_stops_at_frame_limit() {
        let mut audio = coordinator(u32::MAX);
        audio.play_music(MusicId::new(1), false, false);

        let mut frame = FrameLoop::new(1000).with_max_frames(5);
        assert_eq!(frame.run(&mut audio), StopReason::FrameLimit);
        assert_eq!(frame.frames(), 5);
    }

    #[test]
    fn test_empty_slots_stop_after_first_frame() {
        let mut audio = coordinator(10);
        let mut frame = FrameLoop::new(1000);

        assert_eq!(frame.tick(&mut audio), ControlFlow::Break(StopReason::MusicEnded));
        assert_eq!(frame.frames(), 1);
    }
}
