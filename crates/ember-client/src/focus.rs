//! Window focus routing.
//!
//! winit reports focus changes as `WindowEvent::Focused`. The router writes
//! the new state into the shared runtime state (which the coordinator reads
//! on every operation) and then notifies the coordinator so it can adjust
//! the device master volume.

use ember_audio::{AudioAssets, AudioOutput, PlaybackCoordinator};
use tracing::debug;
use winit::event::WindowEvent;

/// Forwards focus transitions to a [`PlaybackCoordinator`].
#[derive(Debug, Clone, Copy)]
pub struct FocusRouter {
    focused: bool,
}

impl Default for FocusRouter {
    fn default() -> Self {
        Self { focused: true }
    }
}

impl FocusRouter {
    /// Creates a router assuming the window starts focused.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last focus state seen.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Handles a window event. Returns true if it was a focus event.
    ///
    /// Repeated events with an unchanged state are swallowed so the master
    /// volume is only touched on real transitions.
    pub fn handle<O, A>(
        &mut self,
        event: &WindowEvent,
        audio: &mut PlaybackCoordinator<O, A>,
    ) -> bool
    where
        O: AudioOutput,
        A: AudioAssets,
    {
        let WindowEvent::Focused(focused) = *event else {
            return false;
        };
        self.set_focused(focused, audio);
        true
    }

    /// Applies a focus state directly, for hosts that do not use winit.
    pub fn set_focused<O, A>(&mut self, focused: bool, audio: &mut PlaybackCoordinator<O, A>)
    where
        O: AudioOutput,
        A: AudioAssets,
    {
        if focused == self.focused {
            return;
        }
        debug!(focused, "Focus transition");
        self.focused = focused;
        audio.context().set_window_focused(focused);
        audio.on_focus_changed(focused);
    }
}
