//! Audio error types.

use std::path::PathBuf;

use thiserror::Error;

/// Audio backend error types.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device.
    #[error("Failed to initialize audio device: {0}")]
    DeviceInitFailed(String),

    /// No audio device available.
    #[error("No audio device available")]
    NoDevice,

    /// Failed to create audio sink.
    #[error("Failed to create audio sink: {0}")]
    SinkCreationFailed(String),

    /// Failed to load audio file.
    #[error("Failed to load audio file '{path}': {message}")]
    LoadFailed {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to decode audio data.
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::NoDevice;
        assert!(err.to_string().contains("No audio device"));

        let err = AudioError::LoadFailed {
            path: PathBuf::from("sounds/42.wav"),
            message: "not found".to_string(),
        };
        assert!(err.to_string().contains("42.wav"));
        assert!(err.to_string().contains("not found"));
    }
}
