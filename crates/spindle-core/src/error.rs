//! Error types for decoding and playback.

use std::path::PathBuf;

use crate::decode::Format;

/// Error type for player operations.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// File extension does not map to a supported format.
    #[error("unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The file could not be opened or read.
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The native decoder rejected the stream.
    #[error("invalid {format} stream: {reason}")]
    FormatInvalid {
        /// Format the adapter expected.
        format: Format,
        /// Reason reported by the backend.
        reason: String,
    },

    /// No usable playback device.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device cannot be configured for the requested parameters.
    #[error("device rejected {rate} Hz / {channels}ch signed 16-bit output")]
    UnsupportedParameters {
        /// Requested sample rate in Hz.
        rate: u32,
        /// Requested channel count.
        channels: u16,
    },

    /// The device stopped accepting samples mid-track.
    #[error("device write failed: {0}")]
    WriteFailed(String),
}

impl PlayerError {
    /// Whether this error aborts the whole run.
    ///
    /// Sink configuration failures do; everything else skips the current
    /// file and the run continues.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            PlayerError::DeviceUnavailable(_) | PlayerError::UnsupportedParameters { .. }
        )
    }
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
