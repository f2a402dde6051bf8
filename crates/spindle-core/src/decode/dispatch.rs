//! Format selection and decoder construction.

use std::fmt;
use std::path::Path;

use crate::error::{PlayerError, Result};

use super::{AudioDecoder, FlacAdapter, Mp3Adapter, VorbisAdapter};

/// Supported stream formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// MPEG layer III.
    Mp3,
    /// Free Lossless Audio Codec.
    Flac,
    /// Ogg Vorbis.
    Vorbis,
    /// Anything else.
    Unknown,
}

impl Format {
    /// Determine the format from the file extension, case-insensitively.
    ///
    /// The extension is authoritative; no content sniffing is performed.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp3" => Format::Mp3,
            "flac" => Format::Flac,
            "ogg" => Format::Vorbis,
            _ => Format::Unknown,
        }
    }

    /// Short human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Mp3 => "MP3",
            Format::Flac => "FLAC",
            Format::Vorbis => "Ogg Vorbis",
            Format::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open a decoder for `path`, selecting the adapter by extension.
///
/// Fails with [`PlayerError::UnsupportedFormat`] when the extension is not
/// recognized; adapter errors are propagated unchanged.
pub fn open(path: &Path) -> Result<Box<dyn AudioDecoder>> {
    match Format::from_path(path) {
        Format::Mp3 => Ok(Box::new(Mp3Adapter::open(path)?)),
        Format::Flac => Ok(Box::new(FlacAdapter::open(path)?)),
        Format::Vorbis => Ok(Box::new(VorbisAdapter::open(path)?)),
        Format::Unknown => Err(PlayerError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_maps_known_extensions() {
        assert_eq!(Format::from_path(Path::new("a.mp3")), Format::Mp3);
        assert_eq!(Format::from_path(Path::new("b.flac")), Format::Flac);
        assert_eq!(Format::from_path(Path::new("c.ogg")), Format::Vorbis);
    }

    #[test]
    fn test_select_is_case_insensitive() {
        assert_eq!(Format::from_path(Path::new("a.MP3")), Format::Mp3);
        assert_eq!(Format::from_path(Path::new("b.FlAc")), Format::Flac);
        assert_eq!(Format::from_path(Path::new("c.OGG")), Format::Vorbis);
    }

    #[test]
    fn test_select_rejects_other_extensions() {
        assert_eq!(Format::from_path(Path::new("d.wav")), Format::Unknown);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Unknown);
        // A leading dot alone is a hidden file, not an extension.
        assert_eq!(Format::from_path(Path::new(".mp3")), Format::Unknown);
    }

    #[test]
    fn test_open_rejects_unknown_extension() {
        let err = open(Path::new("track.xyz")).unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_reports_missing_file() {
        let err = open(Path::new("/nonexistent/track.flac")).unwrap_err();
        assert!(matches!(err, PlayerError::OpenFailed { .. }));
    }
}
