//! Track metadata extraction.
//!
//! Each decoder adapter fills a [`TrackMetadata`] record while opening its
//! native backend. Tag extraction is best-effort: missing fields stay
//! `None` and never fail an open.

use std::path::Path;

use symphonia::core::meta::{MetadataRevision, StandardTagKey, Tag};

/// Metadata for a single track, owned by the decoder that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Artist name, if tagged.
    pub artist: Option<String>,
    /// Track title, if tagged.
    pub title: Option<String>,
    /// Album name, if tagged.
    pub album: Option<String>,
    /// Stream sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Total sample frames, when the container declares them.
    pub total_frames: Option<u64>,
    /// Average bitrate in bits per second (informational only).
    pub bitrate: Option<u32>,
}

impl TrackMetadata {
    /// Track duration in milliseconds, derived from the declared frame
    /// count over the sample rate.
    pub fn duration_ms(&self) -> Option<u64> {
        if self.sample_rate == 0 {
            return None;
        }
        self.total_frames
            .map(|frames| frames * 1000 / self.sample_rate as u64)
    }

    /// "Artist - Title" display line, falling back to whichever half is
    /// tagged and finally to the file path.
    pub fn display_title(&self, path: &Path) -> String {
        match (self.artist.as_deref(), self.title.as_deref()) {
            (Some(artist), Some(title)) => format!("{artist} - {title}"),
            (None, Some(title)) => title.to_string(),
            (Some(artist), None) => artist.to_string(),
            (None, None) => path.display().to_string(),
        }
    }

    /// Merge a metadata revision into this record.
    ///
    /// Fields already present are kept, so earlier merges win: the probe's
    /// metadata (ID3v2 for MP3) is merged before anything the reader
    /// reports later, which gives version-2 tags priority.
    pub(crate) fn merge_revision(&mut self, revision: &MetadataRevision) {
        self.merge_tags(revision.tags());
    }

    /// Merge a raw tag list, first-wins per field.
    pub(crate) fn merge_tags(&mut self, tags: &[Tag]) {
        for tag in tags {
            let value = tag.value.to_string();
            if value.is_empty() {
                continue;
            }
            match tag_field(tag) {
                Some(TagField::Artist) => fill(&mut self.artist, value),
                Some(TagField::Title) => fill(&mut self.title, value),
                Some(TagField::Album) => fill(&mut self.album, value),
                None => {}
            }
        }
    }
}

enum TagField {
    Artist,
    Title,
    Album,
}

/// Map a tag to one of the fields we keep. The standard key is checked
/// first; raw keys are compared case-insensitively so Vorbis comment
/// lists match regardless of how the tagger spelled them.
fn tag_field(tag: &Tag) -> Option<TagField> {
    match tag.std_key {
        Some(StandardTagKey::Artist) => return Some(TagField::Artist),
        Some(StandardTagKey::TrackTitle) => return Some(TagField::Title),
        Some(StandardTagKey::Album) => return Some(TagField::Album),
        _ => {}
    }
    match tag.key.to_ascii_uppercase().as_str() {
        "ARTIST" => Some(TagField::Artist),
        "TITLE" => Some(TagField::Title),
        "ALBUM" => Some(TagField::Album),
        _ => None,
    }
}

fn fill(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::meta::Value;

    fn tag(key: &str, value: &str) -> Tag {
        Tag::new(None, key, Value::String(value.to_string()))
    }

    #[test]
    fn test_duration_derived_from_frames() {
        let meta = TrackMetadata {
            sample_rate: 44100,
            channels: 2,
            total_frames: Some(220_500),
            ..Default::default()
        };
        assert_eq!(meta.duration_ms(), Some(5000));
    }

    #[test]
    fn test_duration_unknown_without_frames() {
        let meta = TrackMetadata {
            sample_rate: 44100,
            channels: 2,
            ..Default::default()
        };
        assert_eq!(meta.duration_ms(), None);
    }

    #[test]
    fn test_display_title_prefers_artist_and_title() {
        let meta = TrackMetadata {
            artist: Some("Orbital".into()),
            title: Some("Halcyon".into()),
            ..Default::default()
        };
        assert_eq!(meta.display_title(Path::new("x.ogg")), "Orbital - Halcyon");
    }

    #[test]
    fn test_display_title_falls_back_to_path() {
        let meta = TrackMetadata::default();
        assert_eq!(
            meta.display_title(Path::new("music/track01.flac")),
            "music/track01.flac"
        );
    }

    #[test]
    fn test_merge_matches_raw_keys_case_insensitively() {
        let mut meta = TrackMetadata::default();
        meta.merge_tags(&[
            tag("artist", "Aphex Twin"),
            tag("Title", "Xtal"),
            tag("ALBUM", "Selected Ambient Works"),
        ]);
        assert_eq!(meta.artist.as_deref(), Some("Aphex Twin"));
        assert_eq!(meta.title.as_deref(), Some("Xtal"));
        assert_eq!(meta.album.as_deref(), Some("Selected Ambient Works"));
    }

    #[test]
    fn test_merge_keeps_earlier_values() {
        let mut meta = TrackMetadata::default();
        meta.merge_tags(&[tag("TITLE", "From v2")]);
        meta.merge_tags(&[tag("TITLE", "From v1"), tag("ARTIST", "Only In v1")]);
        assert_eq!(meta.title.as_deref(), Some("From v2"));
        assert_eq!(meta.artist.as_deref(), Some("Only In v1"));
    }

    #[test]
    fn test_merge_skips_empty_values() {
        let mut meta = TrackMetadata::default();
        meta.merge_tags(&[tag("TITLE", "")]);
        assert_eq!(meta.title, None);
    }
}
