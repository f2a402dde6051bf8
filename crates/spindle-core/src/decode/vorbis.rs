//! Ogg Vorbis adapter over symphonia's Ogg demuxer and Vorbis codec.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_VORBIS};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::default::codecs::VorbisDecoder;
use symphonia::default::formats::OggReader;

use crate::error::{PlayerError, Result};
use crate::metadata::TrackMetadata;

use super::{AudioDecoder, DecodeProgress, Format, SampleStash};

/// Ogg Vorbis decoder instance.
///
/// An Ogg container may multiplex several logical streams; this adapter
/// binds to the first Vorbis one and ignores packets from any other.
/// Comment headers arrive as a key=value list and are matched by key
/// case-insensitively. `read_frames` keeps pulling packets until the
/// caller's buffer is satisfied or the stream signals end-of-data.
pub struct VorbisAdapter {
    backend: Option<Backend>,
    stash: SampleStash,
    metadata: TrackMetadata,
    track_id: u32,
}

struct Backend {
    reader: OggReader,
    decoder: VorbisDecoder,
}

impl std::fmt::Debug for VorbisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VorbisAdapter").finish_non_exhaustive()
    }
}

impl VorbisAdapter {
    /// Open `path` and fully initialize the Vorbis decoding context.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PlayerError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut reader =
            OggReader::try_new(mss, &FormatOptions::default()).map_err(|e| invalid(e.to_string()))?;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_VORBIS)
            .ok_or_else(|| invalid("no Vorbis stream in Ogg container".into()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let sample_rate = params
            .sample_rate
            .filter(|r| *r > 0)
            .ok_or_else(|| invalid("identification header missing sample rate".into()))?;
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .filter(|c| *c > 0)
            .ok_or_else(|| invalid("identification header missing channel count".into()))?;

        let decoder = VorbisDecoder::try_new(&params, &DecoderOptions::default())
            .map_err(|e| invalid(e.to_string()))?;

        let mut metadata = TrackMetadata {
            sample_rate,
            channels,
            total_frames: params.n_frames,
            ..Default::default()
        };
        if let Some(revision) = reader.metadata().current() {
            metadata.merge_revision(revision);
        }

        Ok(VorbisAdapter {
            backend: Some(Backend { reader, decoder }),
            stash: SampleStash::default(),
            metadata,
            track_id,
        })
    }
}

impl AudioDecoder for VorbisAdapter {
    fn format(&self) -> Format {
        Format::Vorbis
    }

    fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    fn read_frames(&mut self, out: &mut [i16]) -> Result<DecodeProgress> {
        let mut written = 0;
        // Loop until the requested count is satisfied; a short read only
        // happens once the stream is exhausted.
        while written < out.len() {
            if !self.stash.is_empty() {
                written += self.stash.drain_into(&mut out[written..]);
                continue;
            }
            let Some(backend) = self.backend.as_mut() else {
                return Ok(DecodeProgress::end(written));
            };
            let packet = match backend.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(DecodeProgress::end(written));
                }
                Err(SymphoniaError::ResetRequired) => {
                    backend.decoder.reset();
                    continue;
                }
                Err(_) => return Ok(DecodeProgress::end(written)),
            };
            if packet.track_id() != self.track_id {
                continue;
            }
            match backend.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    self.stash.refill(buf.samples());
                }
                Err(_) => return Ok(DecodeProgress::end(written)),
            }
        }
        Ok(DecodeProgress {
            samples: written,
            end_of_stream: false,
        })
    }

    fn close(&mut self) {
        self.backend = None;
        self.stash.clear();
    }
}

fn invalid(reason: String) -> PlayerError {
    PlayerError::FormatInvalid {
        format: Format::Vorbis,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_ogg_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.ogg");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let err = VorbisAdapter::open(&path).unwrap_err();
        assert!(matches!(err, PlayerError::FormatInvalid { .. }));
    }

    #[test]
    fn test_open_reports_missing_file() {
        let err = VorbisAdapter::open(Path::new("/nonexistent/x.ogg")).unwrap_err();
        assert!(matches!(err, PlayerError::OpenFailed { .. }));
    }
}
