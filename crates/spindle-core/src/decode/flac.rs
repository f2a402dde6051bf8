//! FLAC adapter over symphonia's native FLAC backend.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_FLAC};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::default::codecs::FlacDecoder;
use symphonia::default::formats::FlacReader;

use crate::error::{PlayerError, Result};
use crate::metadata::TrackMetadata;

use super::{AudioDecoder, DecodeProgress, Format, SampleStash};

/// FLAC decoder instance.
///
/// The reader parses the STREAMINFO and VORBIS_COMMENT metadata blocks up
/// front. Decoded blocks are converted to signed 16-bit interleaved
/// output and land in the stash, which hands them out in caller-sized
/// slices.
pub struct FlacAdapter {
    backend: Option<Backend>,
    stash: SampleStash,
    metadata: TrackMetadata,
    track_id: u32,
}

struct Backend {
    reader: FlacReader,
    decoder: FlacDecoder,
}

impl std::fmt::Debug for FlacAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlacAdapter").finish_non_exhaustive()
    }
}

impl FlacAdapter {
    /// Open `path` and fully initialize the FLAC decoding context.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PlayerError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut reader =
            FlacReader::try_new(mss, &FormatOptions::default()).map_err(|e| invalid(e.to_string()))?;

        let track = reader
            .default_track()
            .ok_or_else(|| invalid("no default track".into()))?;
        if track.codec_params.codec != CODEC_TYPE_FLAC {
            return Err(invalid("default track is not FLAC".into()));
        }
        let track_id = track.id;
        let params = track.codec_params.clone();

        let sample_rate = params
            .sample_rate
            .filter(|r| *r > 0)
            .ok_or_else(|| invalid("STREAMINFO missing sample rate".into()))?;
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .filter(|c| *c > 0)
            .ok_or_else(|| invalid("STREAMINFO missing channel count".into()))?;

        let decoder = FlacDecoder::try_new(&params, &DecoderOptions::default())
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

        Ok(FlacAdapter {
            backend: Some(Backend { reader, decoder }),
            stash: SampleStash::default(),
            metadata,
            track_id,
        })
    }
}

impl AudioDecoder for FlacAdapter {
    fn format(&self) -> Format {
        Format::Flac
    }

    fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    fn read_frames(&mut self, out: &mut [i16]) -> Result<DecodeProgress> {
        let mut written = 0;
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
                // A lossless stream with a bad block is not worth limping
                // through; report what we have and end the stream.
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
        format: Format::Flac,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_flac_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.flac");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let err = FlacAdapter::open(&path).unwrap_err();
        assert!(matches!(err, PlayerError::FormatInvalid { .. }));
    }

    #[test]
    fn test_close_is_idempotent_and_reads_report_eos() {
        let mut adapter = FlacAdapter {
            backend: None,
            stash: SampleStash::default(),
            metadata: TrackMetadata::default(),
            track_id: 0,
        };
        adapter.close();
        adapter.close();

        let mut out = [0i16; 8];
        let progress = adapter.read_frames(&mut out).unwrap();
        assert_eq!(progress.samples, 0);
        assert!(progress.end_of_stream);
    }
}
