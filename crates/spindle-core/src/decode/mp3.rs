//! MP3 adapter over symphonia's MPEG audio backend.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_MP3};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::codecs::MpaDecoder;

use crate::error::{PlayerError, Result};
use crate::metadata::TrackMetadata;

use super::{AudioDecoder, DecodeProgress, Format, SampleStash};

/// MP3 decoder instance.
///
/// Opened through the probe so leading ID3v2 tags are parsed before the
/// first MPEG frame; the codec itself is the concrete [`MpaDecoder`].
/// Every decoded packet is forced to signed 16-bit interleaved output
/// through a [`SampleBuffer<i16>`] regardless of what the codec produced.
pub struct Mp3Adapter {
    backend: Option<Backend>,
    stash: SampleStash,
    metadata: TrackMetadata,
    track_id: u32,
}

struct Backend {
    reader: Box<dyn FormatReader>,
    decoder: MpaDecoder,
}

impl std::fmt::Debug for Mp3Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mp3Adapter").finish_non_exhaustive()
    }
}

impl Mp3Adapter {
    /// Open `path` and fully initialize the MPEG decoding context.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PlayerError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let byte_len = file.metadata().ok().map(|m| m.len());
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let mut probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| invalid(e.to_string()))?;

        let mut reader = probed.format;
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_MP3)
            .ok_or_else(|| invalid("no MPEG audio track".into()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let sample_rate = params
            .sample_rate
            .filter(|r| *r > 0)
            .ok_or_else(|| invalid("missing sample rate".into()))?;
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .filter(|c| *c > 0)
            .ok_or_else(|| invalid("missing channel count".into()))?;

        let decoder = MpaDecoder::try_new(&params, &DecoderOptions::default())
            .map_err(|e| invalid(e.to_string()))?;

        let mut metadata = TrackMetadata {
            sample_rate,
            channels,
            total_frames: params.n_frames,
            ..Default::default()
        };
        // ID3v2 sits ahead of the stream and lands in the probe's metadata
        // queue; merge it first so its fields win over any trailing tags
        // the reader surfaces later.
        if let Some(probe_meta) = probed.metadata.get() {
            if let Some(revision) = probe_meta.current() {
                metadata.merge_revision(revision);
            }
        }
        if let Some(revision) = reader.metadata().current() {
            metadata.merge_revision(revision);
        }
        if let (Some(bytes), Some(ms)) = (byte_len, metadata.duration_ms()) {
            if ms > 0 {
                metadata.bitrate = Some((bytes * 8 * 1000 / ms) as u32);
            }
        }

        Ok(Mp3Adapter {
            backend: Some(Backend { reader, decoder }),
            stash: SampleStash::default(),
            metadata,
            track_id,
        })
    }
}

impl AudioDecoder for Mp3Adapter {
    fn format(&self) -> Format {
        Format::Mp3
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
                // Damaged frame: resync on the next packet.
                Err(SymphoniaError::DecodeError(_)) => continue,
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
        format: Format::Mp3,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_mpeg_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, [0u8; 256]).unwrap();

        let err = Mp3Adapter::open(&path).unwrap_err();
        assert!(matches!(err, PlayerError::FormatInvalid { .. }));
    }

    #[test]
    fn test_open_reports_missing_file() {
        let err = Mp3Adapter::open(Path::new("/nonexistent/x.mp3")).unwrap_err();
        assert!(matches!(err, PlayerError::OpenFailed { .. }));
    }
}
