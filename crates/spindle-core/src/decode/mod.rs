//! Decoder adapters behind one pull-based contract.
//!
//! Each supported format gets its own adapter over its symphonia backend;
//! the playback engine only ever sees [`AudioDecoder`]. Adapters are
//! constructed through [`open`], which selects by file extension.

mod dispatch;
mod flac;
mod mp3;
mod vorbis;

pub use dispatch::{open, Format};
pub use flac::FlacAdapter;
pub use mp3::Mp3Adapter;
pub use vorbis::VorbisAdapter;

use crate::error::Result;
use crate::metadata::TrackMetadata;

/// Progress of one [`AudioDecoder::read_frames`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeProgress {
    /// Interleaved samples written to the caller's buffer.
    pub samples: usize,
    /// True once the stream is exhausted.
    pub end_of_stream: bool,
}

impl DecodeProgress {
    pub(crate) fn end(samples: usize) -> Self {
        DecodeProgress {
            samples,
            end_of_stream: true,
        }
    }
}

/// Uniform pull-based decode contract.
///
/// Exactly one instance is alive per file being played. The instance owns
/// its native backend exclusively and releases it on [`close`], which is
/// idempotent and safe to call after a partial initialization.
///
/// [`close`]: AudioDecoder::close
pub trait AudioDecoder: std::fmt::Debug {
    /// Format this adapter decodes.
    fn format(&self) -> Format;

    /// Metadata extracted while opening the stream.
    fn metadata(&self) -> &TrackMetadata;

    /// Fill `out` with interleaved signed 16-bit samples.
    ///
    /// Returns fewer samples than requested only at end-of-stream. Zero
    /// samples with `end_of_stream` set means the stream is exhausted.
    /// Reading after [`close`](AudioDecoder::close) reports end-of-stream.
    fn read_frames(&mut self, out: &mut [i16]) -> Result<DecodeProgress>;

    /// Release the native backend. Idempotent.
    fn close(&mut self);
}

/// Interleaved samples decoded past what the caller has consumed.
///
/// Packet decoders produce whole blocks; the stash carries the tail of a
/// block into the next `read_frames` call so the contract can hand out
/// exactly as many samples as requested.
#[derive(Debug, Default)]
pub(crate) struct SampleStash {
    buf: Vec<i16>,
    pos: usize,
}

impl SampleStash {
    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Replace the stash contents with a freshly decoded block.
    pub(crate) fn refill(&mut self, samples: &[i16]) {
        debug_assert!(self.is_empty());
        self.buf.clear();
        self.buf.extend_from_slice(samples);
        self.pos = 0;
    }

    /// Move as many stashed samples as fit into `out`.
    pub(crate) fn drain_into(&mut self, out: &mut [i16]) -> usize {
        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    pub(crate) fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stash_drains_across_calls() {
        let mut stash = SampleStash::default();
        stash.refill(&[1, 2, 3, 4, 5]);

        let mut out = [0i16; 3];
        assert_eq!(stash.drain_into(&mut out), 3);
        assert_eq!(out, [1, 2, 3]);
        assert!(!stash.is_empty());

        let mut out = [0i16; 3];
        assert_eq!(stash.drain_into(&mut out), 2);
        assert_eq!(&out[..2], &[4, 5]);
        assert!(stash.is_empty());
    }

    #[test]
    fn test_stash_clear_discards_pending_samples() {
        let mut stash = SampleStash::default();
        stash.refill(&[7; 16]);
        stash.clear();
        assert!(stash.is_empty());

        let mut out = [0i16; 4];
        assert_eq!(stash.drain_into(&mut out), 0);
    }
}
