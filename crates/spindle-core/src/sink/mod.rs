//! Audio output sink.
//!
//! The playback engine writes decoded PCM through the [`AudioSink`]
//! contract; [`CpalSink`] is the real device implementation.

mod device;
mod ring_buffer;

pub use device::CpalSink;

use crate::error::Result;

/// Contract the playback engine writes PCM through.
pub trait AudioSink {
    /// Write interleaved signed 16-bit samples.
    ///
    /// Blocks on device backpressure and returns the number of samples
    /// accepted, possibly fewer than offered; the caller retries the
    /// remainder. Zero means the device stopped draining.
    fn write(&mut self, samples: &[i16]) -> Result<usize>;

    /// Resume device output.
    fn start(&mut self) -> Result<()>;

    /// Suspend device output without closing the device.
    fn stop(&mut self) -> Result<()>;

    /// Release the device. Idempotent.
    fn close(&mut self);
}
