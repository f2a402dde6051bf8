//! Interleaved sample ring shared with the audio callback.
//!
//! One producer (the playback engine) and one consumer (the device output
//! callback). Positions are monotonically increasing counters with
//! acquire/release ordering; the sample storage itself is guarded by a
//! mutex so a wrap-around copy is never observed half-done.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity ring of interleaved signed 16-bit samples.
pub(crate) struct SampleRing {
    buf: Mutex<Vec<i16>>,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    capacity: usize,
    /// `pos & mask == pos % capacity`; capacity is a power of two.
    mask: usize,
}

impl SampleRing {
    /// Create a ring holding at least `requested` samples, rounded up to
    /// the next power of two.
    pub(crate) fn new(requested: usize) -> Self {
        let capacity = requested.max(2).next_power_of_two();
        SampleRing {
            buf: Mutex::new(vec![0; capacity]),
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            capacity,
            mask: capacity - 1,
        }
    }

    /// Samples currently buffered (used in tests).
    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write - read
    }

    /// Write samples, returning how many fit. Zero means the ring is full.
    pub(crate) fn write(&self, samples: &[i16]) -> usize {
        let mut buf = self.buf.lock();
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        let free = self.capacity - (write - read);
        let n = samples.len().min(free);
        if n == 0 {
            return 0;
        }

        let idx = write & self.mask;
        if idx + n <= self.capacity {
            buf[idx..idx + n].copy_from_slice(&samples[..n]);
        } else {
            let head = self.capacity - idx;
            buf[idx..].copy_from_slice(&samples[..head]);
            buf[..n - head].copy_from_slice(&samples[head..n]);
        }
        drop(buf);

        self.write_pos.store(write + n, Ordering::Release);
        n
    }

    /// Read samples into `out`, returning how many were available.
    pub(crate) fn read(&self, out: &mut [i16]) -> usize {
        let buf = self.buf.lock();
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        let n = out.len().min(write - read);
        if n == 0 {
            return 0;
        }

        let idx = read & self.mask;
        if idx + n <= self.capacity {
            out[..n].copy_from_slice(&buf[idx..idx + n]);
        } else {
            let head = self.capacity - idx;
            out[..head].copy_from_slice(&buf[idx..]);
            out[head..n].copy_from_slice(&buf[..n - head]);
        }
        drop(buf);

        self.read_pos.store(read + n, Ordering::Release);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_up_to_power_of_two() {
        let ring = SampleRing::new(1000);
        assert_eq!(ring.capacity, 1024);
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let ring = SampleRing::new(16);
        let samples = [1i16, 2, 3, 4];
        assert_eq!(ring.write(&samples), 4);
        assert_eq!(ring.available(), 4);

        let mut out = [0i16; 4];
        assert_eq!(ring.read(&mut out), 4);
        assert_eq!(out, samples);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_write_stops_at_capacity() {
        let ring = SampleRing::new(8);
        assert_eq!(ring.write(&[9i16; 12]), 8);
        assert_eq!(ring.write(&[9i16; 4]), 0);
    }

    #[test]
    fn test_wrap_around_preserves_order() {
        let ring = SampleRing::new(8);
        assert_eq!(ring.write(&[1i16; 6]), 6);

        let mut out = [0i16; 5];
        assert_eq!(ring.read(&mut out), 5);

        // This write crosses the end of the backing buffer.
        assert_eq!(ring.write(&[2i16, 3, 4, 5, 6]), 5);

        let mut out = [0i16; 6];
        assert_eq!(ring.read(&mut out), 6);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_short_read_when_underfilled() {
        let ring = SampleRing::new(8);
        ring.write(&[7i16; 3]);

        let mut out = [0i16; 8];
        assert_eq!(ring.read(&mut out), 3);
        assert_eq!(&out[..3], &[7, 7, 7]);
    }
}
