//! cpal-backed output device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};

use crate::error::{PlayerError, Result};

use super::ring_buffer::SampleRing;
use super::AudioSink;

/// Ring capacity: a quarter second of audio at the stream's rate.
const RING_FRACTION_OF_SECOND: u32 = 4;

/// Backoff while the ring is full.
const WRITE_BACKOFF: Duration = Duration::from_micros(100);

/// Full-ring retries before the device is reported stalled (~200 ms).
const MAX_WRITE_RETRIES: u32 = 2000;

/// Output sink over the default cpal device.
///
/// The stream is configured for exactly the requested rate and channel
/// count at signed 16-bit; a device that cannot honor that is rejected
/// rather than silently renegotiated. The output callback drains the ring
/// and zero-fills underruns, so a slow producer is audible as silence,
/// never as corruption.
pub struct CpalSink {
    stream: Option<Stream>,
    ring: Arc<SampleRing>,
    healthy: Arc<AtomicBool>,
}

impl CpalSink {
    /// Open the default output device at `sample_rate`/`channels`.
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(PlayerError::UnsupportedParameters {
                rate: sample_rate,
                channels,
            });
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlayerError::DeviceUnavailable("no default output device".into()))?;

        // Verify exact support for the requested parameters before
        // building the stream; a downgraded negotiation would play
        // corrupted audio.
        let supported = device
            .supported_output_configs()
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?
            .any(|range| {
                range.channels() == channels
                    && range.sample_format() == cpal::SampleFormat::I16
                    && range.min_sample_rate() <= sample_rate
                    && sample_rate <= range.max_sample_rate()
            });
        if !supported {
            return Err(PlayerError::UnsupportedParameters {
                rate: sample_rate,
                channels,
            });
        }

        let config = StreamConfig {
            channels,
            sample_rate,
            buffer_size: BufferSize::Default,
        };

        let ring = Arc::new(SampleRing::new(
            (sample_rate / RING_FRACTION_OF_SECOND) as usize * channels as usize,
        ));
        let healthy = Arc::new(AtomicBool::new(true));

        let cb_ring = Arc::clone(&ring);
        let err_healthy = Arc::clone(&healthy);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let filled = cb_ring.read(data);
                    data[filled..].fill(0);
                },
                move |_err| {
                    err_healthy.store(false, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::StreamConfigNotSupported => {
                    PlayerError::UnsupportedParameters {
                        rate: sample_rate,
                        channels,
                    }
                }
                other => PlayerError::DeviceUnavailable(other.to_string()),
            })?;

        Ok(CpalSink {
            stream: Some(stream),
            ring,
            healthy,
        })
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, samples: &[i16]) -> Result<usize> {
        if self.stream.is_none() {
            return Err(PlayerError::WriteFailed("sink is closed".into()));
        }
        let mut retries = 0;
        loop {
            if !self.healthy.load(Ordering::SeqCst) {
                return Err(PlayerError::WriteFailed(
                    "output stream reported an error".into(),
                ));
            }
            let written = self.ring.write(samples);
            if written > 0 {
                return Ok(written);
            }
            if retries >= MAX_WRITE_RETRIES {
                // Ring stayed full: the device stopped draining.
                return Ok(0);
            }
            retries += 1;
            std::thread::sleep(WRITE_BACKOFF);
        }
    }

    fn start(&mut self) -> Result<()> {
        match &self.stream {
            Some(stream) => stream
                .play()
                .map_err(|e| PlayerError::DeviceUnavailable(e.to_string())),
            None => Ok(()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        match &self.stream {
            Some(stream) => stream
                .pause()
                .map_err(|e| PlayerError::DeviceUnavailable(e.to_string())),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.close();
    }
}
