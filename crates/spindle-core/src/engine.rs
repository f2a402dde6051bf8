//! Playback engine and transport state machine.
//!
//! A single cooperative loop drives input polling, decoding, device
//! writes, and status rendering in strict sequence. The suspension points
//! are the zero-wait input poll, the sink write, and the pause sleep;
//! there is no background decode thread. A skip or quit is observed at
//! the top of the next iteration, so shutdown latency is bounded by one
//! batch of decode plus device write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::decode::AudioDecoder;
use crate::error::{PlayerError, Result};
use crate::sink::AudioSink;

/// Frames pulled from the decoder per iteration (~46 ms at 44.1 kHz).
pub const BATCH_FRAMES: usize = 2048;

/// Sleep between input polls while paused.
const PAUSE_TICK: Duration = Duration::from_millis(50);

/// Transport state of the player, independent of decode progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Initial state for each track and terminal state afterwards.
    #[default]
    Stopped,
    /// Actively decoding and writing to the sink.
    Playing,
    /// Suspended; device stopped, position held.
    Paused,
}

/// How playback of one track ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Reached end-of-stream.
    Finished,
    /// User skipped to the next file.
    Skipped,
    /// User quit the whole run.
    Quit,
}

/// Transport command delivered by the control source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toggle Playing ⇄ Paused.
    TogglePause,
    /// Stop this track and advance to the next file.
    Skip,
    /// Stop this track and end the run.
    Quit,
}

/// Non-blocking source of transport commands.
///
/// `poll` is called once per loop iteration and must return immediately;
/// it must never delay audio delivery.
pub trait ControlSource {
    /// Next pending command, if any.
    fn poll(&mut self) -> Option<Command>;
}

/// Cloneable quit handle shared between the run loop, the engine, and the
/// control source.
///
/// Set once when the user quits or the process is interrupted; read at
/// the top of every engine iteration and between files. Nothing else is
/// shared across that boundary.
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl QuitFlag {
    /// New, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of the whole run.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether termination was requested.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot of transport state handed to the status renderer.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackStatus {
    /// Current transport state.
    pub state: TransportState,
    /// Playback position in milliseconds.
    pub position_ms: u64,
    /// Track duration in milliseconds, when known.
    pub duration_ms: Option<u64>,
}

/// Drives one track from decoder to sink.
pub struct PlaybackEngine<'a> {
    decoder: Box<dyn AudioDecoder>,
    sink: &'a mut dyn AudioSink,
    quit: QuitFlag,
    state: TransportState,
    position_frames: u64,
}

impl<'a> PlaybackEngine<'a> {
    /// Create an engine for one decoder/sink pair.
    ///
    /// The sink must be configured for exactly the decoder's sample rate
    /// and channel count; they do not change mid-track.
    pub fn new(
        decoder: Box<dyn AudioDecoder>,
        sink: &'a mut dyn AudioSink,
        quit: QuitFlag,
    ) -> Self {
        PlaybackEngine {
            decoder,
            sink,
            quit,
            state: TransportState::Stopped,
            position_frames: 0,
        }
    }

    /// Play the track until end-of-stream, skip, or quit.
    ///
    /// The decoder is closed on every exit path, including errors.
    pub fn run(
        &mut self,
        controls: &mut dyn ControlSource,
        render: &mut dyn FnMut(&PlaybackStatus),
    ) -> Result<TrackOutcome> {
        let outcome = self.pump(controls, render);
        self.decoder.close();
        outcome
    }

    fn pump(
        &mut self,
        controls: &mut dyn ControlSource,
        render: &mut dyn FnMut(&PlaybackStatus),
    ) -> Result<TrackOutcome> {
        let channels = self.decoder.metadata().channels.max(1) as usize;
        let total_frames = self.decoder.metadata().total_frames;
        let mut batch = vec![0i16; BATCH_FRAMES * channels];
        let mut outcome = TrackOutcome::Finished;

        self.sink.start()?;
        self.state = TransportState::Playing;

        while self.state != TransportState::Stopped {
            if self.quit.is_set() {
                self.state = TransportState::Stopped;
                outcome = TrackOutcome::Quit;
                render(&self.status());
                break;
            }

            match controls.poll() {
                Some(Command::TogglePause) => self.toggle_pause()?,
                Some(Command::Skip) => {
                    self.state = TransportState::Stopped;
                    outcome = TrackOutcome::Skipped;
                }
                Some(Command::Quit) => {
                    self.quit.request();
                    self.state = TransportState::Stopped;
                    outcome = TrackOutcome::Quit;
                }
                None => {}
            }

            match self.state {
                TransportState::Playing => {
                    let progress = self.decoder.read_frames(&mut batch)?;
                    deliver(self.sink, &batch[..progress.samples])?;
                    self.position_frames += (progress.samples / channels) as u64;
                    if let Some(total) = total_frames {
                        // An overrun here is a decoder or metadata bug;
                        // clamp rather than crash.
                        self.position_frames = self.position_frames.min(total);
                    }
                    if progress.end_of_stream {
                        self.state = TransportState::Stopped;
                    }
                }
                TransportState::Paused => std::thread::sleep(PAUSE_TICK),
                TransportState::Stopped => {}
            }

            render(&self.status());
        }

        Ok(outcome)
    }

    fn toggle_pause(&mut self) -> Result<()> {
        match self.state {
            TransportState::Playing => {
                self.sink.stop()?;
                self.state = TransportState::Paused;
            }
            TransportState::Paused => {
                self.sink.start()?;
                self.state = TransportState::Playing;
            }
            TransportState::Stopped => {}
        }
        Ok(())
    }

    fn status(&self) -> PlaybackStatus {
        let meta = self.decoder.metadata();
        let rate = meta.sample_rate.max(1) as u64;
        PlaybackStatus {
            state: self.state,
            position_ms: self.position_frames * 1000 / rate,
            duration_ms: meta.duration_ms(),
        }
    }
}

/// Write a decoded batch to the sink in full, retrying partial writes.
fn deliver(sink: &mut dyn AudioSink, mut samples: &[i16]) -> Result<()> {
    while !samples.is_empty() {
        let written = sink.write(samples)?;
        if written == 0 {
            return Err(PlayerError::WriteFailed("device accepted no samples".into()));
        }
        samples = &samples[written..];
    }
    Ok(())
}
