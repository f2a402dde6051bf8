//! Decoder dispatch and playback engine for the spindle audio player.
//!
//! spindle decodes MP3, FLAC, and Ogg Vorbis files to signed 16-bit PCM
//! and streams them to the default output device. Heterogeneous codec
//! backends sit behind the pull-based [`decode::AudioDecoder`] contract,
//! selected by file extension through [`decode::open`];
//! [`engine::PlaybackEngine`] owns the decode → sink pump and the
//! `Stopped → Playing ⇄ Paused` transport state machine.
//!
//! # Example
//!
//! ```no_run
//! use spindle_core::decode;
//! use spindle_core::engine::{PlaybackEngine, QuitFlag};
//! use spindle_core::sink::CpalSink;
//!
//! # struct NoControls;
//! # impl spindle_core::engine::ControlSource for NoControls {
//! #     fn poll(&mut self) -> Option<spindle_core::engine::Command> { None }
//! # }
//! # fn main() -> spindle_core::Result<()> {
//! let decoder = decode::open(std::path::Path::new("song.ogg"))?;
//! let meta = decoder.metadata().clone();
//! let mut sink = CpalSink::open(meta.sample_rate, meta.channels)?;
//! let mut engine = PlaybackEngine::new(decoder, &mut sink, QuitFlag::new());
//! let outcome = engine.run(&mut NoControls, &mut |_status| {})?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod decode;
mod error;
pub mod engine;
pub mod metadata;
pub mod sink;

pub use error::{PlayerError, Result};
