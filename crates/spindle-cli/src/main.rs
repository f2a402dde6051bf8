//! spindle — terminal audio player.
//!
//! Plays each file given on the command line in order, decoding MP3,
//! FLAC, and Ogg Vorbis to signed 16-bit PCM and streaming it to the
//! default output device, with single-key transport control and an
//! in-place status line.

mod args;
mod status;
mod terminal;

use std::path::Path;
use std::process::ExitCode;

use spindle_core::decode;
use spindle_core::engine::{PlaybackEngine, QuitFlag, TrackOutcome};
use spindle_core::sink::CpalSink;
use spindle_core::Result;

use args::CliArgs;
use terminal::{KeyControls, RawTerminal};

fn main() -> ExitCode {
    let parsed = CliArgs::parse();
    if parsed.show_help {
        CliArgs::print_usage();
        return ExitCode::SUCCESS;
    }
    if parsed.files.is_empty() {
        CliArgs::print_usage();
        return ExitCode::FAILURE;
    }

    let raw = match RawTerminal::enter() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to configure terminal: {err}");
            return ExitCode::FAILURE;
        }
    };

    let quit = QuitFlag::new();
    let mut failed = 0usize;

    for path in &parsed.files {
        if quit.is_set() {
            break;
        }
        match play_file(path, &quit) {
            Ok(TrackOutcome::Quit) => break,
            Ok(_) => {}
            Err(err) => {
                eprint!("\r\n{}: {err}\r\n", path.display());
                failed += 1;
                if err.is_fatal_for_run() {
                    break;
                }
            }
        }
    }

    drop(raw);
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Play one file to completion, skip, or quit.
///
/// The sink is opened at exactly the rate and channel count the decoder
/// reported; both are released before returning on every path.
fn play_file(path: &Path, quit: &QuitFlag) -> Result<TrackOutcome> {
    let decoder = decode::open(path)?;
    let meta = decoder.metadata().clone();
    let title = meta.display_title(path);
    print!("{title}\r\n");

    let mut sink = CpalSink::open(meta.sample_rate, meta.channels)?;
    let mut controls = KeyControls::new(quit.clone());
    let mut engine = PlaybackEngine::new(decoder, &mut sink, quit.clone());
    let outcome = engine.run(&mut controls, &mut |s| status::render(s, &title));
    print!("\r\n");
    outcome
}
