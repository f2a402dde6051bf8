//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Files to play, in argument order.
    pub files: Vec<PathBuf>,
    /// Whether help was requested.
    pub show_help: bool,
}

impl CliArgs {
    /// Parse arguments from the command line.
    pub fn parse() -> Self {
        Self::from_iter(env::args().skip(1))
    }

    fn from_iter(args: impl Iterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => parsed.show_help = true,
                _ if arg.starts_with('-') && arg.len() > 1 => {
                    eprintln!("Unknown flag: {arg}");
                    parsed.show_help = true;
                }
                _ => parsed.files.push(PathBuf::from(arg)),
            }
        }
        parsed
    }

    /// Print usage to stderr.
    pub fn print_usage() {
        eprintln!(
            "Usage:\n  spindle FILE [FILE...]\n\n\
             Plays MP3, FLAC, and Ogg Vorbis files in argument order.\n\n\
             Keys:\n\
             \x20 space    pause/resume\n\
             \x20 n        skip to the next file\n\
             \x20 q        quit\n"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::from_iter(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_files_kept_in_argument_order() {
        let parsed = parse(&["b.ogg", "a.mp3", "c.flac"]);
        assert_eq!(
            parsed.files,
            vec![
                PathBuf::from("b.ogg"),
                PathBuf::from("a.mp3"),
                PathBuf::from("c.flac"),
            ]
        );
        assert!(!parsed.show_help);
    }

    #[test]
    fn test_help_flags() {
        assert!(parse(&["-h"]).show_help);
        assert!(parse(&["--help"]).show_help);
    }

    #[test]
    fn test_unknown_flag_requests_help() {
        let parsed = parse(&["--shuffle", "a.mp3"]);
        assert!(parsed.show_help);
        assert_eq!(parsed.files, vec![PathBuf::from("a.mp3")]);
    }

    #[test]
    fn test_no_arguments_yields_no_files() {
        let parsed = parse(&[]);
        assert!(parsed.files.is_empty());
        assert!(!parsed.show_help);
    }
}
