//! In-place status line rendering.

use std::io::{self, Write};

use crossterm::terminal;

use spindle_core::engine::{PlaybackStatus, TransportState};

/// Fallback width when the terminal size is unknown.
const DEFAULT_WIDTH: u16 = 80;

/// Widest the progress bar gets on large terminals.
const MAX_BAR_WIDTH: usize = 40;

/// Format milliseconds as `MM:SS`.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Render the transport status line in place.
///
/// The line is erased and rewritten on every call:
/// `title  MM:SS / MM:SS [=====>-----] [PAUSED]`.
pub fn render(status: &PlaybackStatus, title: &str) {
    let width = terminal::size()
        .map(|(cols, _)| cols)
        .unwrap_or(DEFAULT_WIDTH) as usize;
    print!("\x1B[2K\r{}", compose(status, title, width));
    io::stdout().flush().ok();
}

/// Build the status line for a terminal of `width` columns.
fn compose(status: &PlaybackStatus, title: &str, width: usize) -> String {
    let elapsed = format_time(status.position_ms);
    let total = format_time(status.duration_ms.unwrap_or(0));
    let suffix = match status.state {
        TransportState::Playing => "",
        TransportState::Paused => " [PAUSED]",
        TransportState::Stopped => " [STOPPED]",
    };

    let fixed = format!("{title}  {elapsed} / {total} ");
    let bar_width = width
        .saturating_sub(fixed.chars().count() + suffix.len() + 2)
        .min(MAX_BAR_WIDTH);

    let line = if bar_width >= 4 {
        let ratio = match status.duration_ms {
            Some(total_ms) if total_ms > 0 => status.position_ms as f64 / total_ms as f64,
            _ => 0.0,
        };
        format!("{fixed}[{}]{suffix}", progress_bar(ratio, bar_width))
    } else {
        format!("{fixed}{suffix}")
    };

    // Anything wider than the terminal would wrap and break the in-place
    // rewrite.
    line.chars().take(width).collect()
}

/// `=` filled, `>` at the boundary, `-` empty.
fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        if i < filled {
            bar.push('=');
        } else if i == filled {
            bar.push('>');
        } else {
            bar.push('-');
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: TransportState, position_ms: u64, duration_ms: Option<u64>) -> PlaybackStatus {
        PlaybackStatus {
            state,
            position_ms,
            duration_ms,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(5000), "00:05");
        assert_eq!(format_time(61_000), "01:01");
        assert_eq!(format_time(3_599_999), "59:59");
    }

    #[test]
    fn test_progress_bar_shape() {
        assert_eq!(progress_bar(0.0, 10), ">---------");
        assert_eq!(progress_bar(0.5, 10), "=====>----");
        assert_eq!(progress_bar(1.0, 10), "==========");
    }

    #[test]
    fn test_compose_paused_suffix() {
        let line = compose(
            &status(TransportState::Paused, 1000, Some(4000)),
            "Artist - Title",
            80,
        );
        assert!(line.contains("00:01 / 00:04"));
        assert!(line.ends_with("[PAUSED]"));
        assert!(line.contains('='));
    }

    #[test]
    fn test_compose_playing_has_no_suffix() {
        let line = compose(
            &status(TransportState::Playing, 0, Some(4000)),
            "Artist - Title",
            80,
        );
        assert!(!line.contains("[PAUSED]"));
        assert!(!line.contains("[STOPPED]"));
    }

    #[test]
    fn test_compose_never_exceeds_terminal_width() {
        let long_title = "x".repeat(200);
        let line = compose(
            &status(TransportState::Playing, 0, Some(1000)),
            &long_title,
            40,
        );
        assert!(line.chars().count() <= 40);
    }

    #[test]
    fn test_compose_without_duration_shows_zero_total() {
        let line = compose(&status(TransportState::Playing, 2000, None), "t", 80);
        assert!(line.contains("00:02 / 00:00"));
    }
}
