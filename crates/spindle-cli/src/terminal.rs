//! Terminal raw mode and keyboard transport controls.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use spindle_core::engine::{Command, ControlSource, QuitFlag};

/// RAII guard for terminal raw mode.
///
/// Raw mode is restored on drop and from a panic hook, so the terminal is
/// never left unusable by an early exit.
pub struct RawTerminal;

impl RawTerminal {
    /// Enter raw mode and install the restoring panic hook.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            original_hook(panic_info);
        }));
        Ok(RawTerminal)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Keyboard control source: zero-wait poll for one pending keystroke.
pub struct KeyControls {
    quit: QuitFlag,
}

impl KeyControls {
    /// New control source sharing the run's quit flag.
    pub fn new(quit: QuitFlag) -> Self {
        KeyControls { quit }
    }
}

impl ControlSource for KeyControls {
    fn poll(&mut self) -> Option<Command> {
        // Zero timeout: the engine calls this between device writes and
        // must not be delayed.
        if !event::poll(Duration::ZERO).unwrap_or(false) {
            return None;
        }
        let Ok(Event::Key(key)) = event::read() else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char(' ') => Some(Command::TogglePause),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::Skip),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Raw mode swallows SIGINT; Ctrl-C arrives here instead.
                self.quit.request();
                Some(Command::Quit)
            }
            _ => None,
        }
    }
}
