//! The controlling terminal.
//!
//! Only one screen may own the terminal at a time. [`ScreenLease`] enforces
//! that process-wide, and [`TerminalModeGuard`] switches the terminal into
//! screen mode and back.

use std::io::{Stdout, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::style::available_color_count;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::backend::CrosstermBackend;

use super::Screen;
use super::input::CrosstermKeys;
use crate::core::color::PALETTE_SIZE;
use crate::core::config::ScreenOptions;
use crate::core::error::ScreenError;

static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Proof that the caller is the only live screen in the process.
#[derive(Debug)]
pub struct ScreenLease {
    _private: (),
}

impl ScreenLease {
    pub fn acquire() -> Result<Self, ScreenError> {
        SCREEN_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ScreenLease { _private: () })
            .map_err(|_| ScreenError::AlreadyActive)
    }

    pub fn is_held() -> bool {
        SCREEN_ACTIVE.load(Ordering::Acquire)
    }
}

impl Drop for ScreenLease {
    fn drop(&mut self) {
        SCREEN_ACTIVE.store(false, Ordering::Release);
    }
}

/// Holds the terminal in screen mode (raw input, optional alternate screen)
/// and restores it on drop.
#[derive(Debug)]
pub struct TerminalModeGuard {
    options: ScreenOptions,
}

impl TerminalModeGuard {
    pub fn new(options: ScreenOptions) -> Result<Self, ScreenError> {
        // Built before touching the terminal so a partial setup is undone.
        let guard = Self { options };

        enable_raw_mode()?;
        if options.alternate_screen {
            execute!(stdout(), EnterAlternateScreen)?;
        }
        if options.hide_cursor {
            execute!(stdout(), Hide)?;
        }
        info!(
            "Terminal modes enabled (raw, alternate screen: {}, hidden cursor: {})",
            options.alternate_screen, options.hide_cursor
        );
        Ok(guard)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        if self.options.alternate_screen {
            let _ = execute!(stdout(), LeaveAlternateScreen);
        }
        let _ = execute!(stdout(), Show);
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
        info!("Terminal restored");
    }
}

/// Whether the terminal can show the eight palette colors.
pub fn has_colors() -> bool {
    available_color_count() >= PALETTE_SIZE as u16
}

impl Screen<CrosstermBackend<Stdout>, CrosstermKeys> {
    /// Takes over the controlling terminal.
    ///
    /// Fails with [`ScreenError::AlreadyActive`] while another screen is live.
    pub fn init(options: ScreenOptions) -> Result<Self, ScreenError> {
        let lease = ScreenLease::acquire()?;
        let guard = TerminalModeGuard::new(options)?;
        let color = has_colors();
        let mut screen = Screen::new(CrosstermBackend::new(stdout()), CrosstermKeys, color, options)?;
        screen.attach(lease, Some(guard));
        info!(
            "Screen initialized ({}x{}, color: {})",
            screen.window().area.width,
            screen.window().area.height,
            color
        );
        Ok(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_screen;

    // The only test in the crate that touches the process-wide lease, so the
    // steps run in one test rather than racing each other.
    #[test]
    fn test_lease_is_exclusive_until_released() {
        let first = ScreenLease::acquire().unwrap();
        assert!(ScreenLease::is_held());
        assert_eq!(ScreenLease::acquire().unwrap_err(), ScreenError::AlreadyActive);

        drop(first);
        assert!(!ScreenLease::is_held());

        // A screen holding the lease keeps it until destroyed.
        let mut screen = test_screen(10, 2);
        screen.attach(ScreenLease::acquire().unwrap(), None);
        assert_eq!(ScreenLease::acquire().unwrap_err(), ScreenError::AlreadyActive);

        screen.destroy();
        assert!(!ScreenLease::is_held());
        let again = ScreenLease::acquire().unwrap();
        drop(again);

        // Dropping a live screen gives the lease back as well.
        let mut screen = test_screen(10, 2);
        screen.attach(ScreenLease::acquire().unwrap(), None);
        drop(screen);
        assert!(!ScreenLease::is_held());
    }
}
