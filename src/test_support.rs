//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use crate::core::config::ScreenOptions;
use crate::screen::Screen;
use crate::screen::input::ScriptedKeys;

pub type TestScreen = Screen<TestBackend, ScriptedKeys>;

/// Creates a color-capable test screen with no pending input.
pub fn test_screen(width: u16, height: u16) -> TestScreen {
    test_screen_with_keys(width, height, ScriptedKeys::new(), true)
}

/// Creates a test screen reading from `keys`.
pub fn test_screen_with_keys(width: u16, height: u16, keys: ScriptedKeys, color: bool) -> TestScreen {
    Screen::new(TestBackend::new(width, height), keys, color, ScreenOptions::default())
        .expect("test backend never fails")
}

/// The symbols of one row, concatenated.
pub fn row_text(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .filter_map(|x| buffer.cell((x, y)))
        .map(|cell| cell.symbol())
        .collect()
}
