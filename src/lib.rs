//! luacurses: a small curses-style terminal API for Lua scripts.
//!
//! - [`core`]: palette, errors and configuration (no terminal, no Lua)
//! - [`screen`]: the screen handle over ratatui and crossterm
//! - [`lua`]: the `libcurses` module table built with mlua

pub mod core;
pub mod lua;
pub mod screen;

#[cfg(test)]
pub mod test_support;

pub use crate::core::error::ScreenError;
pub use crate::screen::Screen;
