//! # Palette and Color Pairs
//!
//! Scripts name colors by the curses constants (`BLACK = 0` .. `WHITE = 7`).
//! A foreground/background combination is a *pair*, identified by
//! `fg * PALETTE_SIZE + bg`.

use super::error::ScreenError;

/// One of the eight basic terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

/// Number of entries in the palette.
pub const PALETTE_SIZE: usize = 8;

/// Number of distinct color pairs.
pub const PAIR_COUNT: usize = PALETTE_SIZE * PALETTE_SIZE;

impl Color {
    pub const ALL: [Color; PALETTE_SIZE] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// The name exposed in the script-side `colors` table.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "BLACK",
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
            Color::Blue => "BLUE",
            Color::Magenta => "MAGENTA",
            Color::Cyan => "CYAN",
            Color::White => "WHITE",
        }
    }

    /// The curses color constant.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i64) -> Option<Color> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Color::ALL.get(i).copied())
    }
}

/// Identifier of a registered (fg, bg) pair, in `0..PAIR_COUNT`.
pub fn pair_id(fg: Color, bg: Color) -> usize {
    fg.id() as usize * PALETTE_SIZE + bg.id() as usize
}

/// Validates a script-supplied (fg, bg) and returns the colors.
pub fn check_pair(fg: i64, bg: i64) -> Result<(Color, Color), ScreenError> {
    let fg = Color::from_index(fg)
        .ok_or_else(|| ScreenError::Validation(format!("Invalid fg color: {fg}")))?;
    let bg = Color::from_index(bg)
        .ok_or_else(|| ScreenError::Validation(format!("Invalid bg color: {bg}")))?;
    Ok((fg, bg))
}
