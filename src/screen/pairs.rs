//! Color pairs registered on a screen.
//!
//! All 64 (fg, bg) combinations are registered up front when the terminal
//! supports color, so `write` only has to look one up by [`pair_id`].

use ratatui::style::{Color as TermColor, Style};

use crate::core::color::{Color, PAIR_COUNT, pair_id};

fn to_terminal(color: Color) -> TermColor {
    // Gray is ANSI color 7; ratatui's White is the bright variant.
    match color {
        Color::Black => TermColor::Black,
        Color::Red => TermColor::Red,
        Color::Green => TermColor::Green,
        Color::Yellow => TermColor::Yellow,
        Color::Blue => TermColor::Blue,
        Color::Magenta => TermColor::Magenta,
        Color::Cyan => TermColor::Cyan,
        Color::White => TermColor::Gray,
    }
}

/// The registered pairs of a screen, indexed by [`pair_id`].
///
/// A terminal without color support registers nothing; every lookup then
/// falls back to the default style, the same way curses ignores
/// `COLOR_PAIR` on a monochrome terminal.
#[derive(Debug, Clone)]
pub struct PairTable {
    styles: Option<Box<[Style; PAIR_COUNT]>>,
}

impl PairTable {
    /// Registers every (fg, bg) combination of the palette.
    pub fn registered() -> Self {
        let mut styles = Box::new([Style::default(); PAIR_COUNT]);
        for fg in Color::ALL {
            for bg in Color::ALL {
                styles[pair_id(fg, bg)] = Style::default().fg(to_terminal(fg)).bg(to_terminal(bg));
            }
        }
        Self {
            styles: Some(styles),
        }
    }

    pub fn monochrome() -> Self {
        Self { styles: None }
    }

    pub fn for_terminal(color: bool) -> Self {
        if color {
            Self::registered()
        } else {
            Self::monochrome()
        }
    }

    pub fn is_registered(&self) -> bool {
        self.styles.is_some()
    }

    pub fn style(&self, fg: Color, bg: Color) -> Style {
        match &self.styles {
            Some(styles) => styles[pair_id(fg, bg)],
            None => Style::default(),
        }
    }
}
