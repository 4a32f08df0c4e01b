//! # Screen Adapter
//!
//! The ratatui/crossterm layer. A [`Screen`] owns a terminal, a retained
//! window buffer, a cursor and a key source. Writes go to the window; the
//! physical terminal only changes on [`Screen::refresh`] (or the implicit
//! refresh before waiting for input), where ratatui diffs the window against
//! what is already on screen.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ```text
//! Screen<B, K>
//! ├── terminal: Terminal<B>        // physical screen (diffed on refresh)
//! ├── window: Buffer               // what scripts draw into
//! ├── cursor: Position             // next write position
//! ├── attributes: Style            // current drawing style
//! ├── pairs: PairTable             // 64 registered color pairs
//! ├── keys: K                      // keyboard input
//! ├── session: Option<Guard>       // real terminal only
//! └── lease: Option<ScreenLease>   // single live screen
//! ```

pub mod input;
pub mod pairs;
pub mod terminal;

use log::{debug, info};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

use crate::core::color::check_pair;
use crate::core::config::ScreenOptions;
use crate::core::error::ScreenError;
use input::{BACKSPACE, ENTER, KeySource};
use pairs::PairTable;
use terminal::{ScreenLease, TerminalModeGuard};

/// Most characters a single `read` may request.
pub const MAX_READ_LENGTH: usize = 1024;

/// Most bytes `readline` keeps from one line; the rest is discarded.
pub const MAX_LINE_LENGTH: usize = 1024;

pub const TAB_WIDTH: u16 = 8;

pub struct Screen<B: Backend, K: KeySource> {
    terminal: Terminal<B>,
    keys: K,
    window: Buffer,
    cursor: Position,
    attributes: Style,
    pairs: PairTable,
    color: bool,
    active: bool,
    echo: bool,
    hide_cursor: bool,
    /// Set by `clear`: the next refresh repaints the whole terminal.
    repaint: bool,
    // Declared before `lease`: the terminal is restored before the lease
    // lets another screen in.
    session: Option<TerminalModeGuard>,
    lease: Option<ScreenLease>,
}

impl<B: Backend, K: KeySource> Screen<B, K> {
    /// Builds a screen over an already prepared backend.
    ///
    /// The terminal is cleared and, when `color` is set, every color pair
    /// is registered.
    pub fn new(backend: B, keys: K, color: bool, options: ScreenOptions) -> Result<Self, ScreenError> {
        let mut terminal = Terminal::new(backend).map_err(ScreenError::backend)?;
        terminal.clear().map_err(ScreenError::backend)?;
        let size = terminal.size().map_err(ScreenError::backend)?;
        let area = Rect::new(0, 0, size.width, size.height);
        debug!("Screen created ({}x{}, color: {})", size.width, size.height, color);

        Ok(Self {
            terminal,
            keys,
            window: Buffer::empty(area),
            cursor: Position::new(0, 0),
            attributes: Style::default(),
            pairs: PairTable::for_terminal(color),
            color,
            active: true,
            echo: options.echo,
            hide_cursor: options.hide_cursor,
            repaint: false,
            session: None,
            lease: None,
        })
    }

    /// Ties the process-wide lease and, on a real terminal, the mode guard
    /// to this screen; `destroy` releases both.
    pub(crate) fn attach(&mut self, lease: ScreenLease, session: Option<TerminalModeGuard>) {
        self.session = session;
        self.lease = Some(lease);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_color(&self) -> bool {
        self.color
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Current (x, y) of the cursor.
    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn attributes(&self) -> Style {
        self.attributes
    }

    pub fn pairs(&self) -> &PairTable {
        &self.pairs
    }

    /// The window as scripts have drawn it, refreshed or not.
    pub fn window(&self) -> &Buffer {
        &self.window
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }

    /// (width, height) of the terminal, queried live.
    pub fn size(&mut self) -> Result<(u16, u16), ScreenError> {
        self.require_active()?;
        self.sync_size()?;
        Ok((self.window.area.width, self.window.area.height))
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Moves the cursor. Coordinates outside the live terminal size are
    /// rejected and leave the cursor where it was.
    pub fn set_cursor(&mut self, x: i64, y: i64) -> Result<(), ScreenError> {
        self.require_active()?;
        self.sync_size()?;
        let cols = self.window.area.width;
        let rows = self.window.area.height;

        let x = u16::try_from(x)
            .ok()
            .filter(|&x| x < cols)
            .ok_or_else(|| {
                ScreenError::Validation(format!(
                    "Column out of range. Expected value in [0, {cols}) but got {x}"
                ))
            })?;
        let y = u16::try_from(y)
            .ok()
            .filter(|&y| y < rows)
            .ok_or_else(|| {
                ScreenError::Validation(format!(
                    "Row out of range. Expected value in [0, {rows}) but got {y}"
                ))
            })?;

        self.cursor = Position::new(x, y);
        Ok(())
    }

    /// Writes `text` at the cursor in the (fg, bg) color pair.
    ///
    /// The pair is only in effect for this call; attributes are back to
    /// default afterwards. Nothing reaches the terminal until `refresh`.
    pub fn write(&mut self, text: &str, fg: i64, bg: i64) -> Result<(), ScreenError> {
        self.require_active()?;
        let (fg, bg) = check_pair(fg, bg)?;
        self.sync_size()?;

        self.attributes = self.pairs.style(fg, bg);
        for c in text.chars() {
            if !self.put_char(c) {
                debug!("Window full, dropping the rest of the write");
                break;
            }
        }
        self.attributes = Style::default();
        Ok(())
    }

    /// Blanks the window and homes the cursor. The terminal is repainted
    /// from scratch on the next refresh.
    pub fn clear(&mut self) -> Result<(), ScreenError> {
        self.require_active()?;
        self.window.reset();
        self.cursor = Position::new(0, 0);
        self.repaint = true;
        Ok(())
    }

    /// Pushes the window to the terminal.
    pub fn refresh(&mut self) -> Result<(), ScreenError> {
        self.require_active()?;
        self.sync_size()?;
        if self.repaint {
            self.terminal.clear().map_err(ScreenError::backend)?;
            self.repaint = false;
        }

        let window = &self.window;
        let cursor = (!self.hide_cursor).then_some(self.cursor);
        self.terminal
            .draw(|frame| {
                let buf = frame.buffer_mut();
                for y in 0..window.area.height {
                    for x in 0..window.area.width {
                        if let (Some(src), Some(dst)) = (window.cell((x, y)), buf.cell_mut((x, y))) {
                            *dst = src.clone();
                        }
                    }
                }
                if let Some(position) = cursor {
                    frame.set_cursor_position(position);
                }
            })
            .map_err(ScreenError::backend)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Reads up to `n` characters.
    ///
    /// Non-blocking reads stop at the first moment no key is pending, so an
    /// idle keyboard yields an empty string.
    pub fn read(&mut self, n: i64, blocking: bool) -> Result<String, ScreenError> {
        let n = usize::try_from(n)
            .ok()
            .filter(|&n| n <= MAX_READ_LENGTH)
            .ok_or_else(|| {
                ScreenError::Validation(format!(
                    "Cannot read more than {MAX_READ_LENGTH} characters"
                ))
            })?;
        self.require_active()?;

        let mut text = String::new();
        text.try_reserve_exact(n)?;
        for _ in 0..n {
            match self.next_char(blocking)? {
                Some(c) => {
                    if self.echo {
                        self.put_char(c);
                    }
                    text.push(c);
                }
                None => break,
            }
        }
        Ok(text)
    }

    /// Reads one line, without its terminator.
    ///
    /// At most [`MAX_LINE_LENGTH`] bytes are kept; further characters are
    /// discarded until the line ends. Backspace removes the last kept
    /// character. A non-blocking read returns whatever was typed so far once
    /// no key is pending.
    pub fn readline(&mut self, blocking: bool) -> Result<String, ScreenError> {
        self.require_active()?;

        let mut line = String::new();
        line.try_reserve_exact(MAX_LINE_LENGTH)?;
        // Where each echoed character started, so backspace can undo tabs,
        // caret pairs and wraps exactly.
        let mut echoed: Vec<Position> = Vec::new();
        while let Some(c) = self.next_char(blocking)? {
            match c {
                ENTER | '\r' => break,
                BACKSPACE | '\x08' => {
                    if line.pop().is_some()
                        && let Some(start) = echoed.pop()
                    {
                        self.erase_to(start);
                    }
                }
                c if line.len() + c.len_utf8() <= MAX_LINE_LENGTH => {
                    line.push(c);
                    if self.echo {
                        echoed.push(self.cursor);
                        self.put_char(c);
                    }
                }
                _ => debug!("Line buffer full, discarding {:?}", c),
            }
        }
        Ok(line)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Gives the terminal back. Further calls are no-ops.
    pub fn destroy(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.session.take();
        self.lease.take();
        info!("Screen destroyed");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_active(&self) -> Result<(), ScreenError> {
        if self.active {
            Ok(())
        } else {
            Err(ScreenError::Inactive)
        }
    }

    /// Refreshes the terminal, then takes the next key.
    fn next_char(&mut self, blocking: bool) -> Result<Option<char>, ScreenError> {
        self.refresh()?;
        let c = self.keys.next_char(blocking)?;
        if let Some(c) = c {
            debug!("Read {:?}", c);
        }
        Ok(c)
    }

    /// Follows the terminal size, keeping the overlapping part of the window.
    fn sync_size(&mut self) -> Result<(), ScreenError> {
        let size = self.terminal.size().map_err(ScreenError::backend)?;
        let area = Rect::new(0, 0, size.width, size.height);
        if area == self.window.area {
            return Ok(());
        }

        debug!("Terminal resized to {}x{}", size.width, size.height);
        let mut resized = Buffer::empty(area);
        for y in 0..area.height.min(self.window.area.height) {
            for x in 0..area.width.min(self.window.area.width) {
                if let (Some(src), Some(dst)) = (self.window.cell((x, y)), resized.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
        self.window = resized;
        self.cursor.x = self.cursor.x.min(area.width.saturating_sub(1));
        self.cursor.y = self.cursor.y.min(area.height.saturating_sub(1));
        Ok(())
    }

    /// Draws one character at the cursor and advances it.
    ///
    /// Returns `false` once the bottom-right corner is reached; the window
    /// does not scroll.
    fn put_char(&mut self, c: char) -> bool {
        let area = self.window.area;
        if area.is_empty() {
            return false;
        }

        match c {
            '\n' => {
                self.clear_to_eol();
                return self.next_line();
            }
            '\r' => {
                self.cursor.x = 0;
                return true;
            }
            '\t' => {
                let stop = (self.cursor.x / TAB_WIDTH + 1) * TAB_WIDTH;
                while self.cursor.x < stop.min(area.width) {
                    let row = self.cursor.y;
                    if !self.put_char(' ') {
                        return false;
                    }
                    if self.cursor.y != row {
                        break;
                    }
                }
                return true;
            }
            c if c.is_ascii_control() => {
                // Shown in caret notation: ^C, ^[, ^?
                let shown = if c == BACKSPACE {
                    '?'
                } else {
                    char::from((c as u8) | 0x40)
                };
                return self.put_char('^') && self.put_char(shown);
            }
            _ => {}
        }

        let width = c.width().unwrap_or(0) as u16;
        if width == 0 {
            // Combining marks join the cell before the cursor.
            if self.cursor.x > 0
                && let Some(cell) = self.window.cell_mut((self.cursor.x - 1, self.cursor.y))
            {
                let joined = format!("{}{}", cell.symbol(), c);
                cell.set_symbol(&joined);
            }
            return true;
        }
        if width > area.width {
            return false;
        }
        if self.cursor.x + width > area.width && !self.next_line() {
            return false;
        }

        let Position { x, y } = self.cursor;
        let mut symbol = [0u8; 4];
        if let Some(cell) = self.window.cell_mut((x, y)) {
            cell.reset();
            cell.set_symbol(c.encode_utf8(&mut symbol));
            cell.set_style(self.attributes);
        }
        for trailing in 1..width {
            if let Some(cell) = self.window.cell_mut((x + trailing, y)) {
                cell.reset();
            }
        }

        self.cursor.x += width;
        if self.cursor.x >= area.width && !self.next_line() {
            self.cursor.x = area.width - 1;
            return false;
        }
        true
    }

    fn next_line(&mut self) -> bool {
        if self.cursor.y + 1 < self.window.area.height {
            self.cursor = Position::new(0, self.cursor.y + 1);
            true
        } else {
            false
        }
    }

    fn clear_to_eol(&mut self) {
        for x in self.cursor.x..self.window.area.width {
            if let Some(cell) = self.window.cell_mut((x, self.cursor.y)) {
                cell.reset();
            }
        }
    }

    /// Blanks every cell from `start` up to the cursor and moves the cursor
    /// back to `start`.
    fn erase_to(&mut self, start: Position) {
        let width = self.window.area.width;
        let mut pos = start;
        while (pos.y, pos.x) < (self.cursor.y, self.cursor.x) {
            if let Some(cell) = self.window.cell_mut(pos) {
                cell.reset();
            }
            pos.x += 1;
            if pos.x >= width {
                pos = Position::new(0, pos.y + 1);
            }
        }
        self.cursor = start;
    }
}
