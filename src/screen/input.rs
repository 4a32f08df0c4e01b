//! Keyboard input for a screen.
//!
//! A [`KeySource`] hands out decoded characters one at a time, either
//! waiting for the next key or returning immediately when nothing is
//! pending. The real terminal reads crossterm events; tests and embedders
//! feed a [`ScriptedKeys`] queue instead.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

pub const ENTER: char = '\n';
pub const BACKSPACE: char = '\x7f';
pub const ESCAPE: char = '\x1b';

/// Where a screen's keystrokes come from.
pub trait KeySource {
    /// Returns the next character typed.
    ///
    /// With `blocking = false` this returns `Ok(None)` as soon as no key is
    /// pending; with `blocking = true` it waits.
    fn next_char(&mut self, blocking: bool) -> io::Result<Option<char>>;
}

/// Translates a key event into the character a line-oriented reader sees.
///
/// Returns `None` for release events and keys with no character form
/// (arrows, function keys, ...).
pub fn decode_key(key: &KeyEvent) -> Option<char> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() => {
            Some(((c.to_ascii_lowercase() as u8) & 0x1f) as char)
        }
        KeyCode::Char(c) => Some(c),
        KeyCode::Enter => Some(ENTER),
        KeyCode::Tab => Some('\t'),
        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Esc => Some(ESCAPE),
        _ => None,
    }
}

// ============================================================================
// Terminal keys
// ============================================================================

/// Reads keys from the controlling terminal through crossterm.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_char(&mut self, blocking: bool) -> io::Result<Option<char>> {
        loop {
            if !blocking && !event::poll(Duration::ZERO)? {
                return Ok(None);
            }
            // Resize and mouse events are consumed and skipped.
            if let Event::Key(key) = event::read()? {
                match decode_key(&key) {
                    Some(c) => return Ok(Some(c)),
                    None => debug!("Skipping key {:?} with modifiers {:?}", key.code, key.modifiers),
                }
            }
        }
    }
}

// ============================================================================
// Scripted keys
// ============================================================================

/// A shared queue of key events.
///
/// Clones share the same queue, so a test can keep one clone and push keys
/// while a screen owns another. A blocking read on an empty queue fails with
/// `UnexpectedEof` instead of hanging.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    queue: Rc<RefCell<VecDeque<KeyEvent>>>,
}

impl ScriptedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let keys = Self::new();
        keys.push_text(text);
        keys
    }

    pub fn push_key(&self, key: KeyEvent) {
        self.queue.borrow_mut().push_back(key);
    }

    /// Queues one key press per character; `\n` becomes Enter.
    pub fn push_text(&self, text: &str) {
        let mut queue = self.queue.borrow_mut();
        for c in text.chars() {
            let code = match c {
                '\n' => KeyCode::Enter,
                '\t' => KeyCode::Tab,
                BACKSPACE => KeyCode::Backspace,
                ESCAPE => KeyCode::Esc,
                c => KeyCode::Char(c),
            };
            queue.push_back(KeyEvent::new(code, KeyModifiers::NONE));
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_char(&mut self, blocking: bool) -> io::Result<Option<char>> {
        let mut queue = self.queue.borrow_mut();
        while let Some(key) = queue.pop_front() {
            if let Some(c) = decode_key(&key) {
                return Ok(Some(c));
            }
        }
        if blocking {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted"))
        } else {
            Ok(None)
        }
    }
}
