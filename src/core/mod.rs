//! # Core Logic
//!
//! Everything here is independent of the terminal and of Lua.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │     (this module)       │
//!                    │                         │
//!                    │  • Palette, pair ids    │
//!                    │  • Error kinds          │
//!                    │  • Configuration        │
//!                    │                         │
//!                    │  No terminal. No Lua.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │   screen   │◄───────────│    lua     │
//!            │ (ratatui + │            │  (mlua     │
//!            │ crossterm) │            │  binding)  │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`color`]: The 8-color palette and the (fg, bg) pair identity
//! - [`error`]: `ScreenError`, the error kinds every operation reports
//! - [`config`]: `~/.luacurses/config.toml` loading and resolution

pub mod color;
pub mod config;
pub mod error;
