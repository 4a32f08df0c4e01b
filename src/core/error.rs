use std::collections::TryReserveError;
use std::fmt;

/// Errors raised by screen operations.
///
/// Every variant is surfaced to the calling script as-is; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// An argument was outside its declared range. Raised before any mutation.
    Validation(String),
    /// The scratch buffer for a read could not be reserved.
    Allocation,
    /// The underlying terminal reported an I/O failure.
    Backend(String),
    /// `init` was called while another screen still owns the terminal.
    AlreadyActive,
    /// The handle was destroyed and no longer owns a terminal.
    Inactive,
}

impl ScreenError {
    pub fn backend(err: impl std::error::Error) -> Self {
        ScreenError::Backend(err.to_string())
    }
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::Validation(msg) => write!(f, "{msg}"),
            ScreenError::Allocation => write!(f, "Memory allocation error"),
            ScreenError::Backend(msg) => write!(f, "terminal error: {msg}"),
            ScreenError::AlreadyActive => {
                write!(f, "A screen is already active; destroy it before calling init again")
            }
            ScreenError::Inactive => write!(f, "Screen has been destroyed"),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<std::io::Error> for ScreenError {
    fn from(err: std::io::Error) -> Self {
        ScreenError::Backend(err.to_string())
    }
}

impl From<TryReserveError> for ScreenError {
    fn from(_: TryReserveError) -> Self {
        ScreenError::Allocation
    }
}
