use thiserror::Error;

/// Convenience alias for command results.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by cache commands.
///
/// Expiry is never an error: an expired entry is reported as a plain
/// miss (`KeyNotExist`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The command requires an existing live entry and none is present.
    #[error("key does not exist")]
    KeyNotExist,

    /// The stored value's variant does not match what the command
    /// operates on. Carries the expected category, e.g. "not a list".
    #[error("{0}")]
    TypeMismatch(&'static str),

    /// The caller's context was canceled before the command started.
    #[error("context canceled")]
    Canceled,

    /// The caller's deadline had already passed at command entry.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
