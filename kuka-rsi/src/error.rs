//! Error taxonomy for the RSI control surface.
//!
//! Mirrors the original C library's `RSI_Error` status codes one-for-one.
//! `RSI_SUCCESS` has no variant here — it is simply `Ok(())`.

/// Failure modes of the RSI lifecycle and accessor operations.
///
/// Real-time-path failures (malformed frames, a dropped `sendto`, a failed
/// `setsockopt`) are never represented here — they are absorbed by the
/// worker and recorded in [`crate::state::Statistics`] or logged, per the
/// propagation policy in the crate's design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `init` failed, or an operation was attempted before `init`.
    #[error("initialization failed")]
    InitFailed,
    /// `init` called while already initialised, or `start` called while running.
    #[error("RSI is already running")]
    AlreadyRunning,
    /// An operation that requires a running session was called while stopped.
    #[error("RSI is not running")]
    NotRunning,
    /// Socket creation, binding, or option configuration failed.
    #[error("socket creation or binding failed")]
    SocketFailed,
    /// The worker thread could not be spawned.
    #[error("thread creation failed")]
    ThreadFailed,
    /// A caller-supplied argument was invalid.
    #[error("invalid parameter provided")]
    InvalidParam,
    /// An operation did not complete within its allotted budget.
    #[error("operation timed out")]
    Timeout,
    /// A failure that does not fit the other categories.
    #[error("unknown error")]
    Unknown,
}

impl Error {
    /// Short human-readable description, equivalent to `RSI_GetErrorString`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::InitFailed => "initialization failed",
            Error::AlreadyRunning => "RSI is already running",
            Error::NotRunning => "RSI is not running",
            Error::SocketFailed => "socket creation or binding failed",
            Error::ThreadFailed => "thread creation failed",
            Error::InvalidParam => "invalid parameter provided",
            Error::Timeout => "operation timed out",
            Error::Unknown => "unknown error",
        }
    }
}

/// Result alias used throughout the public API.
pub type Result<T> = std::result::Result<T, Error>;

/// Equivalent of `RSI_GetErrorString`, kept for callers porting from the
/// C API's status-code style instead of matching on [`Error`] directly.
pub fn error_string(err: Error) -> &'static str {
    err.as_str()
}
