/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::limits::{EAGAIN, EINTR, EINVAL, EIO, ENOTSUP};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signal subsystem result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal subsystem errors
///
/// Integrity violations are not errors: an unexpected pending signal
/// is routed to [`Host::integrity_violation`](crate::signals::Host) and never
/// returned to a caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SignalError {
    #[error("Invalid signal: {0}")]
    #[diagnostic(
        code(signal::invalid),
        help("Signal numbers must lie inside the emulated signal space (see Signal::ALL).")
    )]
    InvalidSignal(u32),

    #[error("Too many wait objects: {requested} exceeds host limit of {limit}")]
    #[diagnostic(
        code(wait::capacity_exceeded),
        help("Live children and caller handles share one wait. Split the handles into smaller batches.")
    )]
    CapacityExceeded { requested: usize, limit: usize },

    #[error("Interrupted by signal")]
    #[diagnostic(
        code(signal::interrupted),
        help("A signal handler ran while waiting. Retry or abandon the blocking operation.")
    )]
    Interrupted,

    #[error("Host wait failed: {0}")]
    #[diagnostic(
        code(wait::host_error),
        help("The native wait returned an unexpected result. Check that every handle is still open.")
    )]
    HostError(String),

    #[error("Timer initialization failed: {0}")]
    #[diagnostic(code(timer::init_failed))]
    TimerInit(String),

    #[error("Child table full: {0} children tracked")]
    #[diagnostic(
        code(process::child_limit),
        help("Reap terminated children before spawning more.")
    )]
    ChildLimit(usize),

    #[error("Failed to install notification bridge: {0}")]
    #[diagnostic(code(host::bridge_install))]
    BridgeInstall(String),
}

impl SignalError {
    /// POSIX errno equivalent of this error
    pub fn errno(&self) -> i32 {
        match self {
            SignalError::InvalidSignal(_) => EINVAL,
            SignalError::CapacityExceeded { .. } => ENOTSUP,
            SignalError::Interrupted => EINTR,
            SignalError::HostError(_) | SignalError::BridgeInstall(_) => EIO,
            SignalError::TimerInit(_) => EIO,
            SignalError::ChildLimit(_) => EAGAIN,
        }
    }

    /// Check if this is the `EINTR` outcome of a wait or dispatch
    #[inline]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, SignalError::Interrupted)
    }
}
