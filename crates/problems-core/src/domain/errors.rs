//! Domain error types
//!
//! Bus faults with a name the daemon documents are translated into
//! dedicated variants; everything else is carried through untouched.

use thiserror::Error;

use crate::ports::bus::{BusFault, ERROR_AUTH_FAILURE, ERROR_INVALID_PROBLEM_DIR};

/// Errors that can occur while talking to the problem daemon
#[derive(Debug, Error)]
pub enum ProblemError {
    /// The daemon refused the operation for permission reasons
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The dump directory handle is not known to the daemon
    #[error("Invalid problem directory: {0}")]
    InvalidProblem(String),

    /// The selected transport does not support this operation
    #[error("Operation not implemented by this transport: {0}")]
    NotImplemented(&'static str),

    /// No bus interface handle is held
    #[error("Not connected to the problems service")]
    NotConnected,

    /// Any other bus-level fault, passed through as received
    #[error("D-Bus error: {0}")]
    Bus(BusFault),

    /// The daemon answered with a reply of the wrong shape
    #[error("Unexpected reply to {method}: {reply}")]
    UnexpectedReply {
        /// D-Bus member that was called
        method: &'static str,
        /// Short description of what came back
        reply: String,
    },

    /// Socket transport I/O failure other than a timeout
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BusFault> for ProblemError {
    fn from(fault: BusFault) -> Self {
        match fault.name.as_deref() {
            Some(ERROR_AUTH_FAILURE) => ProblemError::Authorization(fault.message),
            Some(ERROR_INVALID_PROBLEM_DIR) => ProblemError::InvalidProblem(fault.message),
            _ => ProblemError::Bus(fault),
        }
    }
}

impl ProblemError {
    /// Returns `true` if this is a raw bus fault reporting that the
    /// daemon's well-known name has no owner (e.g. it is restarting).
    pub fn is_service_unknown(&self) -> bool {
        matches!(self, ProblemError::Bus(fault) if fault.is_service_unknown())
    }
}
