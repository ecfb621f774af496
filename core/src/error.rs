//! Domain error type for widget operations.

use thiserror::Error;

use crate::network::Operation;

/// Typed error enum for widget operations, allowing callers to match on
/// specific failure modes instead of inspecting message strings.
///
/// There is no variant for "wallet not connected": the gate
/// withholds the controller instead of raising.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Amount text that is empty, non-numeric, non-finite, or not positive.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status, or the exchange failed
    /// before a usable answer arrived (`status` is `None` then).
    #[error("{message}")]
    Request {
        operation: Operation,
        status: Option<u16>,
        message: String,
    },

    /// Invalid endpoint or credential configuration supplied by the host.
    #[error("{0}")]
    InvalidConfig(String),
}

impl WidgetError {
    /// Request failure carrying the operation's fixed fallback message.
    pub(crate) fn request_default(operation: Operation, status: Option<u16>) -> Self {
        WidgetError::Request {
            operation,
            status,
            message: operation.default_failure_message().to_string(),
        }
    }

    /// HTTP status of a request failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            WidgetError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Alias for `std::result::Result<T, WidgetError>`.
pub type Result<T> = std::result::Result<T, WidgetError>;
