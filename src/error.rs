//! Error types used by the resolvisor runtime and its collaborators.
//!
//! Two enums cover the whole crate:
//!
//! - [`ServeError`]: errors surfaced by the resolution service and the
//!   whitelist collaborator.
//! - [`StoreError`]: errors from reading the persisted record set.
//!
//! Both provide `as_label` for stable snake_case identifiers in logs.

use thiserror::Error;

/// # Errors surfaced by the resolution service and the whitelist.
///
/// The supervisor classifies these into three outcomes: graceful exit
/// ([`ServeError::Canceled`]), retry after the fixed delay
/// ([`ServeError::Fault`]), and give up ([`ServeError::Fatal`]).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServeError {
    /// The shared shutdown signal was observed. A normal exit, never retried.
    #[error("shutdown signal observed")]
    Canceled,

    /// Recoverable fault (socket error, bind failure, malformed store data).
    /// The supervisor waits the fixed retry delay and serves again.
    #[error("service fault: {error}")]
    Fault {
        /// The underlying cause.
        error: String,
    },

    /// Unrecoverable fault. Only meaningful before the first successful
    /// listen; the supervisor ends instead of retrying.
    #[error("fatal service fault (no retry): {error}")]
    Fatal {
        /// The underlying cause.
        error: String,
    },
}

impl ServeError {
    /// Builds a [`ServeError::Fault`] from any displayable cause.
    pub fn fault(error: impl std::fmt::Display) -> Self {
        ServeError::Fault {
            error: error.to_string(),
        }
    }

    /// Builds a [`ServeError::Fatal`] from any displayable cause.
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        ServeError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use resolvisor::ServeError;
    ///
    /// assert_eq!(ServeError::Canceled.as_label(), "serve_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServeError::Canceled => "serve_canceled",
            ServeError::Fault { .. } => "serve_fault",
            ServeError::Fatal { .. } => "serve_fatal",
        }
    }

    /// True when this error means the shutdown signal was observed.
    ///
    /// Cancellation is an expected termination, not a fault; the supervisor
    /// must never route it through the back-off path.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ServeError::Canceled)
    }
}

/// # Errors from reading the persisted record set.
///
/// A missing file is *not* an error (see
/// [`LoadOutcome::NotFound`](crate::store::LoadOutcome)); these variants cover
/// the cases the supervisor treats as faults.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// The file exists but could not be read.
    #[error("failed to read the record store: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but does not deserialize into a record set.
    #[error("record store is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use resolvisor::StoreError;
    ///
    /// let err = StoreError::from(std::io::Error::other("disk gone"));
    /// assert_eq!(err.as_label(), "store_io");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "store_io",
            StoreError::Parse(_) => "store_parse",
        }
    }
}

impl From<StoreError> for ServeError {
    /// A load failure is a transient fault: retried with back-off, like any
    /// listen-time error.
    fn from(err: StoreError) -> Self {
        ServeError::fault(err)
    }
}
