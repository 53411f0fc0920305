use derive_more::Display;
use dynlink_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Only unavailable collaborators are worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Unavailable)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input or misuse; retrying the same call fails again.
    InvalidInput,

    /// The addressed record no longer exists.
    NotFound,

    /// A collaborator timed out or was unreachable.
    Unavailable,

    /// No encoder can produce the negotiated format.
    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::InvalidInput => Self::InvalidInput,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::Unavailable => Self::Unavailable,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::Internal | ErrorClass::InvariantViolation => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Interface,
    Key,
    Link,
    Model,
    Record,
    Serialize,
    Store,
    Stream,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Model => Self::Model,
            CoreErrorOrigin::Record => Self::Record,
            CoreErrorOrigin::Key => Self::Key,
            CoreErrorOrigin::Link => Self::Link,
            CoreErrorOrigin::Stream => Self::Stream,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Interface => Self::Interface,
        }
    }
}

///
/// TESTS
///
