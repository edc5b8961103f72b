//! Error types for the polyhedral engine.
//!
//! Mirrors the error-kind table of the Context error slot: one enum,
//! hand-rolled `Display`, no external error-derive crate.

use std::fmt;

/// The kinds of error the [`crate::ctx::Context`] error slot can hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No error.
    #[default]
    None,
    /// Cooperative cancellation was observed at a loop head.
    Abort,
    /// Caller supplied invalid input: dimension mismatch, out-of-range
    /// position, or objects from mixed contexts.
    Invalid {
        /// Human-readable description of what was invalid.
        msg: String,
    },
    /// The requested operation has no implementation for this input shape.
    Unsupported {
        /// Description of the unsupported shape/feature.
        msg: String,
    },
    /// An internal invariant was violated.
    Internal {
        /// Description of the violated invariant.
        msg: String,
    },
    /// Catch-all: allocation failure or a failed internal assertion.
    Unknown {
        /// Description of the failure.
        msg: String,
    },
}

impl ErrorKind {
    /// Construct an [`ErrorKind::Invalid`] from any displayable message.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        ErrorKind::Invalid { msg: msg.into() }
    }

    /// Construct an [`ErrorKind::Unsupported`] from any displayable message.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        ErrorKind::Unsupported { msg: msg.into() }
    }

    /// Construct an [`ErrorKind::Internal`] from any displayable message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        ErrorKind::Internal { msg: msg.into() }
    }

    /// `true` unless this is [`ErrorKind::None`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(self, ErrorKind::None)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::None => write!(f, "no error"),
            ErrorKind::Abort => write!(f, "operation aborted"),
            ErrorKind::Invalid { msg } => write!(f, "invalid input: {msg}"),
            ErrorKind::Unsupported { msg } => write!(f, "unsupported: {msg}"),
            ErrorKind::Internal { msg } => write!(f, "internal error: {msg}"),
            ErrorKind::Unknown { msg } => write!(f, "unknown error: {msg}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// Error surfaced while parsing or printing the ISL textual format.
///
/// Kept separate from [`ErrorKind`] because format errors carry source
/// spans rather than being Context-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// The input was empty or contained only whitespace.
    EmptyInput,
    /// A token was not recognized by the lexer.
    InvalidToken {
        /// The offending token text.
        token: String,
        /// Byte offset of the token in the input.
        pos: usize,
    },
    /// The parser expected one thing and found another.
    UnexpectedToken {
        /// What the grammar expected at this point.
        expected: String,
        /// What was actually found.
        got: String,
        /// Byte offset of the token in the input.
        pos: usize,
    },
    /// Input ended before a well-formed set/map was parsed.
    UnexpectedEndOfInput,
    /// A named output format is recognized but not implemented.
    Unsupported {
        /// Name of the unsupported format or construct.
        what: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::EmptyInput => write!(f, "input was empty"),
            FormatError::InvalidToken { token, pos } => {
                write!(f, "invalid token '{token}' at byte {pos}")
            }
            FormatError::UnexpectedToken { expected, got, pos } => {
                write!(f, "expected {expected} but found '{got}' at byte {pos}")
            }
            FormatError::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            FormatError::Unsupported { what } => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for FormatError {}
