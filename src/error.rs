//! Error types for the Haystack value model and the Zinc encoding.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side
//! is the single [`Error`] enum defined here.
//!
//! ## Error Categories
//!
//! - **Construction errors**: a value fails its own validity rules (bad unit,
//!   bad ref id, out-of-range date field, duplicate grid column, ...)
//! - **Parse errors**: tokenizer or grammar mismatches, always carrying the
//!   1-based line number of the offending input
//! - **Lookup errors**: raised only by the `*_checked` accessors of
//!   [`Dict`](crate::Dict), [`Grid`](crate::Grid) and [`Row`](crate::Row)
//! - **Encode errors**: values that cannot be expressed in the requested Zinc
//!   version, or whose strings contain characters Zinc cannot carry
//!
//! ## Examples
//!
//! ```rust
//! use haystack_zinc::{read_grid, Error};
//!
//! let result = read_grid("ver:\"4.0\"\nid\n");
//! match result {
//!     Err(Error::UnsupportedVersion { line, version }) => {
//!         assert_eq!(line, 1);
//!         assert_eq!(version, "4.0");
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while building, reading or writing
/// Haystack values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Tokenizer or grammar error
    #[error("Syntax error at line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    /// The reader found a different token than the grammar requires
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Grid header declared a version other than 2.0 or 3.0
    #[error("Unsupported zinc version \"{version}\" at line {line}")]
    UnsupportedVersion { line: usize, version: String },

    /// A value failed its construction invariant
    #[error("Invalid {kind}: {msg}")]
    InvalidValue { kind: &'static str, msg: String },

    /// Builder used out of order
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Checked lookup of a name that is missing
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Value cannot be written as Zinc
    #[error("Cannot encode {kind}: {msg}")]
    Encode { kind: &'static str, msg: String },

    /// A grid flagged with the `err` marker
    #[error("Error grid: {dis}")]
    ErrGrid { dis: String, trace: Option<String> },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at the given 1-based line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Error;
    ///
    /// let err = Error::syntax(10, "Unexpected end of str");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            msg: msg.into(),
        }
    }

    /// Creates an unexpected-token error.
    pub fn unexpected_token(line: usize, expected: impl Into<String>, found: impl fmt::Display) -> Self {
        Error::UnexpectedToken {
            line,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported-version error.
    pub fn unsupported_version(line: usize, version: &str) -> Self {
        Error::UnsupportedVersion {
            line,
            version: version.to_string(),
        }
    }

    /// Creates a construction error for a value of the given kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Error;
    ///
    /// let err = Error::invalid("unit", "'m s' contains a space");
    /// assert_eq!(err.to_string(), "Invalid unit: 'm s' contains a space");
    /// ```
    pub fn invalid(kind: &'static str, msg: impl Into<String>) -> Self {
        Error::InvalidValue {
            kind,
            msg: msg.into(),
        }
    }

    /// Creates an illegal-state error for builder misuse.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Error::IllegalState(msg.into())
    }

    /// Creates a lookup error for a missing name.
    pub fn unknown_name(name: &str) -> Self {
        Error::UnknownName(name.to_string())
    }

    /// Creates an encode error.
    pub fn encode(kind: &'static str, msg: impl Into<String>) -> Self {
        Error::Encode {
            kind,
            msg: msg.into(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the input line for parse errors, `None` otherwise.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. }
            | Error::UnexpectedToken { line, .. }
            | Error::UnsupportedVersion { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Returns `true` for tokenizer and grammar errors.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        self.line().is_some()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_only_for_parse_errors() {
        assert_eq!(Error::syntax(3, "bad").line(), Some(3));
        assert_eq!(Error::unsupported_version(1, "4.0").line(), Some(1));
        assert_eq!(Error::invalid("unit", "bad").line(), None);
        assert!(!Error::unknown_name("area").is_parse());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::unexpected_token(7, "','", "identifier foo");
        assert_eq!(
            err.to_string(),
            "Unexpected token at line 7: expected ',', found identifier foo"
        );
        assert_eq!(Error::unknown_name("area").to_string(), "Unknown name: area");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(Error::from(io), Error::Io(msg) if msg.contains("short read")));
    }
}
