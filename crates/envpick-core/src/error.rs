#![forbid(unsafe_code)]

//! Selection errors.

use std::fmt;
use std::io;

/// Why a selection call produced no profile.
#[derive(Debug)]
pub enum SelectError {
    /// The profile list is empty.
    NoProfiles,
    /// The user pressed Escape or Ctrl-C.
    Cancelled,
    /// Numbered input that is not an integer.
    InvalidNumber {
        /// The trimmed line as typed.
        input: String,
    },
    /// Numbered input outside `1..=count`.
    OutOfRange {
        /// The number typed.
        choice: i64,
        /// Number of profiles on offer.
        count: usize,
    },
    /// Reading input or writing the menu failed with no tier left to fall back to.
    Io(io::Error),
}

impl SelectError {
    /// True for a user cancellation, which callers usually treat as a normal exit.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProfiles => {
                write!(f, "no profiles configured - add one before selecting")
            }
            Self::Cancelled => write!(f, "selection cancelled"),
            Self::InvalidNumber { input } => {
                write!(f, "invalid selection - must be a number, got '{input}'")
            }
            Self::OutOfRange { choice, count } => {
                write!(f, "invalid selection {choice} - must be between 1 and {count}")
            }
            Self::Io(err) => write!(f, "terminal I/O failed: {err}"),
        }
    }
}

impl std::error::Error for SelectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SelectError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(SelectError::Cancelled.is_cancelled());
        assert!(!SelectError::NoProfiles.is_cancelled());
        assert!(!SelectError::from(io::Error::other("boom")).is_cancelled());
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = SelectError::OutOfRange {
            choice: 7,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid selection 7 - must be between 1 and 3"
        );
    }

    #[test]
    fn io_error_exposes_source() {
        use std::error::Error;
        let err = SelectError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(err.source().is_some());
        assert!(SelectError::NoProfiles.source().is_none());
    }

    #[test]
    fn io_message_covers_reads_and_writes() {
        let err = SelectError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "terminal I/O failed: pipe closed");
    }
}
