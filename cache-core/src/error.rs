//! Three distinct error families, kept apart the way [`crate::engine`] keeps
//! [`Stats`](crate::stats::Stats) apart from the store: each converts to a
//! single `CLIENT_ERROR <reason>` wire rendering, but stays a separate Rust
//! type internally so tests and callers can match on the specific failure.

use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A malformed command line: missing parameters or a non-integer byte count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A payload-carrying command didn't supply all four required
    /// parameters (key, flags, ttl, byte count).
    MissingParameters,
    /// The byte-count parameter wasn't a non-negative integer.
    InvalidByteCount,
    /// A command that requires a key (`get`, `incr`, `decr`, `delete`) was
    /// sent with no parameters at all.
    MissingKey,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ParseError::MissingParameters => write!(f, "At least 4 arguments required"),
            ParseError::InvalidByteCount => write!(f, "Number of bytes must be an integer"),
            ParseError::MissingKey => write!(f, "At least 1 argument required"),
        }
    }
}

impl StdError for ParseError {}

/// A well-formed command whose application against the cache engine fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `incr`/`decr` against a value that doesn't parse as a decimal integer.
    NonNumericValue,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EngineError::NonNumericValue => {
                write!(f, "cannot increment or decrement non-numeric value")
            }
        }
    }
}

impl StdError for EngineError {}

/// The payload framing didn't match what the header line declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingError;

impl Display for FramingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "bad data chunk")
    }
}

impl StdError for FramingError {}
