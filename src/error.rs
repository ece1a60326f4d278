use std::num::ParseIntError;

use miette::{Diagnostic, SourceSpan};
use nom::Offset;
use thiserror::Error;

/// Records all errors reported by this library.
#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors encountered while parsing.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// No version in a collection satisfied the constraints.
    #[error("no version satisfies constraints '{constraints}'")]
    NoMatchingVersion {
        /// The rendered constraints that were checked.
        constraints: String,
    },
}

/// Errors encountered when parsing.
#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The provided value was empty, which is invalid for this type.
    #[error("input was empty, which is invalid for this type")]
    Empty,

    /// The input did not match the version syntax.
    #[error("version '{input}' did not match required syntax: {message}")]
    Version {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// Describes what the parser found at `span`.
        message: String,

        /// The location of the error.
        #[label("here")]
        span: SourceSpan,
    },

    /// A numeric segment of the version could not be represented.
    #[error("segment '{segment}' of version '{input}' is not a valid number")]
    Segment {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The segment that failed.
        segment: String,

        /// The error encountered while parsing the segment.
        #[source]
        error: ParseIntError,

        /// The location of the segment.
        #[label("segment")]
        span: SourceSpan,
    },

    /// A constraint token did not match `[operator]version`.
    #[error("malformed constraint '{token}' in '{input}'")]
    Constraint {
        /// The full constraint input originally provided.
        #[source_code]
        input: String,

        /// The token that failed to parse.
        token: String,

        /// The version error, if the operator parsed but the version did not.
        #[source]
        error: Option<Box<ParseError>>,

        /// The location of the token.
        #[label("constraint")]
        span: SourceSpan,
    },
}

/// Return the span of `part` inside `text`.
///
/// `part` must be a subslice of `text`.
pub(crate) fn span(text: &str, part: &str) -> SourceSpan {
    (text.offset(part), part.len()).into()
}

/// Shorthand for conversion into [`Error`] and returning.
macro_rules! fatal {
    ($err:expr) => {
        return Err($crate::error::Error::from($err))
    };
}
pub(crate) use fatal;
