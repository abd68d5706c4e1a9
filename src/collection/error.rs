//! Error types for the collection mapper.
//!
//! The mapper has no failure modes of its own. It forwards two kinds of
//! failure to the caller unchanged:
//!
//! - an error returned by the user function ([`ApplyError::Function`])
//! - a container that cannot be rebuilt ([`ApplyError::Reconstruct`])

use std::fmt;

use super::value::{Key, Value};

/// A container could not be rebuilt from its mapped children.
///
/// # Examples
///
/// ```rust
/// use nestmap::collection::ReconstructError;
///
/// let error = ReconstructError::Arity {
///     record: "Point",
///     expected: 2,
///     actual: 3,
/// };
/// assert_eq!(
///     format!("{error}"),
///     "cannot construct record `Point`: expected 2 fields, got 3"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructError {
    /// The number of values did not match the record's field count.
    Arity {
        /// The record type name.
        record: &'static str,
        /// The number of fields of the record type.
        expected: usize,
        /// The number of values supplied.
        actual: usize,
    },
}

impl fmt::Display for ReconstructError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity {
                record,
                expected,
                actual,
            } => write!(
                formatter,
                "cannot construct record `{record}`: expected {expected} fields, got {actual}"
            ),
        }
    }
}

impl std::error::Error for ReconstructError {}

/// An error raised while applying a function over a collection.
///
/// `E` is the error type of the user function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError<E> {
    /// The user function failed on a leaf.
    Function(E),
    /// A container could not be rebuilt.
    Reconstruct(ReconstructError),
}

impl<E> ApplyError<E> {
    /// Returns the function error, if this is one.
    pub fn into_function_error(self) -> Option<E> {
        match self {
            Self::Function(error) => Some(error),
            Self::Reconstruct(_) => None,
        }
    }

    /// Maps the function error type.
    pub fn map_function_error<F>(self, function: impl FnOnce(E) -> F) -> ApplyError<F> {
        match self {
            Self::Function(error) => ApplyError::Function(function(error)),
            Self::Reconstruct(error) => ApplyError::Reconstruct(error),
        }
    }
}

impl<E> From<ReconstructError> for ApplyError<E> {
    fn from(error: ReconstructError) -> Self {
        Self::Reconstruct(error)
    }
}

impl<E: fmt::Display> fmt::Display for ApplyError<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(error) => write!(formatter, "{error}"),
            Self::Reconstruct(error) => write!(formatter, "{error}"),
        }
    }
}

impl<E> std::error::Error for ApplyError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Function(error) => Some(error),
            Self::Reconstruct(error) => Some(error),
        }
    }
}

/// A [`Value`] did not have the shape a typed conversion expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromValueError {
    /// The node had the wrong variant or leaf type.
    TypeMismatch {
        /// What the conversion expected.
        expected: &'static str,
        /// A description of what was found.
        actual: String,
    },
    /// A record of a different record type was found.
    RecordType {
        /// The expected record type name.
        expected: &'static str,
        /// The record type name found.
        actual: &'static str,
    },
    /// A mapping key had the wrong kind.
    Key {
        /// What the conversion expected.
        expected: &'static str,
        /// The key found.
        actual: Key,
    },
    /// A record field failed to convert.
    Field {
        /// The record type name.
        record: &'static str,
        /// The field name.
        field: &'static str,
        /// The underlying failure.
        source: Box<FromValueError>,
    },
}

impl FromValueError {
    /// Builds a [`FromValueError::TypeMismatch`] describing `actual`.
    #[must_use]
    pub fn mismatch(expected: &'static str, actual: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            actual: actual.describe(),
        }
    }

    /// Wraps the error with the record field it occurred in.
    #[must_use]
    pub fn in_field(self, record: &'static str, field: &'static str) -> Self {
        Self::Field {
            record,
            field,
            source: Box::new(self),
        }
    }
}

impl fmt::Display for FromValueError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, actual } => {
                write!(formatter, "expected {expected}, found {actual}")
            }
            Self::RecordType { expected, actual } => {
                write!(formatter, "expected record `{expected}`, found record `{actual}`")
            }
            Self::Key { expected, actual } => {
                write!(formatter, "expected {expected} key, found {actual}")
            }
            Self::Field {
                record,
                field,
                source,
            } => write!(formatter, "{record}.{field}: {source}"),
        }
    }
}

impl std::error::Error for FromValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
