//! Error types for schema validation and native encoding.
//!
//! The core (schema, encoders, assembler, descriptor) reports failures through
//! [`BcpError`]. Every variant aborts the whole operation: a bulk load is only
//! correct if every row is encoded, so nothing is skipped or defaulted.
//!
//! Outer layers (`io`, `loader`, `bulk`) work with `anyhow::Result` and pick
//! these errors up through `?`; callers can still `downcast_ref::<BcpError>()`.

use std::fmt;

/// Result alias for core operations.
pub type BcpResult<T> = Result<T, BcpError>;

/// A failure raised while validating a schema or encoding a row-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcpError {
    /// The schema (or a row's shape against it) is unusable: unknown type tag,
    /// missing `max_length`, duplicate or unresolvable column.
    Schema(String),
    /// A value could not be coerced to its column's SQL type.
    Encoding {
        column: String,
        row: usize,
        reason: String,
    },
    /// The schema asks for something the native writer does not do.
    UnsupportedFeature(String),
    /// A value's representation is not one the encoder accepts at all.
    MalformedInput {
        column: String,
        row: usize,
        reason: String,
    },
}

impl BcpError {
    pub fn schema<S: Into<String>>(message: S) -> Self {
        BcpError::Schema(message.into())
    }

    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        BcpError::UnsupportedFeature(message.into())
    }

    /// Row index of the offending value, for per-value failures.
    pub fn row(&self) -> Option<usize> {
        match self {
            BcpError::Encoding { row, .. } | BcpError::MalformedInput { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Column name of the offending value, for per-value failures.
    pub fn column(&self) -> Option<&str> {
        match self {
            BcpError::Encoding { column, .. } | BcpError::MalformedInput { column, .. } => {
                Some(column)
            }
            _ => None,
        }
    }
}

impl fmt::Display for BcpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcpError::Schema(msg) => write!(f, "schema error: {}", msg),
            BcpError::Encoding {
                column,
                row,
                reason,
            } => write!(f, "encoding error at row {} column '{}': {}", row, column, reason),
            BcpError::UnsupportedFeature(msg) => write!(f, "unsupported feature: {}", msg),
            BcpError::MalformedInput {
                column,
                row,
                reason,
            } => write!(f, "malformed input at row {} column '{}': {}", row, column, reason),
        }
    }
}

impl std::error::Error for BcpError {}

/// Failure encoding a single value, before it is tied to a row and column.
///
/// Produced by [`encode_value`](crate::encode::encode_value); the column
/// encoder attaches the location with [`ValueError::at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value has the wrong shape or range for the column type.
    Coercion(String),
    /// The value's representation is not accepted (e.g. WKT for GEOMETRY).
    Malformed(String),
    /// The column spec requests an unsupported variant of the type.
    Unsupported(String),
}

impl ValueError {
    pub(crate) fn coercion<S: Into<String>>(message: S) -> Self {
        ValueError::Coercion(message.into())
    }

    pub(crate) fn malformed<S: Into<String>>(message: S) -> Self {
        ValueError::Malformed(message.into())
    }

    /// Attach the location of the value that failed.
    pub fn at(self, column: &str, row: usize) -> BcpError {
        match self {
            ValueError::Coercion(reason) => BcpError::Encoding {
                column: column.to_string(),
                row,
                reason,
            },
            ValueError::Malformed(reason) => BcpError::MalformedInput {
                column: column.to_string(),
                row,
                reason,
            },
            ValueError::Unsupported(msg) => {
                BcpError::UnsupportedFeature(format!("column '{}': {}", column, msg))
            }
        }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Coercion(msg) | ValueError::Malformed(msg) | ValueError::Unsupported(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl std::error::Error for ValueError {}
