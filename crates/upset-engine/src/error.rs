//! Error taxonomy
//!
//! Every fallible operation of the crate returns [`UpSetError`]. Nothing is
//! retried: all operations are pure, so a failure is a property of the input.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, UpSetError>;

/// Top-level error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpSetError {
    /// The request itself is inconsistent
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    /// Enumeration would exceed the caller-supplied ceiling
    #[error("Enumeration overflow: {estimated} subsets estimated, ceiling is {ceiling}")]
    Overflow { estimated: u128, ceiling: u128 },
    /// Input data is not well-formed
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Reasons a request is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error("min degree {min} is greater than max degree {max}")]
    DegreeRange { min: usize, max: usize },
    #[error("max degree {max} exceeds the number of sets ({sets})")]
    DegreeExceedsSets { max: usize, sets: usize },
    #[error("unknown combination kind '{0}'")]
    UnknownKind(String),
    #[error("unknown sort key '{0}'")]
    UnknownOrder(String),
    #[error("{sets} sets given, at most {max} supported")]
    TooManySets { sets: usize, max: usize },
}

/// Reasons input data is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    /// Membership list of an element is not a sequence of set names
    #[error("element {element}: {reason}")]
    Membership { element: usize, reason: String },
    /// An index does not point into the list it refers to
    #[error("{location}: index {index} out of range (length {len})")]
    IndexOutOfRange {
        location: String,
        index: usize,
        len: usize,
    },
    /// A dump record is structurally inconsistent
    #[error("{location}: {reason}")]
    InvalidRecord { location: String, reason: String },
    #[error("duplicate set name '{0}'")]
    DuplicateSetName(String),
    #[error("unsupported dump format version: {0}")]
    UnsupportedVersion(u32),
    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<std::io::Error> for UpSetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for UpSetError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedInput(MalformedInput::Json(e.to_string()))
    }
}
