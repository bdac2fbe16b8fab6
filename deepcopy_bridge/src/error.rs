//! Errors raised while lifting engine values back into Rust types.

use std::fmt;

use deepcopy_engine::{Kind, ValueError};

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The value's kind does not match the target type.
    KindMismatch { expected: Kind, found: Kind },
    /// A nil pointer where the target type cannot be nil.
    NilPointer,
    /// A fixed-length array of the wrong length.
    LengthMismatch { expected: usize, found: usize },
    /// A record with no field of this name.
    MissingField(String),
    /// The value model rejected an access.
    Value(ValueError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::KindMismatch { expected, found } => {
                write!(f, "kind mismatch: expected {}, found {}", expected, found)
            }
            BridgeError::NilPointer => write!(f, "nil pointer for non-nullable type"),
            BridgeError::LengthMismatch { expected, found } => {
                write!(f, "length mismatch: expected {}, found {}", expected, found)
            }
            BridgeError::MissingField(name) => write!(f, "missing field: {}", name),
            BridgeError::Value(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<ValueError> for BridgeError {
    fn from(err: ValueError) -> Self {
        BridgeError::Value(err)
    }
}
