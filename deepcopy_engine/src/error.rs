//! Value-model errors.
//!
//! These cover misuse of the value API (reading through nil, indexing out of
//! range, sending on a closed channel, calling with the wrong arity).
//! The deep copy operation itself never returns them.

use std::fmt;

use crate::kind::Kind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    NilPointer,
    NilMap,
    NilSlice,
    NilFunc,
    IndexOutOfRange { index: usize, len: usize },
    /// Map keys must be comparable; slices, maps and callables are not.
    UnhashableKey(Kind),
    SendOnClosedChannel,
    SendOnNilChannel,
    CloseOfClosedChannel,
    CloseOfNilChannel,
    ArgumentCount { expected: usize, found: usize },
    ResultCount { expected: usize, found: usize },
    NotVariadic,
    NoSuchField(String),
    FieldCount { expected: usize, found: usize },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::NilPointer => write!(f, "nil pointer dereference"),
            ValueError::NilMap => write!(f, "assignment to entry in nil map"),
            ValueError::NilSlice => write!(f, "access through nil slice"),
            ValueError::NilFunc => write!(f, "call of nil func"),
            ValueError::IndexOutOfRange { index, len } => {
                write!(f, "index out of range [{}] with length {}", index, len)
            }
            ValueError::UnhashableKey(kind) => {
                write!(f, "hash of unhashable type: {}", kind)
            }
            ValueError::SendOnClosedChannel => write!(f, "send on closed channel"),
            ValueError::SendOnNilChannel => write!(f, "send on nil channel"),
            ValueError::CloseOfClosedChannel => write!(f, "close of closed channel"),
            ValueError::CloseOfNilChannel => write!(f, "close of nil channel"),
            ValueError::ArgumentCount { expected, found } => {
                write!(f, "wrong argument count: expected {}, got {}", expected, found)
            }
            ValueError::ResultCount { expected, found } => {
                write!(f, "wrong result count: expected {}, got {}", expected, found)
            }
            ValueError::NotVariadic => write!(f, "call_slice of non-variadic func"),
            ValueError::NoSuchField(name) => write!(f, "no such field: {}", name),
            ValueError::FieldCount { expected, found } => {
                write!(f, "wrong field count: expected {}, got {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ValueError {}

pub type Result<T> = std::result::Result<T, ValueError>;
