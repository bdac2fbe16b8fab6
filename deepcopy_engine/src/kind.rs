//! Value kinds: the closed set of dynamic value categories.
//!
//! Every `Value` and every `Type` reports exactly one `Kind`.
//! Kinds carry no data; they exist for diagnostics and error reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar kinds. Each one has a fixed zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint => "uint",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Uintptr => "uintptr",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Complex64 => "complex64",
            ScalarKind::Complex128 => "complex128",
            ScalarKind::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dynamic category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value and no type attached.
    Invalid,
    Scalar(ScalarKind),
    Interface,
    Pointer,
    Map,
    Slice,
    Array,
    Struct,
    Chan,
    Func,
    UnsafePointer,
}

impl Kind {
    /// True for the kinds whose values may be nil.
    pub fn is_nillable(self) -> bool {
        matches!(
            self,
            Kind::Interface | Kind::Pointer | Kind::Map | Kind::Slice | Kind::Chan | Kind::Func
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Invalid => f.write_str("invalid"),
            Kind::Scalar(s) => write!(f, "{}", s),
            Kind::Interface => f.write_str("interface"),
            Kind::Pointer => f.write_str("ptr"),
            Kind::Map => f.write_str("map"),
            Kind::Slice => f.write_str("slice"),
            Kind::Array => f.write_str("array"),
            Kind::Struct => f.write_str("struct"),
            Kind::Chan => f.write_str("chan"),
            Kind::Func => f.write_str("func"),
            Kind::UnsafePointer => f.write_str("unsafe pointer"),
        }
    }
}
