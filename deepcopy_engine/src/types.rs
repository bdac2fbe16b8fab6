//! Type descriptors.
//!
//! Pure data describing the static type of a value. A type knows its kind,
//! its zero value, and (for records) its fields and their visibility.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::Chan;
use crate::func::Func;
use crate::kind::{Kind, ScalarKind};
use crate::map::Map;
use crate::pointer::Pointer;
use crate::slice::Slice;
use crate::value::{Array, Interface, Record, Scalar, Value};

// ── Type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Scalar(ScalarKind),
    Interface(InterfaceType),
    Pointer { elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Slice { elem: Box<Type> },
    Array { elem: Box<Type>, len: usize },
    Struct(StructType),
    Chan { elem: Box<Type> },
    Func(Signature),
    /// Raw untyped address. Not supported by the copy engine.
    UnsafePointer,
}

impl Type {
    pub fn scalar(kind: ScalarKind) -> Self {
        Type::Scalar(kind)
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer { elem: Box::new(elem) }
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice { elem: Box::new(elem) }
    }

    pub fn array(elem: Type, len: usize) -> Self {
        Type::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn chan(elem: Type) -> Self {
        Type::Chan { elem: Box::new(elem) }
    }

    /// The empty interface, able to hold any value.
    pub fn any() -> Self {
        Type::Interface(InterfaceType::any())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Scalar(k) => Kind::Scalar(*k),
            Type::Interface(_) => Kind::Interface,
            Type::Pointer { .. } => Kind::Pointer,
            Type::Map { .. } => Kind::Map,
            Type::Slice { .. } => Kind::Slice,
            Type::Array { .. } => Kind::Array,
            Type::Struct(_) => Kind::Struct,
            Type::Chan { .. } => Kind::Chan,
            Type::Func(_) => Kind::Func,
            Type::UnsafePointer => Kind::UnsafePointer,
        }
    }

    /// Build the zero value of this type.
    ///
    /// Nil for pointer, map, slice, chan and func; an empty container for
    /// interfaces; element-wise zero for arrays and records.
    pub fn zero(&self) -> Value {
        match self {
            Type::Scalar(k) => Value::Scalar(Scalar::zero(*k)),
            Type::Interface(it) => Value::Interface(Interface::empty(it.clone())),
            Type::Pointer { elem } => Value::Pointer(Pointer::nil((**elem).clone())),
            Type::Map { key, value } => {
                Value::Map(Map::nil((**key).clone(), (**value).clone()))
            }
            Type::Slice { elem } => Value::Slice(Slice::nil((**elem).clone())),
            Type::Array { elem, len } => {
                let items = (0..*len).map(|_| elem.zero()).collect();
                Value::Array(Array::new((**elem).clone(), items))
            }
            Type::Struct(st) => Value::Struct(Record::zero(st.clone())),
            Type::Chan { elem } => Value::Chan(Chan::nil((**elem).clone())),
            Type::Func(sig) => Value::Func(Func::nil(sig.clone())),
            Type::UnsafePointer => Value::UnsafePointer(0),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(k) => write!(f, "{}", k),
            Type::Interface(it) => write!(f, "{}", it.name),
            Type::Pointer { elem } => write!(f, "*{}", elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Slice { elem } => write!(f, "[]{}", elem),
            Type::Array { elem, len } => write!(f, "[{}]{}", len, elem),
            Type::Struct(st) => write!(f, "{}", st.name),
            Type::Chan { elem } => write!(f, "chan {}", elem),
            Type::Func(sig) => write!(f, "{}", sig),
            Type::UnsafePointer => write!(f, "unsafe.Pointer"),
        }
    }
}

// ── Interface ──────────────────────────────────────────────────────

/// A declared capability set. Only the name is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
}

impl InterfaceType {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn any() -> Self {
        Self::named("any")
    }
}

// ── Records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Externally settable; copied by the engine.
    Public,
    /// Not externally settable; left at its zero value by the engine.
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldType {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
}

impl FieldType {
    pub fn public(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
            visibility: Visibility::Public,
        }
    }

    pub fn private(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
            visibility: Visibility::Private,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<FieldType>,
}

impl StructType {
    pub fn new(name: &str, fields: Vec<FieldType>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// ── Callables ──────────────────────────────────────────────────────

/// Parameter and result types of a callable.
///
/// When `variadic` is set the last parameter is a slice type and callers may
/// pass any number of trailing elements in its place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    /// Variadic signature; `rest` is the element type of the trailing slice.
    pub fn variadic(mut params: Vec<Type>, rest: Type, results: Vec<Type>) -> Self {
        params.push(Type::slice(rest));
        Self {
            params,
            results,
            variadic: true,
        }
    }

    /// Element type of the trailing variadic slice.
    pub fn variadic_elem(&self) -> Option<&Type> {
        if !self.variadic {
            return None;
        }
        match self.params.last() {
            Some(Type::Slice { elem }) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match (self.variadic && i == last, p) {
                (true, Type::Slice { elem }) => write!(f, "...{}", elem)?,
                _ => write!(f, "{}", p)?,
            }
        }
        write!(f, ")")?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.results[0]),
            _ => {
                write!(f, " (")?;
                for (i, r) in self.results.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", r)?;
                }
                write!(f, ")")
            }
        }
    }
}
