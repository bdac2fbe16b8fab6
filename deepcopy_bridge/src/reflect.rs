//! Lowering Rust values into the engine's value model and lifting them back.
//!
//! Mapping:
//!   - `bool`, integers, floats and `String` are scalars
//!   - `isize`/`usize` are the platform `int`/`uint`
//!   - `Complex64`, `Complex128` and `Uintptr` wrap the scalars with no
//!     native Rust counterpart
//!   - `Vec<T>` is a slice; its capacity is carried across
//!   - `[T; N]` is an array
//!   - `Option<Box<T>>` is a nillable pointer, `Box<T>` a non-nil one
//!   - `HashMap<K, V>` is a map
//!   - `Value` is the empty interface; `Value::Invalid` is the nil interface

use std::collections::HashMap;
use std::hash::Hash;

use deepcopy_engine::{
    Array, Interface, InterfaceType, Map, Pointer, Scalar, ScalarKind, Slice, Type, Value,
};

use crate::error::{BridgeError, Result};

/// A Rust type with a representation in the value model.
pub trait Reflect: Sized + 'static {
    /// Static type of every value produced by `into_value`.
    fn reflect_type() -> Type;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

/// Types usable as map keys: their lowered form is always hashable.
pub trait Comparable: Reflect + Eq + Hash {}

pub(crate) fn mismatch<T: Reflect>(found: &Value) -> BridgeError {
    BridgeError::KindMismatch {
        expected: T::reflect_type().kind(),
        found: found.kind(),
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! reflect_scalar {
    ($($ty:ty => $variant:ident($repr:ty)),* $(,)?) => {$(
        impl Reflect for $ty {
            fn reflect_type() -> Type {
                Type::scalar(ScalarKind::$variant)
            }

            fn into_value(self) -> Value {
                Value::Scalar(Scalar::$variant(self as $repr))
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Scalar(Scalar::$variant(v)) => Ok(v as $ty),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    )*};
}

reflect_scalar! {
    isize => Int(i64),
    i8 => Int8(i8),
    i16 => Int16(i16),
    i32 => Int32(i32),
    i64 => Int64(i64),
    usize => Uint(u64),
    u8 => Uint8(u8),
    u16 => Uint16(u16),
    u32 => Uint32(u32),
    u64 => Uint64(u64),
    f32 => Float32(f32),
    f64 => Float64(f64),
}

impl Reflect for bool {
    fn reflect_type() -> Type {
        Type::scalar(ScalarKind::Bool)
    }

    fn into_value(self) -> Value {
        Value::bool(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(Scalar::Bool(b)) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::scalar(ScalarKind::String)
    }

    fn into_value(self) -> Value {
        Value::string(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(Scalar::String(s)) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// Complex number with `f32` parts, lowered to a `complex64` scalar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex64 {
    pub re: f32,
    pub im: f32,
}

/// Complex number with `f64` parts, lowered to a `complex128` scalar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex128 {
    pub re: f64,
    pub im: f64,
}

/// Raw address held as an integer, lowered to a `uintptr` scalar.
/// Copies duplicate the address only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uintptr(pub usize);

impl Reflect for Complex64 {
    fn reflect_type() -> Type {
        Type::scalar(ScalarKind::Complex64)
    }

    fn into_value(self) -> Value {
        Value::Scalar(Scalar::Complex64(self.re, self.im))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(Scalar::Complex64(re, im)) => Ok(Complex64 { re, im }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Reflect for Complex128 {
    fn reflect_type() -> Type {
        Type::scalar(ScalarKind::Complex128)
    }

    fn into_value(self) -> Value {
        Value::Scalar(Scalar::Complex128(self.re, self.im))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(Scalar::Complex128(re, im)) => Ok(Complex128 { re, im }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Reflect for Uintptr {
    fn reflect_type() -> Type {
        Type::scalar(ScalarKind::Uintptr)
    }

    fn into_value(self) -> Value {
        Value::uintptr(self.0)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(Scalar::Uintptr(addr)) => Ok(Uintptr(addr)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Comparable for Uintptr {}
impl Comparable for bool {}
impl Comparable for String {}
impl Comparable for isize {}
impl Comparable for i8 {}
impl Comparable for i16 {}
impl Comparable for i32 {}
impl Comparable for i64 {}
impl Comparable for usize {}
impl Comparable for u8 {}
impl Comparable for u16 {}
impl Comparable for u32 {}
impl Comparable for u64 {}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::slice(T::reflect_type())
    }

    fn into_value(self) -> Value {
        // Zero-sized element types report an unbounded capacity.
        let cap = if std::mem::size_of::<T>() == 0 {
            self.len()
        } else {
            self.capacity()
        };
        let items = self.into_iter().map(Reflect::into_value).collect();
        Value::Slice(Slice::with_items(T::reflect_type(), items, cap))
    }

    fn from_value(value: Value) -> Result<Self> {
        let slice = match value {
            Value::Slice(s) => s,
            other => return Err(mismatch::<Self>(&other)),
        };
        let mut out: Vec<T> = Vec::new();
        if out.try_reserve_exact(slice.cap()).is_err() {
            out.reserve_exact(slice.len());
        }
        for item in slice.to_vec() {
            out.push(T::from_value(item)?);
        }
        Ok(out)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::array(T::reflect_type(), N)
    }

    fn into_value(self) -> Value {
        let items = self.into_iter().map(Reflect::into_value).collect();
        Value::Array(Array::new(T::reflect_type(), items))
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(a) => a.into_items(),
            other => return Err(mismatch::<Self>(&other)),
        };
        if items.len() != N {
            return Err(BridgeError::LengthMismatch {
                expected: N,
                found: items.len(),
            });
        }
        let lifted = items
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>>>()?;
        lifted.try_into().map_err(|rest: Vec<T>| BridgeError::LengthMismatch {
            expected: N,
            found: rest.len(),
        })
    }
}

impl<T: Comparable, const N: usize> Comparable for [T; N] {}

// ---------------------------------------------------------------------------
// Pointers
// ---------------------------------------------------------------------------

impl<T: Reflect> Reflect for Option<Box<T>> {
    fn reflect_type() -> Type {
        Type::pointer(T::reflect_type())
    }

    fn into_value(self) -> Value {
        let ptr = match self {
            None => Pointer::nil(T::reflect_type()),
            Some(boxed) => Pointer::new(T::reflect_type(), (*boxed).into_value()),
        };
        Value::Pointer(ptr)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Pointer(p) if p.is_nil() => Ok(None),
            Value::Pointer(p) => Ok(Some(Box::new(T::from_value(p.load()?)?))),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect_type() -> Type {
        Type::pointer(T::reflect_type())
    }

    fn into_value(self) -> Value {
        Value::Pointer(Pointer::new(T::reflect_type(), (*self).into_value()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Pointer(p) if p.is_nil() => Err(BridgeError::NilPointer),
            Value::Pointer(p) => Ok(Box::new(T::from_value(p.load()?)?)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

impl<K: Comparable, V: Reflect> Reflect for HashMap<K, V> {
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn into_value(self) -> Value {
        let map = Map::with_capacity(K::reflect_type(), V::reflect_type(), self.len());
        for (k, v) in self {
            map.insert(k.into_value(), v.into_value())
                .unwrap_or_else(|e| panic!("lowering map entry failed: {}", e));
        }
        Value::Map(map)
    }

    fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Map(m) => m,
            other => return Err(mismatch::<Self>(&other)),
        };
        let entries = map.entries();
        let mut out = HashMap::with_capacity(map.capacity_hint().unwrap_or(entries.len()));
        for (k, v) in entries {
            out.insert(K::from_value(k)?, V::from_value(v)?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Dynamic values
// ---------------------------------------------------------------------------

impl Reflect for Value {
    fn reflect_type() -> Type {
        Type::any()
    }

    fn into_value(self) -> Value {
        Value::Interface(Interface::new(InterfaceType::any(), self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Interface(iface) => Ok(iface.into_held().unwrap_or(Value::Invalid)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}
