//! Runtime values.
//!
//! `Value` is a value annotated with its dynamic kind and type. Inline
//! variants (scalars, arrays, records) own their data; reference variants
//! (pointers, maps, slices, channels, callables) share their storage.
//!
//! `Clone` on a `Value` has assignment semantics: headers are duplicated,
//! shared storage stays shared. Only the engine produces independent copies.

use crate::channel::Chan;
use crate::equality::deep_equal;
use crate::error::{Result, ValueError};
use crate::func::Func;
use crate::kind::{Kind, ScalarKind};
use crate::map::Map;
use crate::pointer::Pointer;
use crate::slice::Slice;
use crate::types::{InterfaceType, StructType, Type};

// ── Scalars ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(u64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    /// Raw address held as an integer. Copies duplicate the address only.
    Uintptr(usize),
    Float32(f32),
    Float64(f64),
    Complex64(f32, f32),
    Complex128(f64, f64),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Int8(_) => ScalarKind::Int8,
            Scalar::Int16(_) => ScalarKind::Int16,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Uint(_) => ScalarKind::Uint,
            Scalar::Uint8(_) => ScalarKind::Uint8,
            Scalar::Uint16(_) => ScalarKind::Uint16,
            Scalar::Uint32(_) => ScalarKind::Uint32,
            Scalar::Uint64(_) => ScalarKind::Uint64,
            Scalar::Uintptr(_) => ScalarKind::Uintptr,
            Scalar::Float32(_) => ScalarKind::Float32,
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::Complex64(..) => ScalarKind::Complex64,
            Scalar::Complex128(..) => ScalarKind::Complex128,
            Scalar::String(_) => ScalarKind::String,
        }
    }

    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Scalar::Bool(false),
            ScalarKind::Int => Scalar::Int(0),
            ScalarKind::Int8 => Scalar::Int8(0),
            ScalarKind::Int16 => Scalar::Int16(0),
            ScalarKind::Int32 => Scalar::Int32(0),
            ScalarKind::Int64 => Scalar::Int64(0),
            ScalarKind::Uint => Scalar::Uint(0),
            ScalarKind::Uint8 => Scalar::Uint8(0),
            ScalarKind::Uint16 => Scalar::Uint16(0),
            ScalarKind::Uint32 => Scalar::Uint32(0),
            ScalarKind::Uint64 => Scalar::Uint64(0),
            ScalarKind::Uintptr => Scalar::Uintptr(0),
            ScalarKind::Float32 => Scalar::Float32(0.0),
            ScalarKind::Float64 => Scalar::Float64(0.0),
            ScalarKind::Complex64 => Scalar::Complex64(0.0, 0.0),
            ScalarKind::Complex128 => Scalar::Complex128(0.0, 0.0),
            ScalarKind::String => Scalar::String(String::new()),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Scalar::zero(self.kind())
    }
}

// ── Interface ──────────────────────────────────────────────────────

/// Polymorphic container: a declared interface type holding at most one
/// concrete value.
#[derive(Debug, Clone)]
pub struct Interface {
    ty: InterfaceType,
    held: Option<Box<Value>>,
}

impl Interface {
    pub fn empty(ty: InterfaceType) -> Self {
        Self { ty, held: None }
    }

    /// Wrap `value` as `ty`. Interfaces never hold interfaces: a held
    /// interface is unwrapped, and `Value::Invalid` yields an empty container.
    pub fn new(ty: InterfaceType, value: Value) -> Self {
        let held = match value {
            Value::Invalid => None,
            Value::Interface(inner) => inner.held,
            other => Some(Box::new(other)),
        };
        Self { ty, held }
    }

    pub fn ty(&self) -> &InterfaceType {
        &self.ty
    }

    pub fn held(&self) -> Option<&Value> {
        self.held.as_deref()
    }

    pub fn into_held(self) -> Option<Value> {
        self.held.map(|b| *b)
    }

    pub fn is_nil(&self) -> bool {
        self.held.is_none()
    }
}

// ── Array ──────────────────────────────────────────────────────────

/// Fixed-size sequence stored inline.
#[derive(Debug, Clone)]
pub struct Array {
    elem: Type,
    items: Vec<Value>,
}

impl Array {
    pub fn new(elem: Type, items: Vec<Value>) -> Self {
        Self { elem, items }
    }

    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.items.get(index).ok_or(ValueError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(ValueError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

// ── Record ─────────────────────────────────────────────────────────

/// Aggregate record: a struct type plus one value per declared field.
#[derive(Debug, Clone)]
pub struct Record {
    ty: StructType,
    fields: Vec<Value>,
}

impl Record {
    /// A record with every field at its zero value.
    pub fn zero(ty: StructType) -> Self {
        let fields = ty.fields.iter().map(|f| f.ty.zero()).collect();
        Self { ty, fields }
    }

    pub fn new(ty: StructType, fields: Vec<Value>) -> Result<Self> {
        if fields.len() != ty.fields.len() {
            return Err(ValueError::FieldCount {
                expected: ty.fields.len(),
                found: fields.len(),
            });
        }
        Ok(Self { ty, fields })
    }

    pub fn ty(&self) -> &StructType {
        &self.ty
    }

    pub fn field(&self, name: &str) -> Result<&Value> {
        let idx = self
            .ty
            .field_index(name)
            .ok_or_else(|| ValueError::NoSuchField(name.to_string()))?;
        Ok(&self.fields[idx])
    }

    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        let idx = self
            .ty
            .field_index(name)
            .ok_or_else(|| ValueError::NoSuchField(name.to_string()))?;
        self.fields[idx] = value;
        Ok(())
    }

    pub fn field_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn set_field_at(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.fields.len();
        let slot = self
            .fields
            .get_mut(index)
            .ok_or(ValueError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }
}

// ── Value ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value and no type: an interface slot that was never assigned.
    #[default]
    Invalid,
    Scalar(Scalar),
    Interface(Interface),
    Pointer(Pointer),
    Map(Map),
    Slice(Slice),
    Array(Array),
    Struct(Record),
    Chan(Chan),
    Func(Func),
    UnsafePointer(usize),
}

impl Value {
    pub fn bool(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }

    pub fn int(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }

    pub fn int64(i: i64) -> Self {
        Value::Scalar(Scalar::Int64(i))
    }

    pub fn uint(u: u64) -> Self {
        Value::Scalar(Scalar::Uint(u))
    }

    pub fn uintptr(addr: usize) -> Self {
        Value::Scalar(Scalar::Uintptr(addr))
    }

    pub fn float64(f: f64) -> Self {
        Value::Scalar(Scalar::Float64(f))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(s.into()))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Invalid => Kind::Invalid,
            Value::Scalar(s) => Kind::Scalar(s.kind()),
            Value::Interface(_) => Kind::Interface,
            Value::Pointer(_) => Kind::Pointer,
            Value::Map(_) => Kind::Map,
            Value::Slice(_) => Kind::Slice,
            Value::Array(_) => Kind::Array,
            Value::Struct(_) => Kind::Struct,
            Value::Chan(_) => Kind::Chan,
            Value::Func(_) => Kind::Func,
            Value::UnsafePointer(_) => Kind::UnsafePointer,
        }
    }

    /// Static type of the value. `None` only for `Value::Invalid`.
    pub fn ty(&self) -> Option<Type> {
        let ty = match self {
            Value::Invalid => return None,
            Value::Scalar(s) => Type::Scalar(s.kind()),
            Value::Interface(i) => Type::Interface(i.ty().clone()),
            Value::Pointer(p) => Type::pointer(p.elem().clone()),
            Value::Map(m) => Type::map(m.key_type().clone(), m.value_type().clone()),
            Value::Slice(s) => Type::slice(s.elem().clone()),
            Value::Array(a) => Type::array(a.elem().clone(), a.len()),
            Value::Struct(r) => Type::Struct(r.ty().clone()),
            Value::Chan(c) => Type::chan(c.elem().clone()),
            Value::Func(f) => Type::Func(f.signature().clone()),
            Value::UnsafePointer(_) => Type::UnsafePointer,
        };
        Some(ty)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Value::Invalid)
    }

    /// True for `Invalid`, empty interfaces, and nil pointers, maps, slices,
    /// channels and callables.
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Invalid => true,
            Value::Interface(i) => i.is_nil(),
            Value::Pointer(p) => p.is_nil(),
            Value::Map(m) => m.is_nil(),
            Value::Slice(s) => s.is_nil(),
            Value::Chan(c) => c.is_nil(),
            Value::Func(f) => f.is_nil(),
            Value::Scalar(_) | Value::Array(_) | Value::Struct(_) | Value::UnsafePointer(_) => false,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Any signed integer scalar, widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            Scalar::Int(i) | Scalar::Int64(i) => Some(*i),
            Scalar::Int8(i) => Some(i64::from(*i)),
            Scalar::Int16(i) => Some(i64::from(*i)),
            Scalar::Int32(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    /// Any unsigned integer scalar (including `uintptr`), widened to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self.as_scalar()? {
            Scalar::Uint(u) | Scalar::Uint64(u) => Some(*u),
            Scalar::Uint8(u) => Some(u64::from(*u)),
            Scalar::Uint16(u) => Some(u64::from(*u)),
            Scalar::Uint32(u) => Some(u64::from(*u)),
            Scalar::Uintptr(u) => Some(*u as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.as_scalar()? {
            Scalar::Float32(f) => Some(f64::from(*f)),
            Scalar::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match self {
            Value::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&Pointer> {
        match self {
            Value::Pointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&Slice> {
        match self {
            Value::Slice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Struct(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Struct(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_chan(&self) -> Option<&Chan> {
        match self {
            Value::Chan(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Func> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

/// Structural equality, see [`deep_equal`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}
