//! Keyed mappings.
//!
//! A `Map` shares its table between clones. Entries are indexed by a
//! `MapKey` derived from the key value; iteration order is unspecified.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Result, ValueError};
use crate::kind::{Kind, ScalarKind};
use crate::types::Type;
use crate::value::{Scalar, Value};

// ---------------------------------------------------------------------------
// Key equality
// ---------------------------------------------------------------------------

/// Hashable identity of a comparable value.
///
/// Scalars compare by kind and content, references by storage identity,
/// arrays and records by type and then element-wise. Nil references compare
/// by type. Interface keys use their dynamic value; a nil interface is the
/// same key as no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Invalid,
    Bool(bool),
    Signed(ScalarKind, i64),
    Unsigned(ScalarKind, u64),
    /// Float bit pattern; `-0.0` is folded into `0.0`.
    Float(ScalarKind, u64),
    Complex(ScalarKind, u64, u64),
    Str(String),
    Addr(Kind, usize),
    Nil(Type),
    Seq(Type, Vec<MapKey>),
}

fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl MapKey {
    pub fn of(value: &Value) -> Result<MapKey> {
        let key = match value {
            Value::Invalid => MapKey::Invalid,
            Value::Scalar(s) => Self::of_scalar(s),
            Value::Interface(i) => match i.held() {
                Some(held) => MapKey::of(held)?,
                None => MapKey::Invalid,
            },
            Value::Pointer(p) => match p.addr() {
                Some(addr) => MapKey::Addr(Kind::Pointer, addr),
                None => MapKey::Nil(Type::pointer(p.elem().clone())),
            },
            Value::Chan(c) => match c.channel() {
                Some(ch) => MapKey::Addr(Kind::Chan, ch.addr()),
                None => MapKey::Nil(Type::chan(c.elem().clone())),
            },
            Value::UnsafePointer(addr) => MapKey::Addr(Kind::UnsafePointer, *addr),
            Value::Array(a) => MapKey::Seq(
                Type::array(a.elem().clone(), a.len()),
                a.items().iter().map(MapKey::of).collect::<Result<Vec<_>>>()?,
            ),
            Value::Struct(r) => MapKey::Seq(
                Type::Struct(r.ty().clone()),
                r.fields().iter().map(MapKey::of).collect::<Result<Vec<_>>>()?,
            ),
            Value::Map(_) | Value::Slice(_) | Value::Func(_) => {
                return Err(ValueError::UnhashableKey(value.kind()))
            }
        };
        Ok(key)
    }

    fn of_scalar(s: &Scalar) -> MapKey {
        let kind = s.kind();
        match s {
            Scalar::Bool(b) => MapKey::Bool(*b),
            Scalar::Int(i) | Scalar::Int64(i) => MapKey::Signed(kind, *i),
            Scalar::Int8(i) => MapKey::Signed(kind, i64::from(*i)),
            Scalar::Int16(i) => MapKey::Signed(kind, i64::from(*i)),
            Scalar::Int32(i) => MapKey::Signed(kind, i64::from(*i)),
            Scalar::Uint(u) | Scalar::Uint64(u) => MapKey::Unsigned(kind, *u),
            Scalar::Uint8(u) => MapKey::Unsigned(kind, u64::from(*u)),
            Scalar::Uint16(u) => MapKey::Unsigned(kind, u64::from(*u)),
            Scalar::Uint32(u) => MapKey::Unsigned(kind, u64::from(*u)),
            Scalar::Uintptr(u) => MapKey::Unsigned(kind, *u as u64),
            Scalar::Float32(f) => MapKey::Float(kind, float_bits(f64::from(*f))),
            Scalar::Float64(f) => MapKey::Float(kind, float_bits(*f)),
            Scalar::Complex64(re, im) => {
                MapKey::Complex(kind, float_bits(f64::from(*re)), float_bits(f64::from(*im)))
            }
            Scalar::Complex128(re, im) => MapKey::Complex(kind, float_bits(*re), float_bits(*im)),
            Scalar::String(s) => MapKey::Str(s.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MapTable {
    entries: HashMap<MapKey, (Value, Value)>,
    hint: usize,
}

#[derive(Debug, Clone)]
pub struct Map {
    key: Type,
    value: Type,
    table: Option<Arc<RwLock<MapTable>>>,
}

impl Map {
    pub fn new(key: Type, value: Type) -> Self {
        Self::with_capacity(key, value, 0)
    }

    /// Empty map whose table is pre-sized for `hint` entries.
    pub fn with_capacity(key: Type, value: Type, hint: usize) -> Self {
        let table = MapTable {
            entries: HashMap::with_capacity(hint),
            hint,
        };
        Self {
            key,
            value,
            table: Some(Arc::new(RwLock::new(table))),
        }
    }

    pub fn nil(key: Type, value: Type) -> Self {
        Self {
            key,
            value,
            table: None,
        }
    }

    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn is_nil(&self) -> bool {
        self.table.is_none()
    }

    pub fn len(&self) -> usize {
        match &self.table {
            Some(t) => t.read().expect("map table poisoned").entries.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size hint the table was created with, `None` when nil.
    pub fn capacity_hint(&self) -> Option<usize> {
        self.table
            .as_ref()
            .map(|t| t.read().expect("map table poisoned").hint)
    }

    /// Insert or replace an entry. The key must be comparable.
    pub fn insert(&self, key: Value, value: Value) -> Result<()> {
        let table = self.table.as_ref().ok_or(ValueError::NilMap)?;
        let mk = MapKey::of(&key)?;
        table
            .write()
            .expect("map table poisoned")
            .entries
            .insert(mk, (key, value));
        Ok(())
    }

    /// Look up `key`. A nil map behaves as an empty one.
    pub fn get(&self, key: &Value) -> Result<Option<Value>> {
        let mk = MapKey::of(key)?;
        let Some(table) = &self.table else {
            return Ok(None);
        };
        let guard = table.read().expect("map table poisoned");
        Ok(guard.entries.get(&mk).map(|(_, v)| v.clone()))
    }

    pub fn remove(&self, key: &Value) -> Result<Option<Value>> {
        let mk = MapKey::of(key)?;
        let Some(table) = &self.table else {
            return Ok(None);
        };
        let mut guard = table.write().expect("map table poisoned");
        Ok(guard.entries.remove(&mk).map(|(_, v)| v))
    }

    /// Snapshot of all entries in unspecified order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        match &self.table {
            Some(t) => t
                .read()
                .expect("map table poisoned")
                .entries
                .values()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn same_table(&self, other: &Map) -> bool {
        match (&self.table, &other.table) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn addr(&self) -> Option<usize> {
        self.table.as_ref().map(|t| Arc::as_ptr(t) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::Pointer;

    fn string_int_map() -> Map {
        Map::new(Type::scalar(ScalarKind::String), Type::scalar(ScalarKind::Int))
    }

    #[test]
    fn test_insert_get_remove() {
        let m = string_int_map();
        m.insert(Value::string("foo"), Value::int(1)).unwrap();
        m.insert(Value::string("bar"), Value::int(2)).unwrap();
        m.insert(Value::string("foo"), Value::int(3)).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&Value::string("foo")).unwrap(), Some(Value::int(3)));
        assert_eq!(m.remove(&Value::string("bar")).unwrap(), Some(Value::int(2)));
        assert_eq!(m.get(&Value::string("bar")).unwrap(), None);
    }

    #[test]
    fn test_nil_map_reads_empty_and_rejects_writes() {
        let m = Map::nil(Type::scalar(ScalarKind::String), Type::scalar(ScalarKind::Int));
        assert_eq!(m.len(), 0);
        assert_eq!(m.get(&Value::string("x")).unwrap(), None);
        assert_eq!(m.capacity_hint(), None);
        assert_eq!(
            m.insert(Value::string("x"), Value::int(1)).unwrap_err(),
            ValueError::NilMap
        );
    }

    #[test]
    fn test_unhashable_key_rejected() {
        let m = Map::new(Type::any(), Type::scalar(ScalarKind::Int));
        let key = Value::Map(string_int_map());
        assert_eq!(
            m.insert(key, Value::int(1)).unwrap_err(),
            ValueError::UnhashableKey(Kind::Map)
        );
    }

    #[test]
    fn test_keys_distinguish_scalar_kinds() {
        let a = MapKey::of(&Value::int(1)).unwrap();
        let b = MapKey::of(&Value::Scalar(Scalar::Int8(1))).unwrap();
        assert_ne!(a, b);
        let z = MapKey::of(&Value::float64(0.0)).unwrap();
        let nz = MapKey::of(&Value::float64(-0.0)).unwrap();
        assert_eq!(z, nz);
    }

    #[test]
    fn test_record_keys_distinguish_types() {
        use crate::types::{FieldType, InterfaceType, StructType};
        use crate::value::{Interface, Record};

        let int = Type::scalar(ScalarKind::Int);
        let rec = |name: &str| {
            let ty = StructType::new(name, vec![FieldType::public("X", int.clone())]);
            let r = Record::new(ty, vec![Value::int(1)]).unwrap();
            Value::Interface(Interface::new(InterfaceType::any(), Value::Struct(r)))
        };
        let m = Map::new(Type::any(), int.clone());
        m.insert(rec("A"), Value::int(1)).unwrap();
        m.insert(rec("B"), Value::int(2)).unwrap();
        m.insert(rec("A"), Value::int(3)).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&rec("A")).unwrap(), Some(Value::int(3)));
        assert_eq!(m.get(&rec("B")).unwrap(), Some(Value::int(2)));

        let short = Value::Array(crate::value::Array::new(int.clone(), vec![]));
        let other = Value::Array(crate::value::Array::new(Type::scalar(ScalarKind::String), vec![]));
        assert_ne!(MapKey::of(&short).unwrap(), MapKey::of(&other).unwrap());
    }

    #[test]
    fn test_nil_keys_distinguish_types() {
        let int = Type::scalar(ScalarKind::Int);
        let string = Type::scalar(ScalarKind::String);
        let m = Map::new(Type::any(), int.clone());
        m.insert(Value::Pointer(Pointer::nil(int.clone())), Value::int(1)).unwrap();
        m.insert(Value::Pointer(Pointer::nil(string.clone())), Value::int(2)).unwrap();
        m.insert(Value::Pointer(Pointer::nil(int.clone())), Value::int(3)).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(
            m.get(&Value::Pointer(Pointer::nil(string))).unwrap(),
            Some(Value::int(2))
        );
        assert_ne!(
            MapKey::of(&Value::Pointer(Pointer::nil(int.clone()))).unwrap(),
            MapKey::of(&Value::Chan(crate::channel::Chan::nil(int))).unwrap()
        );
    }

    #[test]
    fn test_pointer_keys_use_identity() {
        let int = Type::scalar(ScalarKind::Int);
        let p = Pointer::new(int.clone(), Value::int(1));
        let q = Pointer::new(int, Value::int(1));
        assert_eq!(
            MapKey::of(&Value::Pointer(p.clone())).unwrap(),
            MapKey::of(&Value::Pointer(p)).unwrap()
        );
        assert_ne!(
            MapKey::of(&Value::Pointer(q.clone())).unwrap(),
            MapKey::of(&Value::int(1)).unwrap()
        );
    }

    #[test]
    fn test_clone_shares_table() {
        let m = string_int_map();
        let n = m.clone();
        n.insert(Value::string("k"), Value::int(9)).unwrap();
        assert_eq!(m.len(), 1);
        assert!(m.same_table(&n));
    }
}
