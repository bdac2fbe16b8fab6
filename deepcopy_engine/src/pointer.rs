//! Owning references.
//!
//! A `Pointer` is an element type plus an optional storage cell. Clones of a
//! pointer share the cell; a nil pointer has none.

use std::sync::{Arc, RwLock};

use crate::error::{Result, ValueError};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Pointer {
    elem: Type,
    cell: Option<Arc<RwLock<Value>>>,
}

impl Pointer {
    /// Allocate a fresh cell holding `value`.
    pub fn new(elem: Type, value: Value) -> Self {
        Self {
            elem,
            cell: Some(Arc::new(RwLock::new(value))),
        }
    }

    pub fn nil(elem: Type) -> Self {
        Self { elem, cell: None }
    }

    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    /// Read the referent (assignment semantics: shared storage inside the
    /// referent stays shared).
    pub fn load(&self) -> Result<Value> {
        let cell = self.cell.as_ref().ok_or(ValueError::NilPointer)?;
        let guard = cell.read().expect("pointer cell poisoned");
        Ok(guard.clone())
    }

    pub fn store(&self, value: Value) -> Result<()> {
        let cell = self.cell.as_ref().ok_or(ValueError::NilPointer)?;
        *cell.write().expect("pointer cell poisoned") = value;
        Ok(())
    }

    /// Mutate the referent in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Result<R> {
        let cell = self.cell.as_ref().ok_or(ValueError::NilPointer)?;
        let mut guard = cell.write().expect("pointer cell poisoned");
        Ok(f(&mut guard))
    }

    /// Identity comparison. Two nil pointers are equal.
    pub fn ptr_eq(&self, other: &Pointer) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Address of the cell, `None` when nil.
    pub fn addr(&self) -> Option<usize> {
        self.cell.as_ref().map(|c| Arc::as_ptr(c) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ScalarKind;

    fn int() -> Type {
        Type::scalar(ScalarKind::Int)
    }

    #[test]
    fn test_clone_shares_cell() {
        let p = Pointer::new(int(), Value::int(1));
        let q = p.clone();
        q.store(Value::int(2)).unwrap();
        assert_eq!(p.load().unwrap(), Value::int(2));
        assert!(p.ptr_eq(&q));
    }

    #[test]
    fn test_nil_pointer_errors() {
        let p = Pointer::nil(int());
        assert!(p.is_nil());
        assert_eq!(p.addr(), None);
        assert_eq!(p.load().unwrap_err(), ValueError::NilPointer);
        assert_eq!(p.store(Value::int(1)).unwrap_err(), ValueError::NilPointer);
    }

    #[test]
    fn test_update_in_place() {
        let p = Pointer::new(int(), Value::int(4));
        let old = p
            .update(|v| std::mem::replace(v, Value::int(5)))
            .unwrap();
        assert_eq!(old, Value::int(4));
        assert_eq!(p.load().unwrap(), Value::int(5));
    }
}
