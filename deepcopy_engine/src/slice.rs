//! Resizable sequences.
//!
//! A slice is a header (`len`, `cap`) over a shared backing array. Only the
//! first `len` slots are visible through the header. Appending within
//! capacity writes into the shared backing array; appending past it moves the
//! result onto a new, larger backing array.
//!
//! Capacity is a bound, not an allocation: the backing array holds only the
//! slots some header has made visible, never more than `cap`.

use std::sync::{Arc, RwLock};

use crate::error::{Result, ValueError};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Slice {
    elem: Type,
    backing: Option<Arc<RwLock<Vec<Value>>>>,
    len: usize,
    cap: usize,
}

impl Slice {
    /// `len` zero-valued elements with room for `cap`.
    ///
    /// Panics if `len > cap`.
    pub fn with_capacity(elem: Type, len: usize, cap: usize) -> Self {
        let items = (0..len).map(|_| elem.zero()).collect();
        Self::with_items(elem, items, cap)
    }

    /// Slice whose visible elements are `items`, with room for `cap`.
    ///
    /// Panics if `items.len() > cap`.
    pub fn with_items(elem: Type, items: Vec<Value>, cap: usize) -> Self {
        let len = items.len();
        if len > cap {
            panic!("slice: len {} larger than cap {}", len, cap);
        }
        Self {
            elem,
            backing: Some(Arc::new(RwLock::new(items))),
            len,
            cap,
        }
    }

    /// Slice with `len == cap == values.len()`.
    pub fn from_values(elem: Type, values: Vec<Value>) -> Self {
        let cap = values.len();
        Self::with_items(elem, values, cap)
    }

    pub fn nil(elem: Type) -> Self {
        Self {
            elem,
            backing: None,
            len: 0,
            cap: 0,
        }
    }

    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn is_nil(&self) -> bool {
        self.backing.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn get(&self, index: usize) -> Result<Value> {
        let backing = self.checked(index)?;
        let guard = backing.read().expect("slice backing poisoned");
        Ok(guard[index].clone())
    }

    /// Write into the shared backing array; visible through every header
    /// that shares it.
    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let backing = self.checked(index)?;
        backing.write().expect("slice backing poisoned")[index] = value;
        Ok(())
    }

    fn checked(&self, index: usize) -> Result<&Arc<RwLock<Vec<Value>>>> {
        let backing = self.backing.as_ref().ok_or(ValueError::NilSlice)?;
        if index >= self.len {
            return Err(ValueError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(backing)
    }

    /// Append one element and return the new header.
    ///
    /// Within capacity the element lands in the shared backing array.
    /// Otherwise a new backing array with doubled capacity is allocated.
    pub fn append(&self, value: Value) -> Slice {
        if let Some(backing) = &self.backing {
            if self.len < self.cap {
                let mut items = backing.write().expect("slice backing poisoned");
                if self.len < items.len() {
                    items[self.len] = value;
                } else {
                    items.push(value);
                }
                drop(items);
                return Slice {
                    elem: self.elem.clone(),
                    backing: Some(Arc::clone(backing)),
                    len: self.len + 1,
                    cap: self.cap,
                };
            }
        }
        let new_cap = if self.cap == 0 { 1 } else { self.cap.saturating_mul(2) };
        let mut items = self.to_vec();
        items.push(value);
        Slice::with_items(self.elem.clone(), items, new_cap)
    }

    /// Snapshot of the visible elements.
    pub fn to_vec(&self) -> Vec<Value> {
        match &self.backing {
            Some(b) => b.read().expect("slice backing poisoned")[..self.len].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn same_backing(&self, other: &Slice) -> bool {
        match (&self.backing, &other.backing) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn addr(&self) -> Option<usize> {
        self.backing.as_ref().map(|b| Arc::as_ptr(b) as *const () as usize)
    }
}
