//! Structural equality and storage aliasing.
//!
//! `deep_equal` compares two values element by element:
//!   - types must match; nil and empty containers differ
//!   - pointers are equal when identical or when their referents are
//!   - channels are equal only when they are the same channel
//!   - callables are equal only when both are nil
//!   - NaN is unequal to itself
//!
//! `aliases` reports whether two values share any mutable storage.

use std::collections::HashSet;

use crate::kind::Kind;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut visited = HashSet::new();
    equal(a, b, &mut visited)
}

/// True when any pointer cell, map table, slice backing array or channel
/// reachable from `a` is also reachable from `b`.
pub fn aliases(a: &Value, b: &Value) -> bool {
    let mut left = HashSet::new();
    let mut right = HashSet::new();
    collect_storage(a, &mut left);
    collect_storage(b, &mut right);
    !left.is_disjoint(&right)
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Pairs of storage already under comparison; revisiting one is treated as
/// equal, which terminates on cyclic values.
type Visited = HashSet<(Kind, usize, usize)>;

fn equal(a: &Value, b: &Value, visited: &mut Visited) -> bool {
    match (a, b) {
        (Value::Invalid, Value::Invalid) => true,
        (Value::Scalar(x), Value::Scalar(y)) => x == y,
        (Value::Interface(x), Value::Interface(y)) => {
            x.ty() == y.ty()
                && match (x.held(), y.held()) {
                    (None, None) => true,
                    (Some(p), Some(q)) => equal(p, q, visited),
                    _ => false,
                }
        }
        (Value::Pointer(x), Value::Pointer(y)) => {
            if x.elem() != y.elem() {
                return false;
            }
            match (x.addr(), y.addr()) {
                (None, None) => true,
                (Some(pa), Some(pb)) => {
                    if pa == pb || !visited.insert((Kind::Pointer, pa, pb)) {
                        return true;
                    }
                    match (x.load(), y.load()) {
                        (Ok(p), Ok(q)) => equal(&p, &q, visited),
                        _ => false,
                    }
                }
                _ => false,
            }
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.key_type() != y.key_type() || x.value_type() != y.value_type() {
                return false;
            }
            match (x.addr(), y.addr()) {
                (None, None) => true,
                (Some(ma), Some(mb)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    if ma == mb || !visited.insert((Kind::Map, ma, mb)) {
                        return true;
                    }
                    x.entries().iter().all(|(k, v)| match y.get(k) {
                        Ok(Some(w)) => equal(v, &w, visited),
                        _ => false,
                    })
                }
                _ => false,
            }
        }
        (Value::Slice(x), Value::Slice(y)) => {
            if x.elem() != y.elem() {
                return false;
            }
            match (x.addr(), y.addr()) {
                (None, None) => true,
                (Some(sa), Some(sb)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    if sa == sb || !visited.insert((Kind::Slice, sa, sb)) {
                        return true;
                    }
                    let (xs, ys) = (x.to_vec(), y.to_vec());
                    xs.iter().zip(ys.iter()).all(|(p, q)| equal(p, q, visited))
                }
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.elem() == y.elem()
                && x.len() == y.len()
                && x.items()
                    .iter()
                    .zip(y.items())
                    .all(|(p, q)| equal(p, q, visited))
        }
        (Value::Struct(x), Value::Struct(y)) => {
            x.ty() == y.ty()
                && x.fields()
                    .iter()
                    .zip(y.fields())
                    .all(|(p, q)| equal(p, q, visited))
        }
        (Value::Chan(x), Value::Chan(y)) => x.elem() == y.elem() && x.same_channel(y),
        (Value::Func(x), Value::Func(y)) => {
            x.signature() == y.signature() && x.is_nil() && y.is_nil()
        }
        (Value::UnsafePointer(x), Value::UnsafePointer(y)) => x == y,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Aliasing
// ---------------------------------------------------------------------------

fn collect_storage(value: &Value, seen: &mut HashSet<usize>) {
    match value {
        Value::Invalid | Value::Scalar(_) | Value::Func(_) | Value::UnsafePointer(_) => {}
        Value::Interface(i) => {
            if let Some(held) = i.held() {
                collect_storage(held, seen);
            }
        }
        Value::Pointer(p) => {
            if let Some(addr) = p.addr() {
                if seen.insert(addr) {
                    if let Ok(referent) = p.load() {
                        collect_storage(&referent, seen);
                    }
                }
            }
        }
        Value::Map(m) => {
            if let Some(addr) = m.addr() {
                if seen.insert(addr) {
                    for (k, v) in m.entries() {
                        collect_storage(&k, seen);
                        collect_storage(&v, seen);
                    }
                }
            }
        }
        Value::Slice(s) => {
            if let Some(addr) = s.addr() {
                if seen.insert(addr) {
                    for item in s.to_vec() {
                        collect_storage(&item, seen);
                    }
                }
            }
        }
        Value::Array(a) => {
            for item in a.items() {
                collect_storage(item, seen);
            }
        }
        Value::Struct(r) => {
            for field in r.fields() {
                collect_storage(field, seen);
            }
        }
        Value::Chan(c) => {
            if let Some(ch) = c.channel() {
                seen.insert(ch.addr());
            }
        }
    }
}
