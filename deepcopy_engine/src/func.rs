//! Callables.
//!
//! A `Func` pairs a signature with an opaque body. The body always receives
//! the packed argument list: one value per declared parameter, with any
//! trailing variadic arguments gathered into a slice.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ValueError};
use crate::slice::Slice;
use crate::types::{Signature, Type};
use crate::value::Value;

pub type FuncBody = dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync;

#[derive(Clone)]
pub struct Func {
    sig: Signature,
    body: Option<Arc<FuncBody>>,
}

impl Func {
    pub fn new<F>(sig: Signature, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        Self {
            sig,
            body: Some(Arc::new(body)),
        }
    }

    pub fn nil(sig: Signature) -> Self {
        Self { sig, body: None }
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    pub fn is_nil(&self) -> bool {
        self.body.is_none()
    }

    /// Call with unpacked arguments.
    ///
    /// For variadic signatures every argument past the fixed parameters is
    /// gathered into the trailing slice.
    pub fn call(&self, mut args: Vec<Value>) -> Result<Vec<Value>> {
        let body = self.body.as_ref().ok_or(ValueError::NilFunc)?;
        let packed = if self.sig.variadic {
            let fixed = self.sig.params.len().saturating_sub(1);
            if args.len() < fixed {
                return Err(ValueError::ArgumentCount {
                    expected: fixed,
                    found: args.len(),
                });
            }
            let rest = args.split_off(fixed);
            let elem = self.sig.variadic_elem().cloned().unwrap_or_else(Type::any);
            args.push(Value::Slice(Slice::from_values(elem, rest)));
            args
        } else {
            if args.len() != self.sig.params.len() {
                return Err(ValueError::ArgumentCount {
                    expected: self.sig.params.len(),
                    found: args.len(),
                });
            }
            args
        };
        self.invoke(body, packed)
    }

    /// Call a variadic func whose last argument is already the packed slice.
    pub fn call_slice(&self, args: Vec<Value>) -> Result<Vec<Value>> {
        let body = self.body.as_ref().ok_or(ValueError::NilFunc)?;
        if !self.sig.variadic {
            return Err(ValueError::NotVariadic);
        }
        if args.len() != self.sig.params.len() {
            return Err(ValueError::ArgumentCount {
                expected: self.sig.params.len(),
                found: args.len(),
            });
        }
        self.invoke(body, args)
    }

    fn invoke(&self, body: &Arc<FuncBody>, args: Vec<Value>) -> Result<Vec<Value>> {
        let results = body(args);
        if results.len() != self.sig.results.len() {
            return Err(ValueError::ResultCount {
                expected: self.sig.results.len(),
                found: results.len(),
            });
        }
        Ok(results)
    }

    pub fn addr(&self) -> Option<usize> {
        self.body.as_ref().map(|b| Arc::as_ptr(b) as *const () as usize)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("sig", &self.sig.to_string())
            .field("nil", &self.is_nil())
            .finish()
    }
}
