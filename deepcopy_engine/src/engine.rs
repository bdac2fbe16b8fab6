//! Deep copy engine.
//!
//! Structural recursion over `Value`, one handler per variant. The result is
//! structurally equal to the input and shares none of its storage.
//!
//! Degradations (never reported to the caller):
//!   - private record fields are left at their zero value
//!   - scalars read through a restricted path become zero
//!   - nil stays nil, of the same type
//!
//! Fatal: `Value::UnsafePointer` aborts with `unsupported type:`. Inside a
//! channel forwarder the abort ends only that forwarder thread; the copied
//! channel is closed as it unwinds.

use std::sync::Arc;
use std::thread;

use log::{debug, error, trace, warn};

use crate::channel::{Chan, Channel};
use crate::config::CopyOptions;
use crate::func::Func;
use crate::map::Map;
use crate::pointer::Pointer;
use crate::slice::Slice;
use crate::value::{Array, Interface, Record, Scalar, Value};

/// Whether scalars reached on the current path may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Readable,
    Restricted,
}

/// Deep copier. Holds no state between calls besides its options.
///
/// Copying a channel spawns one forwarder thread per channel. A forwarder
/// runs until its source channel is closed; if the source is never closed,
/// the forwarder never exits.
#[derive(Debug, Clone, Default)]
pub struct DeepCopier {
    options: Arc<CopyOptions>,
}

impl DeepCopier {
    pub fn new(options: CopyOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Deep copy `value`.
    pub fn copy(&self, value: &Value) -> Value {
        self.deep(value, Access::Readable)
    }

    /// Deep copy `value` as if it had been reached through a non-exported
    /// path: container shape is reproduced, every scalar becomes zero.
    pub fn copy_restricted(&self, value: &Value) -> Value {
        self.deep(value, Access::Restricted)
    }

    fn deep(&self, value: &Value, access: Access) -> Value {
        trace!("deep copy: {}", value.kind());
        match value {
            Value::Invalid => Value::Invalid,
            Value::Interface(iface) => Value::Interface(self.copy_interface(iface, access)),
            Value::Pointer(ptr) => Value::Pointer(self.copy_pointer(ptr, access)),
            Value::Map(map) => Value::Map(self.copy_map(map, access)),
            Value::Slice(slice) => Value::Slice(self.copy_slice(slice, access)),
            Value::Array(arr) => Value::Array(self.copy_array(arr, access)),
            Value::Struct(rec) => Value::Struct(self.copy_record(rec, access)),
            Value::Chan(chan) => Value::Chan(self.copy_chan(chan, access)),
            Value::Func(func) => Value::Func(copy_func(func)),
            Value::Scalar(s) => Value::Scalar(copy_scalar(s, access)),
            Value::UnsafePointer(addr) => {
                panic!("unsupported type: {} ({:#x})", value.kind(), addr)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn copy_interface(&self, iface: &Interface, access: Access) -> Interface {
        match iface.held() {
            None => Interface::empty(iface.ty().clone()),
            Some(held) => Interface::new(iface.ty().clone(), self.deep(held, access)),
        }
    }

    fn copy_pointer(&self, ptr: &Pointer, access: Access) -> Pointer {
        // Snapshot the referent so no lock is held while recursing.
        match ptr.load() {
            Err(_) => Pointer::nil(ptr.elem().clone()),
            Ok(referent) => Pointer::new(ptr.elem().clone(), self.deep(&referent, access)),
        }
    }

    fn copy_map(&self, map: &Map, access: Access) -> Map {
        if map.is_nil() {
            return Map::nil(map.key_type().clone(), map.value_type().clone());
        }
        let entries = map.entries();
        let copy = Map::with_capacity(
            map.key_type().clone(),
            map.value_type().clone(),
            entries.len(),
        );
        for (key, value) in &entries {
            copy.insert(self.deep(key, access), self.deep(value, access))
                .unwrap_or_else(|e| panic!("deep copy: re-inserting map entry failed: {}", e));
        }
        copy
    }

    fn copy_slice(&self, slice: &Slice, access: Access) -> Slice {
        if slice.is_nil() {
            return Slice::nil(slice.elem().clone());
        }
        let items = slice
            .to_vec()
            .iter()
            .map(|item| self.deep(item, access))
            .collect();
        Slice::with_items(slice.elem().clone(), items, slice.cap())
    }

    fn copy_array(&self, arr: &Array, access: Access) -> Array {
        let items = arr.items().iter().map(|item| self.deep(item, access)).collect();
        Array::new(arr.elem().clone(), items)
    }

    fn copy_record(&self, rec: &Record, access: Access) -> Record {
        let mut copy = Record::zero(rec.ty().clone());
        for (idx, field) in rec.ty().fields.iter().enumerate() {
            if !field.is_public() {
                continue;
            }
            let source = &rec.fields()[idx];
            copy.set_field_at(idx, self.deep(source, access))
                .unwrap_or_else(|e| panic!("deep copy: setting field {} failed: {}", field.name, e));
        }
        copy
    }

    fn copy_chan(&self, chan: &Chan, access: Access) -> Chan {
        let Some(source) = chan.channel() else {
            return Chan::nil(chan.elem().clone());
        };
        let dest = Channel::bounded(source.cap());
        self.spawn_forwarder(source.clone(), dest.clone(), access);
        Chan::from_channel(chan.elem().clone(), dest)
    }

    // -----------------------------------------------------------------------
    // Channel forwarding
    // -----------------------------------------------------------------------

    fn spawn_forwarder(&self, source: Channel, dest: Channel, access: Access) {
        let opts = &self.options.forwarder;
        let mut builder = thread::Builder::new().name(opts.thread_name.clone());
        if let Some(size) = opts.stack_size {
            builder = builder.stack_size(size);
        }
        let copier = self.clone();
        builder
            .spawn(move || copier.forward(source, dest, access))
            .unwrap_or_else(|err| panic!("failed to spawn channel forwarder: {}", err));
    }

    /// Drain `source` into `dest`, copying each item, until `source` closes.
    fn forward(&self, source: Channel, dest: Channel, access: Access) {
        debug!("forwarder started (cap={})", dest.cap());
        let _guard = CloseOnUnwind { dest: dest.clone() };
        let mut forwarded: u64 = 0;
        while let Some(item) = source.recv() {
            if let Err(err) = dest.send(self.deep(&item, access)) {
                warn!("forwarder stopped after {} items: {}", forwarded, err);
                return;
            }
            forwarded += 1;
        }
        if let Err(err) = dest.close() {
            warn!("forwarder could not close destination: {}", err);
            return;
        }
        debug!("forwarder closed destination after {} items", forwarded);
    }
}

/// Closes the destination when a forwarder unwinds, so receivers on the
/// copy observe a close instead of blocking forever. Items forwarded before
/// the failure stay readable.
struct CloseOnUnwind {
    dest: Channel,
}

impl Drop for CloseOnUnwind {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        error!("forwarder aborted while copying an item; closing destination");
        if self.dest.close().is_err() {
            warn!("forwarder destination already closed");
        }
    }
}

fn copy_func(func: &Func) -> Func {
    let sig = func.signature().clone();
    if func.is_nil() {
        return Func::nil(sig);
    }
    let original = func.clone();
    Func::new(sig, move |args| {
        let forwarded = if original.signature().variadic {
            original.call_slice(args)
        } else {
            original.call(args)
        };
        forwarded.unwrap_or_else(|e| panic!("forwarded call failed: {}", e))
    })
}

fn copy_scalar(s: &Scalar, access: Access) -> Scalar {
    match access {
        Access::Readable => s.clone(),
        Access::Restricted => Scalar::zero(s.kind()),
    }
}

/// Deep copy `value` with default options.
pub fn deep(value: &Value) -> Value {
    DeepCopier::default().copy(value)
}
