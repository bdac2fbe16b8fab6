#![forbid(unsafe_code)]

//! Deep Copy Bridge
//!
//! Deep copies ordinary Rust values by lowering them into the
//! `deepcopy_engine` value model, copying there, and lifting the result back.
//!
//! Types opt in through `Reflect`. The standard scalar, sequence, map and
//! boxed types are covered here; records are declared with `reflect_record!`.

pub mod error;
pub mod record;
pub mod reflect;

pub use deepcopy_engine;

pub use error::{BridgeError, Result};
pub use reflect::{Comparable, Complex128, Complex64, Reflect, Uintptr};

use deepcopy_engine::DeepCopier;
use log::trace;

/// Deep copy `value` with default options.
///
/// Private record fields come back at their zero value.
///
/// # Panics
///
/// When the value contains an unsupported kind, or when the copy cannot be
/// lifted back into `T`.
pub fn deep_copy<T: Reflect>(value: T) -> T {
    deep_copy_with(&DeepCopier::default(), value)
}

/// Deep copy `value` through `copier`.
pub fn deep_copy_with<T: Reflect>(copier: &DeepCopier, value: T) -> T {
    trace!("deep_copy::<{}>", std::any::type_name::<T>());
    let copied = copier.copy(&value.into_value());
    T::from_value(copied).unwrap_or_else(|err| {
        panic!(
            "deep copy of {} could not be lifted back: {}",
            std::any::type_name::<T>(),
            err
        )
    })
}
