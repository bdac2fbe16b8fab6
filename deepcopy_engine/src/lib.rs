#![forbid(unsafe_code)]

//! Deep Copy Engine
//!
//! A type-tagged runtime value model and a structural recursion that
//! produces storage-independent copies of any value in it.
//!
//! The value model covers scalars, polymorphic containers, owning
//! references, keyed mappings, resizable and fixed sequences, records with
//! public and private fields, bounded channels and callables.

pub mod kind;
pub mod types;
pub mod value;
pub mod pointer;
pub mod map;
pub mod slice;
pub mod channel;
pub mod func;
pub mod error;
pub mod config;
pub mod engine;
pub mod equality;
pub mod hashing;

pub use channel::{Chan, Channel};
pub use config::{ConfigError, CopyOptions, ForwarderOptions};
pub use engine::{deep, Access, DeepCopier};
pub use equality::{aliases, deep_equal};
pub use error::{Result, ValueError};
pub use func::Func;
pub use hashing::{canonical_serialize, fingerprint};
pub use kind::{Kind, ScalarKind};
pub use map::{Map, MapKey};
pub use pointer::Pointer;
pub use slice::Slice;
pub use types::{FieldType, InterfaceType, Signature, StructType, Type, Visibility};
pub use value::{Array, Interface, Record, Scalar, Value};
