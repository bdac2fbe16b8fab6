//! Record support for `reflect_record!`.
//!
//! The macro declares a struct and implements `Reflect` for it. Fields
//! declared `pub` are public and copied; every other field is private and
//! comes back from a deep copy at its zero value. A private field must
//! therefore have a type whose zero value lifts back: `Box<T>` does not.
//!
//! Types are structural, so a record cannot contain itself, not even
//! through a `Vec` or a pointer.

use deepcopy_engine::{FieldType, Record, StructType, Type, Value};

use crate::error::{BridgeError, Result};
use crate::reflect::Reflect;

/// Field declaration as seen by the macro. `vis` is the stringified
/// visibility token; only a bare `pub` makes a field public.
#[doc(hidden)]
pub fn field<T: Reflect>(name: &str, vis: &str) -> FieldType {
    if vis == "pub" {
        FieldType::public(name, T::reflect_type())
    } else {
        FieldType::private(name, T::reflect_type())
    }
}

#[doc(hidden)]
pub fn struct_type(ty: Type) -> StructType {
    match ty {
        Type::Struct(st) => st,
        other => panic!("record declared with non-struct type {}", other),
    }
}

#[doc(hidden)]
pub fn lower(ty: Type, fields: Vec<Value>) -> Value {
    let record = Record::new(struct_type(ty), fields)
        .unwrap_or_else(|e| panic!("lowering record failed: {}", e));
    Value::Struct(record)
}

/// Fields of a record being lifted, taken out by name.
#[doc(hidden)]
pub struct Fields {
    ty: StructType,
    values: Vec<Option<Value>>,
}

impl Fields {
    pub fn open<T: Reflect>(value: Value) -> Result<Self> {
        match value {
            Value::Struct(record) => {
                let ty = record.ty().clone();
                let values = record.into_fields().into_iter().map(Some).collect();
                Ok(Self { ty, values })
            }
            other => Err(crate::reflect::mismatch::<T>(&other)),
        }
    }

    pub fn take<T: Reflect>(&mut self, name: &str) -> Result<T> {
        let value = self
            .ty
            .field_index(name)
            .and_then(|idx| self.values[idx].take())
            .ok_or_else(|| BridgeError::MissingField(name.to_string()))?;
        T::from_value(value)
    }
}

/// Declare a struct that can be deep copied.
///
/// ```
/// deepcopy_bridge::reflect_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Account {
///         pub owner: String,
///         balance: i64,
///     }
/// }
///
/// let copy = deepcopy_bridge::deep_copy(Account { owner: "ann".into(), balance: 10 });
/// assert_eq!(copy.owner, "ann");
/// ```
#[macro_export]
macro_rules! reflect_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field : $fty,
            )*
        }

        impl $crate::Reflect for $name {
            fn reflect_type() -> $crate::deepcopy_engine::Type {
                $crate::deepcopy_engine::Type::Struct($crate::deepcopy_engine::StructType::new(
                    stringify!($name),
                    vec![$(
                        $crate::record::field::<$fty>(stringify!($field), stringify!($fvis)),
                    )*],
                ))
            }

            fn into_value(self) -> $crate::deepcopy_engine::Value {
                $crate::record::lower(
                    <Self as $crate::Reflect>::reflect_type(),
                    vec![$(
                        <$fty as $crate::Reflect>::into_value(self.$field),
                    )*],
                )
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(
                value: $crate::deepcopy_engine::Value,
            ) -> $crate::Result<Self> {
                let mut fields = $crate::record::Fields::open::<Self>(value)?;
                Ok($name {
                    $(
                        $field: fields.take::<$fty>(stringify!($field))?,
                    )*
                })
            }
        }
    };
}
