//! Canonical serialization and fingerprinting of values.
//!
//! Produces byte-identical output for structurally equal values.
//!
//! Rules:
//!   - every node is a JSON object whose first field is "kind"
//!   - pointers are serialized by referent content, not address
//!   - map entries sorted by their serialized key
//!   - record fields in declaration order, keyed by name
//!   - floats as their shortest round-trip decimal string
//!   - channels by capacity only; callables by signature and nil flag
//!   - UTF-8 JSON, no whitespace

use sha2::{Digest, Sha256};
use serde_json::{json, Map as JsonMap, Value as Json};

use crate::value::{Scalar, Value};

/// Canonical serialization of `value` to compact UTF-8 JSON bytes.
pub fn canonical_serialize(value: &Value) -> Vec<u8> {
    let canonical = build_canonical_value(value);
    serde_json::to_string(&canonical)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn fingerprint(value: &Value) -> String {
    let bytes = canonical_serialize(value);
    let digest = Sha256::digest(&bytes);
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

fn type_name(value: &Value) -> Json {
    match value.ty() {
        Some(ty) => Json::String(ty.to_string()),
        None => Json::Null,
    }
}

fn build_canonical_value(value: &Value) -> Json {
    let mut node = JsonMap::new();
    node.insert("kind".to_string(), Json::String(value.kind().to_string()));
    node.insert("type".to_string(), type_name(value));

    match value {
        Value::Invalid => {}
        Value::Scalar(s) => {
            node.insert("value".to_string(), scalar_json(s));
        }
        Value::Interface(i) => {
            let held = i.held().map(build_canonical_value).unwrap_or(Json::Null);
            node.insert("value".to_string(), held);
        }
        Value::Pointer(p) => {
            let referent = p
                .load()
                .map(|v| build_canonical_value(&v))
                .unwrap_or(Json::Null);
            node.insert("value".to_string(), referent);
        }
        Value::Map(m) => {
            let entries = if m.is_nil() {
                Json::Null
            } else {
                let mut pairs: Vec<(String, Json, Json)> = m
                    .entries()
                    .iter()
                    .map(|(k, v)| {
                        let key = build_canonical_value(k);
                        (key.to_string(), key, build_canonical_value(v))
                    })
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                Json::Array(pairs.into_iter().map(|(_, k, v)| json!([k, v])).collect())
            };
            node.insert("entries".to_string(), entries);
        }
        Value::Slice(s) => {
            if s.is_nil() {
                node.insert("items".to_string(), Json::Null);
            } else {
                node.insert("cap".to_string(), Json::from(s.cap()));
                let items = s.to_vec().iter().map(build_canonical_value).collect();
                node.insert("items".to_string(), Json::Array(items));
            }
        }
        Value::Array(a) => {
            let items = a.items().iter().map(build_canonical_value).collect();
            node.insert("items".to_string(), Json::Array(items));
        }
        Value::Struct(r) => {
            let mut fields = JsonMap::new();
            for (ft, fv) in r.ty().fields.iter().zip(r.fields()) {
                fields.insert(ft.name.clone(), build_canonical_value(fv));
            }
            node.insert("fields".to_string(), Json::Object(fields));
        }
        Value::Chan(c) => {
            node.insert("nil".to_string(), Json::Bool(c.is_nil()));
            node.insert("cap".to_string(), Json::from(c.cap()));
        }
        Value::Func(f) => {
            node.insert("nil".to_string(), Json::Bool(f.is_nil()));
        }
        Value::UnsafePointer(addr) => {
            node.insert("addr".to_string(), Json::from(*addr));
        }
    }

    Json::Object(node)
}

fn scalar_json(s: &Scalar) -> Json {
    match s {
        Scalar::Bool(b) => Json::Bool(*b),
        Scalar::Int(i) | Scalar::Int64(i) => Json::from(*i),
        Scalar::Int8(i) => Json::from(*i),
        Scalar::Int16(i) => Json::from(*i),
        Scalar::Int32(i) => Json::from(*i),
        Scalar::Uint(u) | Scalar::Uint64(u) => Json::from(*u),
        Scalar::Uint8(u) => Json::from(*u),
        Scalar::Uint16(u) => Json::from(*u),
        Scalar::Uint32(u) => Json::from(*u),
        Scalar::Uintptr(u) => Json::from(*u),
        // Floats as strings: JSON numbers cannot carry NaN or infinities.
        Scalar::Float32(f) => Json::String(f.to_string()),
        Scalar::Float64(f) => Json::String(f.to_string()),
        Scalar::Complex64(re, im) => json!([re.to_string(), im.to_string()]),
        Scalar::Complex128(re, im) => json!([re.to_string(), im.to_string()]),
        Scalar::String(s) => Json::String(s.clone()),
    }
}
