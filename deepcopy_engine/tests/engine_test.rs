//! Integration tests for deepcopy_engine.
//!
//! Every test builds a value, copies it, and checks equality of content
//! plus independence of storage.

use deepcopy_engine::{
    aliases, deep, deep_equal, fingerprint, Chan, DeepCopier, FieldType, Func, Interface,
    InterfaceType, Map, Pointer, Record, Scalar, ScalarKind, Signature, Slice, StructType, Type,
    Value,
};

fn init_logging() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}

fn int() -> Type {
    Type::scalar(ScalarKind::Int)
}

fn string() -> Type {
    Type::scalar(ScalarKind::String)
}

fn assert_copy_equal(original: &Value) -> Value {
    let copy = deep(original);
    assert!(
        deep_equal(&copy, original),
        "copy differs from original: {:?} vs {:?}",
        copy,
        original
    );
    assert!(!aliases(&copy, original), "copy shares storage with original");
    copy
}

// ─────────────────────────────────────────────────────────────
// Scalars
// ─────────────────────────────────────────────────────────────

#[test]
fn scalars_copy_to_equal_values() {
    let scalars = vec![
        Scalar::Bool(true),
        Scalar::Int(1),
        Scalar::Int8(i8::MAX),
        Scalar::Int16(i16::MAX),
        Scalar::Int32(i32::MAX),
        Scalar::Int64(i64::MAX),
        Scalar::Uint(1),
        Scalar::Uint8(u8::MAX),
        Scalar::Uint16(u16::MAX),
        Scalar::Uint32(u32::MAX),
        Scalar::Uint64(u64::MAX),
        Scalar::Float32(1.0),
        Scalar::Float64(1.0),
        Scalar::Complex64(1.0, 0.0),
        Scalar::Complex128(1.0, 0.0),
        Scalar::String("foo".to_string()),
    ];
    for s in scalars {
        let original = Value::Scalar(s);
        let copy = deep(&original);
        assert_eq!(copy, original);
        assert_eq!(copy.ty(), original.ty());
    }
}

#[test]
fn uintptr_is_copied_as_plain_number() {
    let original = Value::uintptr(0xdead_beef);
    assert_eq!(deep(&original).as_u64(), Some(0xdead_beef));
}

#[test]
fn pointers_to_scalars_get_fresh_cells() {
    for kind in [ScalarKind::Bool, ScalarKind::Int32, ScalarKind::Float64, ScalarKind::String] {
        let ty = Type::scalar(kind);
        let p = Pointer::new(ty.clone(), ty.zero());
        let copy = assert_copy_equal(&Value::Pointer(p.clone()));
        assert!(!copy.as_pointer().unwrap().ptr_eq(&p));
    }
}

// ─────────────────────────────────────────────────────────────
// Nil and absent values
// ─────────────────────────────────────────────────────────────

#[test]
fn nil_values_stay_nil_with_same_type() {
    let nils = vec![
        Value::Pointer(Pointer::nil(int())),
        Value::Map(Map::nil(string(), int())),
        Value::Slice(Slice::nil(int())),
        Value::Chan(Chan::nil(int())),
        Value::Func(Func::nil(Signature::new(vec![int()], vec![string()]))),
        Value::Interface(Interface::empty(InterfaceType::named("Stringer"))),
    ];
    for original in nils {
        let copy = deep(&original);
        assert!(copy.is_nil(), "{} copy is not nil", original.kind());
        assert_eq!(copy.ty(), original.ty());
    }
}

#[test]
fn absent_value_stays_absent() {
    let copy = deep(&Value::Invalid);
    assert!(!copy.is_valid());
    assert_eq!(copy.ty(), None);
}

#[test]
fn record_with_empty_interface_field_keeps_it_empty() {
    let ty = StructType::new("Holder", vec![FieldType::public("Value", Type::any())]);
    let copy = deep(&Value::Struct(Record::zero(ty)));
    let field = copy.as_record().unwrap().field("Value").unwrap().clone();
    assert!(field.as_interface().unwrap().is_nil());
}

// ─────────────────────────────────────────────────────────────
// Interfaces
// ─────────────────────────────────────────────────────────────

#[test]
fn pointer_to_interface_is_copied_through() {
    let stringer = InterfaceType::named("Stringer");
    let iface = Value::Interface(Interface::new(stringer.clone(), Value::string("test")));
    let p = Pointer::new(Type::Interface(stringer.clone()), iface);
    let copy = assert_copy_equal(&Value::Pointer(p));
    let inner = copy.as_pointer().unwrap().load().unwrap();
    let held = inner.as_interface().unwrap();
    assert_eq!(held.ty(), &stringer);
    assert_eq!(held.held().and_then(Value::as_str), Some("test"));
}

#[test]
fn interface_holding_pointer_gets_new_pointer() {
    let p = Pointer::new(int(), Value::int(9));
    let original = Value::Interface(Interface::new(InterfaceType::any(), Value::Pointer(p.clone())));
    let copy = assert_copy_equal(&original);
    let held = copy.as_interface().unwrap().held().unwrap().as_pointer().unwrap().clone();
    held.store(Value::int(10)).unwrap();
    assert_eq!(p.load().unwrap(), Value::int(9));
}

// ─────────────────────────────────────────────────────────────
// Maps
// ─────────────────────────────────────────────────────────────

#[test]
fn maps_copy_entries() {
    let empty = Map::new(string(), int());
    assert_copy_equal(&Value::Map(empty));

    let m = Map::new(string(), int());
    m.insert(Value::string("foo"), Value::int(1)).unwrap();
    m.insert(Value::string("bar"), Value::int(2)).unwrap();
    let copy = assert_copy_equal(&Value::Map(m.clone()));
    let c = copy.as_map().unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.capacity_hint(), Some(2));

    c.insert(Value::string("foo"), Value::int(100)).unwrap();
    assert_eq!(m.get(&Value::string("foo")).unwrap(), Some(Value::int(1)));
}

#[test]
fn map_values_with_slices_are_independent() {
    let m = Map::new(string(), Type::slice(int()));
    let inner = Slice::from_values(int(), vec![Value::int(1), Value::int(2)]);
    m.insert(Value::string("xs"), Value::Slice(inner.clone())).unwrap();
    let copy = assert_copy_equal(&Value::Map(m));
    let copied_inner = copy
        .as_map()
        .unwrap()
        .get(&Value::string("xs"))
        .unwrap()
        .unwrap();
    copied_inner.as_slice().unwrap().set(0, Value::int(42)).unwrap();
    assert_eq!(inner.get(0).unwrap(), Value::int(1));
}

#[test]
fn pointer_to_map_copies_both_levels() {
    let m = Map::new(string(), int());
    m.insert(Value::string("a"), Value::int(1)).unwrap();
    let p = Pointer::new(Type::map(string(), int()), Value::Map(m));
    assert_copy_equal(&Value::Pointer(p));
}

// ─────────────────────────────────────────────────────────────
// Slices and arrays
// ─────────────────────────────────────────────────────────────

#[test]
fn slices_keep_length_and_capacity() {
    let cases = vec![
        Slice::from_values(int(), vec![]),
        Slice::from_values(int(), vec![Value::int(1), Value::int(2), Value::int(3)]),
        Slice::with_items(int(), vec![Value::int(1)], 10),
        Slice::with_capacity(int(), 0, 4),
    ];
    for s in cases {
        let copy = assert_copy_equal(&Value::Slice(s.clone()));
        let c = copy.as_slice().unwrap();
        assert_eq!(c.len(), s.len());
        assert_eq!(c.cap(), s.cap());
    }
}

#[test]
fn appending_to_copy_within_capacity_does_not_touch_original() {
    let s = Slice::with_items(int(), vec![Value::int(1)], 4);
    let copy = deep(&Value::Slice(s.clone()));
    let grown = copy.as_slice().unwrap().append(Value::int(2));
    assert_eq!(grown.len(), 2);
    let visible_again = s.append(Value::int(7));
    assert_eq!(visible_again.get(1).unwrap(), Value::int(7));
    assert_eq!(grown.get(1).unwrap(), Value::int(2));
}

#[test]
fn arrays_copy_by_position() {
    let zero = Type::array(int(), 3).zero();
    assert_copy_equal(&zero);

    let arr = deepcopy_engine::Array::new(int(), vec![Value::int(1), Value::int(2), Value::int(3)]);
    let copy = assert_copy_equal(&Value::Array(arr));
    assert_eq!(copy.as_array().unwrap().len(), 3);
}

#[test]
fn array_of_pointers_gets_new_pointers() {
    let p = Pointer::new(int(), Value::int(1));
    let arr = deepcopy_engine::Array::new(Type::pointer(int()), vec![Value::Pointer(p.clone())]);
    let copy = assert_copy_equal(&Value::Array(arr));
    let q = copy.as_array().unwrap().get(0).unwrap().as_pointer().unwrap().clone();
    q.store(Value::int(2)).unwrap();
    assert_eq!(p.load().unwrap(), Value::int(1));
}

// ─────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────

fn foo_type() -> StructType {
    StructType::new("Foo", vec![FieldType::public("Value", int())])
}

#[test]
fn records_copy_public_fields() {
    assert_copy_equal(&Value::Struct(Record::zero(foo_type())));
    let rec = Record::new(foo_type(), vec![Value::int(42)]).unwrap();
    let copy = assert_copy_equal(&Value::Struct(rec));
    assert_eq!(copy.as_record().unwrap().field("Value").unwrap(), &Value::int(42));
}

#[test]
fn pointer_to_record_is_independent() {
    let rec = Record::new(foo_type(), vec![Value::int(42)]).unwrap();
    let p = Pointer::new(Type::Struct(foo_type()), Value::Struct(rec));
    let copy = assert_copy_equal(&Value::Pointer(p.clone()));
    copy.as_pointer()
        .unwrap()
        .update(|v| v.as_record_mut().unwrap().set_field("Value", Value::int(0)))
        .unwrap()
        .unwrap();
    let original = p.load().unwrap();
    assert_eq!(original.as_record().unwrap().field("Value").unwrap(), &Value::int(42));
}

#[test]
fn private_fields_are_zeroed() {
    let ty = StructType::new(
        "Foo",
        vec![
            FieldType::private("value", int()),
            FieldType::private("names", Type::slice(string())),
            FieldType::public("Label", string()),
        ],
    );
    let rec = Record::new(
        ty,
        vec![
            Value::int(42),
            Value::Slice(Slice::from_values(string(), vec![Value::string("x")])),
            Value::string("kept"),
        ],
    )
    .unwrap();
    let copy = deep(&Value::Struct(rec));
    let c = copy.as_record().unwrap();
    assert_eq!(c.field("value").unwrap(), &Value::int(0));
    assert!(c.field("names").unwrap().is_nil());
    assert_eq!(c.field("Label").unwrap(), &Value::string("kept"));
}

// ─────────────────────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────────────────────

#[test]
fn closed_channel_is_forwarded_in_order_then_closed() {
    init_logging();
    let ch = Chan::new(int(), 3);
    for i in 1..=3 {
        ch.send(Value::int(i)).unwrap();
    }
    ch.close().unwrap();

    let copy = deep(&Value::Chan(ch.clone()));
    let c = copy.as_chan().unwrap();
    assert_eq!(c.cap(), 3);
    assert!(!c.same_channel(&ch));

    let mut received = Vec::new();
    while let Some(v) = c.recv() {
        received.push(v.as_i64().unwrap());
    }
    assert_eq!(received, vec![1, 2, 3]);
    assert!(c.channel().unwrap().is_closed());
}

#[test]
fn channel_copy_is_usable_before_source_closes() {
    init_logging();
    let ch = Chan::new(string(), 0);
    let copy = deep(&Value::Chan(ch.clone()));
    let c = copy.as_chan().unwrap().clone();

    let producer = std::thread::spawn(move || {
        ch.send(Value::string("late")).unwrap();
        ch.close().unwrap();
    });
    assert_eq!(c.recv(), Some(Value::string("late")));
    assert_eq!(c.recv(), None);
    producer.join().unwrap();
}

#[test]
fn channel_items_are_deep_copied() {
    init_logging();
    let p = Pointer::new(int(), Value::int(5));
    let ch = Chan::new(Type::pointer(int()), 1);
    ch.send(Value::Pointer(p.clone())).unwrap();
    ch.close().unwrap();

    let copy = deep(&Value::Chan(ch));
    let item = copy.as_chan().unwrap().recv().unwrap();
    let q = item.as_pointer().unwrap();
    assert!(!q.ptr_eq(&p));
    assert_eq!(q.load().unwrap(), Value::int(5));
}

#[test]
fn nested_channel_gets_its_own_forwarder() {
    init_logging();
    let inner = Chan::new(int(), 2);
    inner.send(Value::int(10)).unwrap();
    inner.send(Value::int(20)).unwrap();
    inner.close().unwrap();

    let outer = Chan::new(Type::chan(int()), 1);
    outer.send(Value::Chan(inner.clone())).unwrap();
    outer.close().unwrap();

    let copy = deep(&Value::Chan(outer));
    let copied_inner = copy.as_chan().unwrap().recv().unwrap();
    let ci = copied_inner.as_chan().unwrap();
    assert!(!ci.same_channel(&inner));
    assert_eq!(ci.cap(), 2);
    let drained: Vec<i64> = std::iter::from_fn(|| ci.recv())
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(drained, vec![10, 20]);
}

#[test]
fn failed_item_copy_closes_channel_copy() {
    init_logging();
    let ch = Chan::new(Type::any(), 2);
    ch.send(Value::Interface(Interface::new(InterfaceType::any(), Value::int(1))))
        .unwrap();
    ch.send(Value::Interface(Interface::new(
        InterfaceType::any(),
        Value::UnsafePointer(0x10),
    )))
    .unwrap();
    ch.close().unwrap();

    let copy = deep(&Value::Chan(ch));
    let c = copy.as_chan().unwrap();
    let first = c.recv().unwrap();
    assert_eq!(first.as_interface().unwrap().held(), Some(&Value::int(1)));
    assert_eq!(c.recv(), None);
}

// ─────────────────────────────────────────────────────────────
// Callables
// ─────────────────────────────────────────────────────────────

#[test]
fn func_proxy_returns_same_results() {
    let sig = Signature::new(vec![int()], vec![string()]);
    let itoa = Func::new(sig, |args| {
        vec![Value::string(args[0].as_i64().unwrap_or(0).to_string())]
    });
    let copy = deep(&Value::Func(itoa.clone()));
    let proxy = copy.as_func().unwrap();
    assert!(!proxy.is_nil());
    for arg in [1, 42, 100] {
        assert_eq!(
            proxy.call(vec![Value::int(arg)]).unwrap(),
            itoa.call(vec![Value::int(arg)]).unwrap()
        );
    }
}

#[test]
fn variadic_func_proxy_expands_arguments() {
    let sig = Signature::variadic(vec![int()], int(), vec![int()]);
    let sum = Func::new(sig, |args| {
        let mut total = args[0].as_i64().unwrap_or(0);
        for v in args[1].as_slice().map(Slice::to_vec).unwrap_or_default() {
            total += v.as_i64().unwrap_or(0);
        }
        vec![Value::int(total)]
    });
    let copy = deep(&Value::Func(sum.clone()));
    let proxy = copy.as_func().unwrap();
    assert!(proxy.signature().variadic);
    for case in [[1, 2, 3], [1, 10, 100], [42, 69, 1337]] {
        let args: Vec<Value> = case.iter().map(|i| Value::int(*i)).collect();
        assert_eq!(proxy.call(args.clone()).unwrap(), sum.call(args).unwrap());
    }
}

// ─────────────────────────────────────────────────────────────
// Restricted access, fingerprints, unsupported kinds
// ─────────────────────────────────────────────────────────────

#[test]
fn restricted_copy_zeroes_scalars_inside_containers() {
    let p = Pointer::new(string(), Value::string("secret"));
    let copy = DeepCopier::default().copy_restricted(&Value::Pointer(p));
    let q = copy.as_pointer().unwrap();
    assert_eq!(q.load().unwrap(), Value::string(""));
}

#[test]
fn fingerprint_survives_copy() {
    let m = Map::new(string(), Type::slice(int()));
    m.insert(
        Value::string("a"),
        Value::Slice(Slice::with_items(int(), vec![Value::int(1)], 3)),
    )
    .unwrap();
    let rec = Record::new(
        StructType::new("Wrapper", vec![FieldType::public("Table", Type::map(string(), Type::slice(int())))]),
        vec![Value::Map(m)],
    )
    .unwrap();
    let original = Value::Pointer(Pointer::new(Type::Struct(rec.ty().clone()), Value::Struct(rec)));
    assert_eq!(fingerprint(&deep(&original)), fingerprint(&original));
}

#[test]
#[should_panic(expected = "unsupported type")]
fn unsafe_pointer_inside_slice_aborts() {
    let s = Slice::from_values(Type::UnsafePointer, vec![Value::UnsafePointer(16)]);
    deep(&Value::Slice(s));
}
