//! Proptest generators for payload values.

use proptest::prelude::*;
use viewstore_codec::Value;

/// Strategy for scalar values (no containers).
pub fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        // Finite floats only; the JSON boundary renders non-finite as null.
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 _/-]{0,24}".prop_map(Value::Text),
    ]
}

/// Strategy for path strings.
pub fn path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z0-9]{1,8}){0,2}".prop_map(String::from)
}

/// Strategy for arbitrary value trees up to a modest depth.
pub fn value() -> impl Strategy<Value = Value> {
    scalar_value().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,8}", inner), 0..6)
                .prop_map(|pairs| Value::map(pairs)),
        ]
    })
}

/// Strategy for map-rooted values, the usual snapshot shape.
pub fn map_value() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z]{1,8}", value()), 0..6).prop_map(|pairs| Value::map(pairs))
}
