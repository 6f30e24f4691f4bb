//! Proptest strategies for document parameters.

use proptest::prelude::*;
use serde_json::{json, Value};

/// Inputs for one generated document.
#[derive(Debug, Clone)]
pub struct DocParams {
    pub doc_type: String,
    pub payload: Option<Value>,
}

/// Strategy over document types: short lowercase identifiers with optional
/// dot segments, the shape applications actually use.
pub fn doc_type() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,11}(\\.[a-z0-9_]{1,8}){0,2}")
        .expect("valid regex")
}

/// Strategy over small JSON payloads: flat objects of strings, numbers,
/// and booleans.
pub fn payload() -> impl Strategy<Value = Option<Value>> {
    let scalar = prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        // Float-backed numbers across the whole decimal-notation range,
        // including integer-valued ones past 2^53.
        (-1.0e21..1.0e21f64).prop_map(|f| json!(f)),
        any::<bool>().prop_map(|b| json!(b)),
        "[ -~]{0,24}".prop_map(|s| json!(s)),
    ];
    let object = proptest::collection::btree_map("[a-z]{1,8}", scalar, 0..5)
        .prop_map(|map| Value::Object(map.into_iter().collect()));
    proptest::option::of(object)
}

/// Strategy over full document parameters.
pub fn doc_params() -> impl Strategy<Value = DocParams> {
    (doc_type(), payload()).prop_map(|(doc_type, payload)| DocParams { doc_type, payload })
}
