//! Fuzz target: encoding JSON-derived values.
//!
//! A `Datum` built from parsed JSON must always encode, and must encode
//! back to the value it came from.

#![no_main]

use apollo_core::{encode, Datum};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let encoded = encode(&Datum::from(value.clone())).expect("JSON-derived datum must encode");
    assert_eq!(encoded, value, "encoding must reproduce the source JSON");
});
