//! Fuzz target: unpacking arbitrary request bodies.
//!
//! Any byte sequence that parses as JSON must unpack without panicking,
//! and objects must always unpack successfully.

#![no_main]

use apollo_backend::{unpack, Operation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    for op in Operation::ALL {
        let result = unpack::for_operation(op, &request);
        assert_eq!(result.is_ok(), request.is_object(), "only objects unpack");
    }
});
