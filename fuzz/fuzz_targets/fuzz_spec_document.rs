//! Fuzz target for JSON spec document parsing.
//!
//! Spec documents come from disk, so parsing must reject anything
//! malformed with an error instead of panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use venvalid::Spec;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = Spec::from_json_value(&doc);
    }
});
