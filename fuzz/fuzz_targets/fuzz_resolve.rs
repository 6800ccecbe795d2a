//! Fuzz target for resolution.
//!
//! Builds a spec from arbitrary tags and resolves it against arbitrary
//! values. A successful result must hold every declared name in order.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use venvalid::{resolve, Spec, TypeTag};

#[derive(Debug, Arbitrary)]
struct Entry {
    tag: u8,
    value: Option<String>,
}

fuzz_target!(|entries: Vec<Entry>| {
    let names: Vec<String> = (0..entries.len()).map(|i| format!("VAR_{i}")).collect();
    let Ok(spec) = Spec::from_entries(
        names
            .iter()
            .zip(&entries)
            .map(|(name, e)| (name.as_str(), TypeTag::ALL[e.tag as usize % TypeTag::ALL.len()])),
    ) else {
        return;
    };

    let source: Vec<(String, String)> = names
        .iter()
        .zip(&entries)
        .filter_map(|(name, e)| e.value.clone().map(|v| (name.clone(), v)))
        .collect();

    if let Ok(config) = resolve(&spec, &source) {
        assert!(config.names().eq(names.iter().map(String::as_str)));
    }
});
