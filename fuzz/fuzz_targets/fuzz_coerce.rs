//! Fuzz target for raw string coercion.
//!
//! Every type tag must either produce a value of that type or a
//! `CoerceError` naming it, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use venvalid::{coerce, TypeTag};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    tag: u8,
    raw: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let ty = TypeTag::ALL[input.tag as usize % TypeTag::ALL.len()];
    match coerce(input.raw, ty) {
        Ok(value) => assert_eq!(value.type_tag(), ty),
        Err(err) => assert_eq!(err.expected, ty),
    }
});
