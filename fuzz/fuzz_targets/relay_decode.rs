//! Fuzz target for relay text decoding
//!
//! # Strategy
//!
//! - Raw text: arbitrary strings straight into the decoder
//! - Near misses: valid envelopes with a fuzzed `type` or fuzzed fields
//!
//! # Invariants
//!
//! - NEVER panic on malformed text
//! - Anything that decodes re-encodes, and decodes to the same message
//! - Scroll payloads parse or fail, never panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tandem_proto::{ScrollEvent, decode};

#[derive(Debug, Arbitrary)]
enum Input {
    Raw(String),
    Tagged { kind: String, field: String, value: String },
    Body(String),
    Scroll(String),
}

fuzz_target!(|input: Input| {
    let text = match input {
        Input::Raw(text) => text,
        Input::Tagged { kind, field, value } => {
            format!(r#"{{"type":{kind:?},{field:?}:{value:?}}}"#)
        }
        Input::Body(body) => format!(r#"{{"type":"payload","body":{body}}}"#),
        Input::Scroll(text) => {
            let _ = ScrollEvent::from_json(&text);
            return;
        }
    };

    if let Ok(message) = decode(&text) {
        let again = message.to_json().expect("decoded messages re-encode");
        assert_eq!(decode(&again).expect("re-encoded text decodes"), message);
    }
});
