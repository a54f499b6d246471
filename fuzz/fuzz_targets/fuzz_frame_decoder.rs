//! Fuzz target: probe response frame decoder.
//!
//! Feeds arbitrary bytes as a response frame and checks that decoding
//! never panics and that decoded text is 7-bit clean.  Also pushes the
//! bytes through reading-value parsing.
//!
//! Run with: `cargo +nightly fuzz run fuzz_frame_decoder`

#![no_main]

use libfuzzer_sys::fuzz_target;
use reefmon::probe::frame::{RESPONSE_LEN, RawResponse, decode_payload};
use reefmon::probe::parse_value;

fuzz_target!(|data: &[u8]| {
    let frame = &data[..data.len().min(RESPONSE_LEN)];

    if let Some(raw) = RawResponse::parse(frame) {
        if let Ok(text) = raw.decode() {
            assert!(text.is_ascii());
            assert!(!text.contains('\0'));
            if let Ok(v) = parse_value(&text) {
                assert!(v.is_finite());
            }
        }
    }

    let text = decode_payload(data);
    assert!(text.len() <= data.len());
});
