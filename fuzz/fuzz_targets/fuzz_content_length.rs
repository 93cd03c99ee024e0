//! Fuzz target: `Content-Length` parsing on relay routes.
//!
//! Any header value either parses to the number it spells or is rejected
//! as a malformed request; it never panics.

#![no_main]

use axum::http::HeaderValue;
use libfuzzer_sys::fuzz_target;
use relay_gateway::message::parse_content_length;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = HeaderValue::from_bytes(data) else {
        return;
    };
    if let Ok(n) = parse_content_length(Some(&value)) {
        let text = String::from_utf8_lossy(data);
        assert_eq!(text.trim().parse::<usize>().ok(), Some(n));
    }
});
