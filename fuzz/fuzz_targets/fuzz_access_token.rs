//! Fuzz target: the credential gate.
//!
//! Every token the gate accepts must be usable as an HTTP header value.

#![no_main]

use axum::http::HeaderValue;
use libfuzzer_sys::fuzz_target;
use relay_core::is_valid;

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    if is_valid(Some(token)) {
        assert!(!token.is_empty());
        assert!(HeaderValue::from_str(token).is_ok());
    }
});
