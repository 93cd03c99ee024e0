//! Fuzz target: parsing of the add-on options file.
//!
//! Arbitrary bytes fed to `ServerOptions::from_json` must never panic, and
//! any options it accepts must describe a bindable address.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_gateway::ServerOptions;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(options) = ServerOptions::from_json(text) {
        assert!(options.listen_addr().ends_with(&format!(":{}", options.port)));
        assert!(options.forward_routes.keys().all(|path| path.starts_with('/')));
    }
});
