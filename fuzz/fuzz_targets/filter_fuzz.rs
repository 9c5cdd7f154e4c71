//! Fuzz test for wire filter parsing
//!
//! Arbitrary text must either be rejected with an error or parse into a
//! filter whose wire JSON is stable across reparse and tree round trips.
//!
//! Run with: cargo +nightly fuzz run filter_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_core::{deserialize_root, serialize_root, Filter, FilterRoot};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Any filter shape: must not panic.
    let _ = Filter::from_json_str(input);

    if let Ok(root) = FilterRoot::from_json_str(input) {
        let wire = root.to_json();
        let reparsed = FilterRoot::from_json_str(&root.to_json_string())
            .expect("serialized filter must parse");
        assert_eq!(reparsed.to_json(), wire);

        let tree = deserialize_root(&root, None);
        assert_eq!(serialize_root(&tree).to_json(), wire);
    }
});
