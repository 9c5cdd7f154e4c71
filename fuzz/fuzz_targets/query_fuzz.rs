//! Fuzz test for query-string decoding
//!
//! Decoding arbitrary query strings must never panic, and any filter it
//! recovers must survive re-encoding.
//!
//! Run with: cargo +nightly fuzz run query_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_http::{decode_filter, encode_filter_to_query_string, DEFAULT_PARAM};

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(root) = decode_filter(query, DEFAULT_PARAM) {
        let encoded = encode_filter_to_query_string(&root, DEFAULT_PARAM);
        let decoded = decode_filter(&encoded, DEFAULT_PARAM).expect("encoded filter must decode");
        assert_eq!(decoded.to_json(), root.to_json());
    }
});
