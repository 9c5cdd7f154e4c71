//! Sieve HTTP - Filter Transport
//!
//! Embeds filters in query strings or POST bodies, recovers them from
//! incoming query strings, and sends them to a server with `reqwest`.

pub mod client;
pub mod config;
pub mod encoder;
pub mod error;

pub use client::{FilterClient, FilterRequest};
pub use config::{ClientConfig, HttpMethod, CONFIG_ENV};
pub use encoder::{
    build_filter_url, decode_filter, decode_filter_from_query_string, encode_filter_body,
    encode_filter_to_query_string, DEFAULT_PARAM,
};
pub use error::{ConfigError, DecodeError, TransportError};
