//! Query-string and body encoding for filters
//!
//! A filter travels as `<param>=<percent-encoded JSON>` on GET requests and
//! as a raw JSON body on POST requests.

use crate::error::DecodeError;
use sieve_core::FilterRoot;

/// Query parameter used when the caller names none.
pub const DEFAULT_PARAM: &str = "filter";

/// `<param>=<percent-encoded JSON>`. The parameter name is percent-encoded
/// too, so any name decodes back under itself.
pub fn encode_filter_to_query_string(root: &FilterRoot, param: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(param),
        urlencoding::encode(&root.to_json_string())
    )
}

/// Append the encoded filter to `base_url`, joining with `&` when the URL
/// already carries a query and `?` otherwise.
pub fn build_filter_url(root: &FilterRoot, base_url: &str, param: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}",
        base_url,
        separator,
        encode_filter_to_query_string(root, param)
    )
}

/// JSON text for a POST body.
pub fn encode_filter_body(root: &FilterRoot) -> String {
    root.to_json_string()
}

/// Form-style component decoding: `+` is a space, then percent escapes.
fn decode_component(raw: &str) -> Result<String, DecodeError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| DecodeError::InvalidJson {
            reason: format!("invalid percent-encoding: {}", e),
        })
}

/// First non-decoded value of `param` in `query`, if present.
fn find_param<'a>(query: &'a str, param: &str) -> Option<&'a str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match decode_component(key) {
                Ok(key) if key == param => Some(value),
                _ => None,
            }
        })
}

/// Recover a filter from a query string.
///
/// An absent or empty parameter yields [`DecodeError::NotFound`]; bad
/// JSON or a JSON value that is not a filter group yields the matching
/// parse error.
pub fn decode_filter_from_query_string(query: &str, param: &str) -> Result<FilterRoot, DecodeError> {
    let raw = match find_param(query, param) {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            return Err(DecodeError::NotFound {
                param: param.to_string(),
            })
        }
    };

    let result = decode_component(raw)
        .and_then(|json| FilterRoot::from_json_str(&json).map_err(DecodeError::from));
    if let Err(err) = &result {
        tracing::warn!(param = %param, error = %err, "Failed to decode filter from query string");
    }
    result
}

/// [`decode_filter_from_query_string`] with every failure flattened to `None`.
pub fn decode_filter(query: &str, param: &str) -> Option<FilterRoot> {
    decode_filter_from_query_string(query, param).ok()
}
