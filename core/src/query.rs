//! Query-string and form-body encoding, plus the options check every call
//! runs before anything is built.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Characters left unescaped in query components: alphanumerics plus
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Coerce a JSON value to the string sent on the wire.
///
/// Arrays and objects have no defined wire form; they are written as
/// compact JSON so the result is at least deterministic.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Percent-encode a single query component.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Serialize a flat mapping into `k1=v1&k2=v2`, preserving insertion order.
///
/// An empty mapping yields an empty string.
pub fn serialize(params: &Map<String, Value>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(&stringify(v))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Split a serialized query back into decoded pairs.
pub fn parse(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (
                percent_decode_str(k).decode_utf8_lossy().into_owned(),
                percent_decode_str(v).decode_utf8_lossy().into_owned(),
            )
        })
        .collect()
}

/// Encode a mapping as an `application/x-www-form-urlencoded` body.
pub fn form_encode(data: &Map<String, Value>) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in data {
        form.append_pair(k, &stringify(v));
    }
    form.finish()
}

/// Check the arguments of a facade call before any request is built.
///
/// Returns the options mapping together with the callback when the call may
/// proceed. With no callback there is nowhere to report a failure, so the
/// call is dropped silently. When `options` is not a mapping the callback is
/// invoked once with [`ApiError::BadParameters`].
pub fn validate<F>(options: &Value, callback: Option<F>) -> Option<(&Map<String, Value>, F)>
where
    F: FnOnce(Result<String, ApiError>),
{
    let callback = callback?;
    match options.as_object() {
        Some(map) => Some((map, callback)),
        None => {
            callback(Err(ApiError::BadParameters));
            None
        }
    }
}
