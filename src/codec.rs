//! JSON encoding of stored values.

use crate::config::Format;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Render `value` as JSON text.
pub fn encode<T: Serialize + ?Sized>(value: &T, format: Format) -> serde_json::Result<String> {
    match format {
        Format::Pretty => serde_json::to_string_pretty(value),
        Format::Compact => serde_json::to_string(value),
    }
}

/// Parse JSON text into `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(text)
}

/// Encode `value` and check that the text decodes back into `T`.
pub fn encode_verified<T>(value: &T, format: Format) -> serde_json::Result<String>
where
    T: Serialize + DeserializeOwned,
{
    let text = encode(value, format)?;
    decode::<T>(&text)?;
    Ok(text)
}
