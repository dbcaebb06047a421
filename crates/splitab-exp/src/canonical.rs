use serde::Serialize;
use splitab_core::{AbError, ErrorInfo};

/// Encodes `value` as compact JSON with object keys in sorted order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, AbError> {
    let value = serde_json::to_value(value).map_err(encode_error)?;
    serde_json::to_vec(&value).map_err(encode_error)
}

fn encode_error(err: serde_json::Error) -> AbError {
    AbError::Config(
        ErrorInfo::new("splitab.json_encode", "failed to encode canonical json")
            .with_hint(err.to_string()),
    )
}
