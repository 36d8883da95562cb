//! The OCS response envelope.
//!
//! ```json
//! { "ocs": { "meta": { "status": "ok", "statuscode": 200, "message": "OK" },
//!            "data": { "e2e-token": "..." } } }
//! ```

use serde::Deserialize;
use serde_json::Value;

use vaultsync_core::error::E2eeError;

#[derive(Debug, Deserialize)]
struct Envelope {
    ocs: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    data: Value,
}

/// Extract the string at `ocs.data[field]` from a raw OCS body.
pub fn data_field(body: &str, field: &str) -> Result<String, E2eeError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| E2eeError::metadata_invalid(format!("malformed OCS response: {e}")))?;
    envelope
        .ocs
        .data
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| E2eeError::metadata_invalid(format!("OCS response lacks '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_field() {
        let body = r#"{"ocs":{"meta":{"status":"ok"},"data":{"e2e-token":"tok-1"}}}"#;
        assert_eq!(data_field(body, "e2e-token").unwrap(), "tok-1");
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let body = r#"{"ocs":{"meta":{"status":"ok"},"data":[]}}"#;
        assert!(matches!(
            data_field(body, "meta-data"),
            Err(E2eeError::MetadataInvalid { .. })
        ));
        assert!(data_field("<xml/>", "meta-data").is_err());
    }
}
