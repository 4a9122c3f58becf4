//! Response envelope shared by every backend endpoint.

use serde::{Deserialize, Serialize};

/// `{ code, message, data }` wrapper returned on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub message: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self { Self { code: 200, message: "Success".to_string(), data } }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self { code: 200, message: message.into(), data }
    }
}

/// Failure body. Every field is optional because proxies and crashed
/// handlers do not always produce the full envelope.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_envelope() {
        let env: ApiEnvelope<bool> = serde_json::from_str(r#"{"code":200,"message":"ok","data":true}"#).unwrap();
        assert!(env.data);
    }

    #[test]
    fn test_decode_partial_error_envelope() {
        let env: ErrorEnvelope = serde_json::from_str(r#"{"message":"out of stock","data":null}"#).unwrap();
        assert_eq!(env.code, None);
        assert_eq!(env.message.as_deref(), Some("out of stock"));
    }
}
