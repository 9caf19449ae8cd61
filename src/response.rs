use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TumblrError};

/// The `meta` block every API v2 envelope carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Semantic status code, distinct from the HTTP status
    #[serde(default)]
    pub status: i64,
    /// Status message
    #[serde(default)]
    pub msg: String,
}

/// ApiResponse represents a decoded API v2 response.
/// The whole envelope is kept as `payload` so pass-through callers see it verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// HTTP status reported by the transport
    pub status_code: u16,
    /// Parsed `meta` block (zeroed when absent)
    pub meta: Meta,
    /// Complete decoded JSON envelope
    pub payload: Value,
    /// Body exactly as received
    #[serde(skip)]
    pub raw_body: String,
}

impl ApiResponse {
    /// Decode a raw body. Empty, malformed and `null` bodies yield
    /// [`TumblrError::NoResponse`].
    pub fn parse(status_code: u16, raw_body: String) -> Result<Self> {
        let payload = match serde_json::from_str::<Value>(&raw_body) {
            Ok(Value::Null) | Err(_) => return Err(TumblrError::NoResponse),
            Ok(value) => value,
        };

        let meta = payload
            .get("meta")
            .and_then(|meta| Meta::deserialize(meta).ok())
            .unwrap_or_default();

        Ok(ApiResponse {
            status_code,
            meta,
            payload,
            raw_body,
        })
    }

    /// Check the meta status against a set of success codes
    pub fn is_success(&self, success_statuses: &[i64]) -> bool {
        success_statuses.contains(&self.meta.status)
    }

    /// The endpoint-specific `response` member of the envelope
    pub fn response(&self) -> Option<&Value> {
        self.payload.get("response")
    }

    /// Apply unmarshals the `response` member into the provided type
    pub fn apply<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let data = self.response().cloned().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| e.into())
    }

    /// Get a value from the `response` member by a slash-separated path.
    /// For example, "blog/title" would access the "title" field inside the "blog" object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut current = self.response()?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the `response` member by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Render `response.errors` as a single line, if the API sent any
    pub fn errors_detail(&self) -> Option<String> {
        let errors = self.get("errors")?;
        let detail = match errors {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        Some(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "meta": {"status": 200, "msg": "OK"},
            "response": {"blog": {"title": "test"}}
        }"#;

        let response = ApiResponse::parse(200, body.to_string()).unwrap();
        assert_eq!(response.meta.status, 200);
        assert_eq!(response.meta.msg, "OK");
        assert!(response.is_success(&[200, 201]));
        assert_eq!(response.raw_body, body);
    }

    #[test]
    fn test_response_get() {
        let body = r#"{"meta":{"status":200,"msg":"OK"},"response":{"posts":[{"id":7,"slug":"hello"}]}}"#;

        let response = ApiResponse::parse(200, body.to_string()).unwrap();
        assert_eq!(response.get_string("posts/0/slug"), Some("hello".to_string()));
        assert_eq!(response.get("posts/0/id"), Some(&Value::from(7)));
        assert!(response.get("posts/1").is_none());
    }

    #[test]
    fn test_response_apply() {
        #[derive(Deserialize)]
        struct Blog {
            title: String,
        }

        #[derive(Deserialize)]
        struct Info {
            blog: Blog,
        }

        let body = r#"{"meta":{"status":200,"msg":"OK"},"response":{"blog":{"title":"test"}}}"#;

        let response = ApiResponse::parse(200, body.to_string()).unwrap();
        let info: Info = response.apply().unwrap();
        assert_eq!(info.blog.title, "test");
    }

    #[test]
    fn test_unusable_bodies() {
        for body in ["", "   ", "not json", "{\"meta\":", "null"] {
            let err = ApiResponse::parse(200, body.to_string()).unwrap_err();
            assert!(matches!(err, TumblrError::NoResponse), "body {:?}", body);
        }
    }

    #[test]
    fn test_missing_meta_is_zeroed() {
        let response = ApiResponse::parse(200, "[1,2]".to_string()).unwrap();
        assert_eq!(response.meta, Meta::default());
        assert!(!response.is_success(&[200, 201]));
    }

    #[test]
    fn test_errors_detail() {
        let body = r#"{"meta":{"status":400,"msg":"Bad Request"},"response":{"errors":["a","b"]}}"#;
        let response = ApiResponse::parse(400, body.to_string()).unwrap();
        assert_eq!(response.errors_detail(), Some("a, b".to_string()));

        let body = r#"{"meta":{"status":401,"msg":"Not Authorized"},"response":[]}"#;
        let response = ApiResponse::parse(401, body.to_string()).unwrap();
        assert_eq!(response.errors_detail(), None);
    }
}
