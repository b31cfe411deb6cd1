use serde_json::Value;
use std::collections::HashMap;

/// A transport-agnostic inbound request. The real HTTP server (out of
/// scope here, per spec.md §1) is responsible for producing one of these
/// per connection and handing it to [`crate::http::dispatch`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    /// Parsed JSON body, if `Content-Type: application/json` and the body
    /// decoded successfully.
    pub json_body: Option<Value>,
    /// Parsed `application/x-www-form-urlencoded` or multipart text fields.
    pub form_body: HashMap<String, String>,
    /// Decoded multipart file parts, keyed by field name.
    pub files: HashMap<String, crate::domains::attachment::PendingUpload>,
    pub raw_body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Merges query, form and JSON sources for a scalar field with the
    /// precedence form > query > JSON, per spec.md §4.10.
    pub fn param(&self, name: &str) -> Option<String> {
        if let Some(v) = self.form_body.get(name) {
            return Some(v.clone());
        }
        if let Some(v) = self.query.get(name) {
            return Some(v.clone());
        }
        if let Some(Value::Object(map)) = &self.json_body {
            if let Some(v) = map.get(name) {
                return match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                };
            }
        }
        None
    }
}

pub enum ResponseBody {
    Json(Value),
    Bytes {
        data: Vec<u8>,
        content_type: String,
        content_disposition: Option<String>,
    },
    Stream {
        file: tokio::fs::File,
        content_type: String,
        content_length: u64,
        content_disposition: Option<String>,
    },
}

pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: ResponseBody,
}

impl Response {
    /// `{"success":true,"results":<data>}` with the given status, per
    /// spec.md §6's wire format.
    pub fn success(status: u16, results: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json; charset=utf-8".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            "POST, PUT, GET, DELETE".to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type, Authorization".to_string(),
        );
        Self {
            status,
            headers,
            body: ResponseBody::Json(serde_json::json!({ "success": true, "results": results })),
        }
    }

    pub fn ok(results: Value) -> Self {
        Self::success(200, results)
    }

    pub fn created(results: Value) -> Self {
        Self::success(201, results)
    }

    pub fn error(err: crate::errors::ApiError) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json; charset=utf-8".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        let status = err.status;
        let body = serde_json::to_value(&err).unwrap_or_else(|_| {
            serde_json::json!({ "success": false, "code": status, "message": "serialization error" })
        });
        Self { status, headers, body: ResponseBody::Json(body) }
    }
}
