//! Response normalization.
//!
//! Maps whatever shape the agent produced onto the canonical
//! `{status, result, message?, metadata?}` contract the dashboard renders.
//! [`normalize`] is total: malformed, scalar or empty input degrades to an
//! error-status response instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::ParseResult;

/// Message used when the agent returned nothing usable.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response from agent";

/// Top-level outcome reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl ResponseStatus {
    /// `Error` only for the exact string `"error"`.
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("error") => ResponseStatus::Error,
            _ => ResponseStatus::Success,
        }
    }
}

/// Canonical application-facing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub result: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl NormalizedResponse {
    pub fn success(result: Map<String, Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            result,
            message: None,
            metadata: None,
        }
    }

    /// Error response with an empty result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            result: Map::new(),
            message: Some(message.into()),
            metadata: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Message to show the user, falling back to a generic line on errors.
    pub fn display_message(&self) -> String {
        match (&self.message, self.status) {
            (Some(message), _) => message.clone(),
            (None, ResponseStatus::Error) => "The agent reported an error".to_string(),
            (None, ResponseStatus::Success) => "Verification complete".to_string(),
        }
    }
}

/// Structural classification of a parsed payload.
///
/// Variants are listed in match priority; [`ResponseShape::classify`]
/// returns the first that applies.
#[derive(Debug)]
enum ResponseShape<'a> {
    Empty,
    Text(&'a str),
    Scalar(&'a Value),
    List(&'a [Value]),
    StatusAndResult(&'a Map<String, Value>),
    StatusOnly(&'a Map<String, Value>),
    ResultOnly(&'a Map<String, Value>),
    MessageOnly(&'a str),
    Nested(&'a Value),
    Other(&'a Map<String, Value>),
}

impl<'a> ResponseShape<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null => ResponseShape::Empty,
            Value::String(s) if s.is_empty() => ResponseShape::Empty,
            Value::String(s) => ResponseShape::Text(s),
            Value::Bool(_) | Value::Number(_) => ResponseShape::Scalar(value),
            Value::Array(items) => ResponseShape::List(items),
            Value::Object(obj) => {
                let has_status = obj.contains_key("status");
                let has_result = obj.contains_key("result");
                if has_status && has_result {
                    ResponseShape::StatusAndResult(obj)
                } else if has_status {
                    ResponseShape::StatusOnly(obj)
                } else if has_result {
                    ResponseShape::ResultOnly(obj)
                } else if let Some(Value::String(message)) = obj.get("message") {
                    ResponseShape::MessageOnly(message)
                } else if let Some(inner) = obj.get("response") {
                    ResponseShape::Nested(inner)
                } else {
                    ResponseShape::Other(obj)
                }
            }
        }
    }
}

/// Normalize any parsed JSON value into a [`NormalizedResponse`].
pub fn normalize(value: &Value) -> NormalizedResponse {
    match ResponseShape::classify(value) {
        ResponseShape::Empty => NormalizedResponse::error(EMPTY_RESPONSE_MESSAGE),
        ResponseShape::Text(text) => {
            NormalizedResponse::success(single("text", Value::String(text.to_string())))
                .with_message(text)
        }
        ResponseShape::Scalar(v) => {
            NormalizedResponse::success(single("value", v.clone())).with_message(v.to_string())
        }
        ResponseShape::List(items) => {
            NormalizedResponse::success(single("items", Value::Array(items.to_vec())))
        }
        ResponseShape::StatusAndResult(obj) => NormalizedResponse {
            status: ResponseStatus::from_value(obj.get("status")),
            result: result_map(obj.get("result")),
            message: string_field(obj, "message"),
            metadata: object_field(obj, "metadata"),
        },
        ResponseShape::StatusOnly(obj) => NormalizedResponse {
            status: ResponseStatus::from_value(obj.get("status")),
            result: obj
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "status" | "message" | "metadata"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            message: string_field(obj, "message"),
            metadata: object_field(obj, "metadata"),
        },
        ResponseShape::ResultOnly(obj) => NormalizedResponse {
            status: ResponseStatus::Success,
            result: result_map(obj.get("result")),
            message: string_field(obj, "message"),
            metadata: object_field(obj, "metadata"),
        },
        ResponseShape::MessageOnly(message) => {
            NormalizedResponse::success(single("text", Value::String(message.to_string())))
                .with_message(message)
        }
        ResponseShape::Nested(inner) => normalize(inner),
        ResponseShape::Other(obj) => NormalizedResponse::success(obj.clone()),
    }
}

/// Normalize the outcome of a parse, turning failures into error responses.
pub fn normalize_parse_result(parsed: &ParseResult<Value>) -> NormalizedResponse {
    match parsed.data() {
        Some(value) if parsed.is_success() => normalize(value),
        _ => NormalizedResponse::error(format!(
            "Unable to parse agent response: {}",
            parsed.error.as_deref().unwrap_or("unknown error")
        )),
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

/// `result` as a mapping: objects pass through, falsy values become empty.
fn result_map(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(obj)) => obj.clone(),
        None | Some(Value::Null) | Some(Value::Bool(false)) => Map::new(),
        Some(Value::String(s)) if s.is_empty() => Map::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Map::new(),
        Some(Value::String(s)) => single("text", Value::String(s.clone())),
        Some(other) => single("value", other.clone()),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn object_field(obj: &Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    obj.get(key).and_then(Value::as_object).cloned()
}
