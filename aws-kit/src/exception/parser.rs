//! Parsers turning an error response body into [`ExceptionParts`].

use super::{ErrorKind, RawResponse};
use serde::Deserialize;
use std::fmt::Debug;

const REQUEST_ID_HEADERS: [&str; 2] = ["x-amzn-requestid", "x-amz-request-id"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionParts {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    pub kind: Option<ErrorKind>,
}

pub trait ExceptionParser: Send + Sync + Debug {
    fn parse(&self, response: &RawResponse) -> ExceptionParts;
}

fn header(response: &RawResponse, name: &str) -> Option<String> {
    response
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parts available from the status line and headers alone.
fn base_parts(response: &RawResponse) -> ExceptionParts {
    ExceptionParts {
        code: None,
        message: Some(response.status.to_string()),
        request_id: REQUEST_ID_HEADERS
            .iter()
            .find_map(|h| header(response, h)),
        kind: ErrorKind::from_status(response.status),
    }
}

// region:    --- xml
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct XmlError {
    code: Option<String>,
    message: Option<String>,
    #[serde(alias = "RequestID")]
    request_id: Option<String>,
    #[serde(rename = "Type")]
    error_type: Option<String>,
    error: Option<Box<XmlError>>,
    errors: Option<XmlErrors>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct XmlErrors {
    #[serde(default)]
    error: Vec<XmlError>,
}

/// Handles the three XML error layouts used by AWS:
///
/// - `<Error><Code/><Message/><RequestId/></Error>`
/// - `<ErrorResponse><Error><Type/><Code/><Message/></Error><RequestId/></ErrorResponse>`
/// - `<Response><Errors><Error><Code/><Message/></Error></Errors><RequestID/></Response>`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultXmlExceptionParser;

impl ExceptionParser for DefaultXmlExceptionParser {
    fn parse(&self, response: &RawResponse) -> ExceptionParts {
        let mut parts = base_parts(response);

        if response.body.trim().is_empty() {
            // HEAD 等请求没有body
            if response.status == reqwest::StatusCode::NOT_FOUND {
                parts.code = Some("NotFound".to_owned());
            }
            return parts;
        }

        let Ok(doc) = quick_xml::de::from_str::<XmlError>(&response.body) else {
            tracing::debug!(status = %response.status, "error body is not xml");
            return parts;
        };

        let request_id = doc.request_id.clone();
        let inner = match (doc.error, doc.errors) {
            (Some(e), _) => *e,
            (None, Some(errors)) => errors.error.into_iter().next().unwrap_or_default(),
            (None, None) => XmlError {
                code: doc.code,
                message: doc.message,
                error_type: doc.error_type,
                ..Default::default()
            },
        };

        if inner.code.is_some() {
            parts.code = inner.code;
        }
        if inner.message.is_some() {
            parts.message = inner.message;
        }
        if let Some(id) = request_id.or(inner.request_id) {
            parts.request_id = Some(id);
        }
        match inner.error_type.as_deref() {
            Some("Sender") => parts.kind = Some(ErrorKind::Client),
            Some("Receiver") => parts.kind = Some(ErrorKind::Server),
            _ => {}
        }
        parts
    }
}
// endregion: --- xml

// region:    --- json
fn json_str(value: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn apply_json_body(parts: &mut ExceptionParts, body: &serde_json::Value) {
    if let Some(m) = json_str(body, &["message", "Message"]) {
        parts.message = Some(m);
    }
    match json_str(body, &["type", "Type"]).as_deref() {
        Some(t) if t.eq_ignore_ascii_case("client") => parts.kind = Some(ErrorKind::Client),
        Some(t) if t.eq_ignore_ascii_case("server") => parts.kind = Some(ErrorKind::Server),
        _ => {}
    }
}

/// REST-JSON services (Glacier): code in the `x-amzn-ErrorType` header or the
/// body's `code` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRestExceptionParser;

impl ExceptionParser for JsonRestExceptionParser {
    fn parse(&self, response: &RawResponse) -> ExceptionParts {
        let mut parts = base_parts(response);

        // x-amzn-ErrorType: ResourceNotFoundException:http://internal.amazon.com/...
        if let Some(t) = header(response, "x-amzn-errortype") {
            parts.code = t.split(':').next().map(str::to_owned);
        }

        if let Ok(body) = serde_json::from_str::<serde_json::Value>(&response.body) {
            if let Some(code) = json_str(&body, &["code", "Code"]) {
                parts.code = Some(code);
            }
            apply_json_body(&mut parts, &body);
        }
        parts
    }
}

/// JSON-RPC services: `{"__type": "prefix#Code", "message": "..."}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonQueryExceptionParser;

impl ExceptionParser for JsonQueryExceptionParser {
    fn parse(&self, response: &RawResponse) -> ExceptionParts {
        let mut parts = base_parts(response);
        if let Ok(body) = serde_json::from_str::<serde_json::Value>(&response.body) {
            if let Some(t) = json_str(&body, &["__type"]) {
                parts.code = t.rsplit('#').next().map(str::to_owned);
            }
            apply_json_body(&mut parts, &body);
        }
        parts
    }
}
// endregion: --- json
