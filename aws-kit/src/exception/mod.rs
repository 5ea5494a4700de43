//! Translation of error responses into service specific errors.
//!
//! A client built with a service namespace gets an [`ExceptionListener`] that
//! hands every failed response to a [`NamespaceExceptionFactory`]. The factory
//! parses the body with the service's [`ExceptionParser`] and names the error
//! after the returned code when the service registered an exception of that
//! name, otherwise after the service's default exception.

mod listener;
mod parser;

pub use listener::ExceptionListener;
pub use parser::{
    DefaultXmlExceptionParser, ExceptionParser, ExceptionParts, JsonQueryExceptionParser,
    JsonRestExceptionParser,
};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Client,
    Server,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status.is_client_error() {
            Some(Self::Client)
        } else if status.is_server_error() {
            Some(Self::Server)
        } else {
            None
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Client => write!(f, "client"),
            ErrorKind::Server => write!(f, "server"),
        }
    }
}

/// An error response with its body read into memory.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponseError {
    /// e.g. `ResourceNotFoundException`, or the service default such as `GlacierException`
    pub exception_type: String,
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    pub kind: Option<ErrorKind>,
    pub status: u16,
}

impl Display for ServiceResponseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let or_none = |o: &Option<String>| o.clone().unwrap_or_else(|| "-".to_owned());
        write!(
            f,
            "{}: Status Code: {}, AWS Request ID: {}, AWS Error Type: {}, AWS Error Code: {}, AWS Error Message: {}",
            self.exception_type,
            self.status,
            or_none(&self.request_id),
            self.kind.map(|k| k.to_string()).unwrap_or_else(|| "-".to_owned()),
            or_none(&self.code),
            or_none(&self.message),
        )
    }
}

impl std::error::Error for ServiceResponseError {}

pub trait ExceptionFactory: Send + Sync + Debug {
    fn from_response(&self, response: &RawResponse) -> ServiceResponseError;
}

/// Maps error codes onto the exception names registered for one service.
#[derive(Debug, Clone)]
pub struct NamespaceExceptionFactory {
    parser: Arc<dyn ExceptionParser>,
    namespace: String,
    default_exception: String,
    exception_types: Vec<String>,
}

impl NamespaceExceptionFactory {
    /// - `namespace`: where the exceptions live, e.g. `aws_kit::glacier::exception`
    /// - `default_exception`: name used for unregistered codes, e.g. `GlacierException`
    /// - `exception_types`: exception names known to the service
    pub fn new(
        parser: Arc<dyn ExceptionParser>,
        namespace: impl Into<String>,
        default_exception: impl Into<String>,
        exception_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            parser,
            namespace: namespace.into(),
            default_exception: default_exception.into(),
            exception_types: exception_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn default_exception(&self) -> &str {
        &self.default_exception
    }

    /// `NoSuchVault` -> `NoSuchVaultException` if registered, else the default.
    pub fn exception_type(&self, code: Option<&str>) -> &str {
        let Some(code) = code else {
            return &self.default_exception;
        };
        let name = if code.ends_with("Exception") {
            code.to_owned()
        } else {
            format!("{code}Exception")
        };
        self.exception_types
            .iter()
            .find(|t| **t == name)
            .map(String::as_str)
            .unwrap_or(&self.default_exception)
    }
}

impl ExceptionFactory for NamespaceExceptionFactory {
    fn from_response(&self, response: &RawResponse) -> ServiceResponseError {
        let parts = self.parser.parse(response);
        ServiceResponseError {
            exception_type: self.exception_type(parts.code.as_deref()).to_owned(),
            code: parts.code,
            message: parts.message,
            request_id: parts.request_id,
            kind: parts.kind,
            status: response.status.as_u16(),
        }
    }
}
