use crate::exception::ServiceResponseError;
use std::fmt::{Display, Formatter};

/// Exception names registered for Glacier.
pub const EXCEPTION_TYPES: [&str; 6] = [
    "InvalidParameterValueException",
    "LimitExceededException",
    "MissingParameterValueException",
    "RequestTimeoutException",
    "ResourceNotFoundException",
    "ServiceUnavailableException",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlacierExceptionKind {
    InvalidParameterValue,
    LimitExceeded,
    MissingParameterValue,
    RequestTimeout,
    ResourceNotFound,
    ServiceUnavailable,
    /// 未注册的错误码
    Glacier,
}

impl GlacierExceptionKind {
    pub fn from_exception_type(name: &str) -> Self {
        match name {
            "InvalidParameterValueException" => Self::InvalidParameterValue,
            "LimitExceededException" => Self::LimitExceeded,
            "MissingParameterValueException" => Self::MissingParameterValue,
            "RequestTimeoutException" => Self::RequestTimeout,
            "ResourceNotFoundException" => Self::ResourceNotFound,
            "ServiceUnavailableException" => Self::ServiceUnavailable,
            _ => Self::Glacier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlacierException {
    pub kind: GlacierExceptionKind,
    pub response: ServiceResponseError,
}

impl From<ServiceResponseError> for GlacierException {
    fn from(response: ServiceResponseError) -> Self {
        Self {
            kind: GlacierExceptionKind::from_exception_type(&response.exception_type),
            response,
        }
    }
}

impl Display for GlacierException {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.response, f)
    }
}

impl std::error::Error for GlacierException {}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Glacier(GlacierException),
    #[error(transparent)]
    Client(crate::Error),
    #[error("error: {0}")]
    Common(String),
}

impl Error {
    pub fn kind(&self) -> Option<GlacierExceptionKind> {
        match self {
            Error::Glacier(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl From<crate::Error> for Error {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::Service(e) => Error::Glacier(e.into()),
            other => Error::Client(other),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Client(crate::Error::Reqwest(e))
    }
}

impl From<aws_kit_common::Error> for Error {
    fn from(e: aws_kit_common::Error) -> Self {
        Error::Client(e.into())
    }
}
