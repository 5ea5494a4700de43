//! Region / service endpoint lookup.

mod caching;
mod xml;

pub use caching::CachingEndpointProvider;
pub use xml::XmlEndpointProvider;

use crate::Error;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

pub const US_EAST_1: &str = "us-east-1";
pub const US_WEST_1: &str = "us-west-1";
pub const US_WEST_2: &str = "us-west-2";
pub const EU_WEST_1: &str = "eu-west-1";
pub const AP_NORTHEAST_1: &str = "ap-northeast-1";
pub const AP_SOUTHEAST_1: &str = "ap-southeast-1";
pub const AP_SOUTHEAST_2: &str = "ap-southeast-2";
pub const SA_EAST_1: &str = "sa-east-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    schemes: Vec<String>,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, schemes: Vec<String>) -> Self {
        Self {
            host: host.into(),
            schemes,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn supports_scheme(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }

    /// `scheme://host`; `https` when no scheme is requested and it is supported,
    /// otherwise the first supported scheme.
    pub fn base_url(&self, scheme: Option<&str>) -> Result<String, Error> {
        let scheme = match scheme {
            Some(s) if self.supports_scheme(s) => s.to_ascii_lowercase(),
            Some(s) => {
                return Err(Error::InvalidArgument(format!(
                    "[{}] does not support the [{s}] scheme",
                    self.host
                )));
            }
            None if self.supports_scheme("https") => "https".to_owned(),
            None => self
                .schemes
                .first()
                .cloned()
                .ok_or_else(|| Error::InvalidArgument(format!("[{}] has no scheme", self.host)))?,
        };
        Ok(format!("{scheme}://{}", self.host))
    }
}

pub trait EndpointProvider: Send + Sync + Debug {
    fn get_endpoint(&self, service: &str, region: &str) -> Result<Endpoint, Error>;
}

/// Process-wide provider over the bundled endpoint table.
pub fn default_endpoint_provider() -> Arc<dyn EndpointProvider> {
    static DEFAULT: OnceLock<Arc<dyn EndpointProvider>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(CachingEndpointProvider::new(XmlEndpointProvider::bundled())))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(schemes: &[&str]) -> Endpoint {
        Endpoint::new(
            "glacier.us-east-1.amazonaws.com",
            schemes.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn prefers_https() {
        assert_eq!(
            endpoint(&["http", "https"]).base_url(None).unwrap(),
            "https://glacier.us-east-1.amazonaws.com"
        );
        assert_eq!(
            endpoint(&["http"]).base_url(None).unwrap(),
            "http://glacier.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn honors_requested_scheme() {
        assert_eq!(
            endpoint(&["http", "https"]).base_url(Some("HTTP")).unwrap(),
            "http://glacier.us-east-1.amazonaws.com"
        );
        assert!(endpoint(&["https"]).base_url(Some("http")).is_err());
    }

    #[test]
    fn default_provider_resolves_glacier() {
        let e = default_endpoint_provider()
            .get_endpoint("glacier", US_WEST_2)
            .unwrap();
        assert_eq!(e.host(), "glacier.us-west-2.amazonaws.com");
    }
}
