//! Request signing strategies.
//!
//! One signature is bound to a client when it is built and then shared by every
//! request the client sends.

mod v3_https;
mod v4;

pub use v3_https::SignatureV3Https;
pub use v4::{AMZ_DATE, CONTENT_SHA256, SECURITY_TOKEN, SignatureV4};

use crate::Error;
use crate::credentials::Credentials;
use std::fmt::Debug;
use std::sync::Arc;

pub trait Signature: Send + Sync + Debug {
    /// Name usable in the `signature` option
    fn name(&self) -> &'static str;

    /// Adds the authentication headers to `request`.
    fn sign_request(
        &self,
        request: &mut reqwest::Request,
        credentials: &Credentials,
    ) -> Result<(), Error>;

    /// Signatures whose scope depends on the endpoint return a copy bound to
    /// `service` and `region`.
    fn for_endpoint(&self, _service: &str, _region: &str) -> Option<Arc<dyn Signature>> {
        None
    }
}

/// Signature registered under `name` in the `signature` option.
pub fn from_name(name: &str) -> Result<Arc<dyn Signature>, Error> {
    match name.to_ascii_lowercase().as_str() {
        "v4" => Ok(Arc::new(SignatureV4::new())),
        "v3https" => Ok(Arc::new(SignatureV3Https)),
        other => Err(Error::InvalidArgument(format!(
            "unknown signature [{other}], expected one of: v4, v3https"
        ))),
    }
}

pub(crate) fn header_str<'a>(
    request: &'a reqwest::Request,
    name: &str,
) -> Result<Option<&'a str>, Error> {
    request
        .headers()
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| Error::InvalidArgument(format!("header [{name}] is not valid ascii")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names() {
        assert_eq!(from_name("v4").unwrap().name(), "v4");
        assert_eq!(from_name("V3HTTPS").unwrap().name(), "v3https");
        assert!(matches!(from_name("v2"), Err(Error::InvalidArgument(_))));
    }
}
