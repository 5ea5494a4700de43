use super::{Signature, header_str};
use crate::Error;
use crate::credentials::Credentials;
use aws_kit_common::helper::{amz_date_time, hash_sha256};
use aws_kit_common::sign_v4::{SignV4Param, sign_v4};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;

pub const CONTENT_SHA256: &str = "x-amz-content-sha256";
pub const AMZ_DATE: &str = "x-amz-date";
pub const SECURITY_TOKEN: &str = "x-amz-security-token";

const DEFAULT_REGION: &str = "us-east-1";
// 这些header可能会被代理改写，不参与签名
const UNSIGNED_HEADERS: [&str; 3] = ["authorization", "user-agent", "expect"];

/// AWS Signature Version 4.
///
/// Without an explicit service/region the scope is derived from a
/// `service.region.amazonaws.com` host.
#[derive(Debug, Clone, Default)]
pub struct SignatureV4 {
    service_name: Option<String>,
    region_name: Option<String>,
}

impl SignatureV4 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(service: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service_name: Some(service.into()),
            region_name: Some(region.into()),
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region_name.as_deref()
    }

    fn scope_for(&self, host: &str) -> Result<(String, String), Error> {
        if let (Some(s), Some(r)) = (&self.service_name, &self.region_name) {
            return Ok((s.clone(), r.clone()));
        }
        let (service, region) = parse_host(host).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unable to determine the signing service and region from host [{host}]"
            ))
        })?;
        Ok((
            self.service_name.clone().unwrap_or(service),
            self.region_name.clone().unwrap_or(region),
        ))
    }

    pub fn sign_request_at(
        &self,
        request: &mut reqwest::Request,
        credentials: &Credentials,
        date_time: &OffsetDateTime,
    ) -> Result<(), Error> {
        let url = request.url().clone();
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidArgument(format!("request url [{url}] has no host")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        let (service, region) = self.scope_for(&host)?;

        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        headers.insert(AMZ_DATE, to_header_value(&amz_date_time(date_time))?);
        match &credentials.session_token {
            Some(token) => {
                headers.insert(SECURITY_TOKEN, to_header_value(token)?);
            }
            None => {
                headers.remove(SECURITY_TOKEN);
            }
        }

        let payload_hash = match header_str(request, CONTENT_SHA256)? {
            Some(h) => h.to_owned(),
            None => match request.body() {
                None => hash_sha256(b""),
                Some(body) => match body.as_bytes() {
                    Some(bytes) => hash_sha256(bytes),
                    None => "UNSIGNED-PAYLOAD".to_owned(),
                },
            },
        };

        let mut sign_headers = BTreeMap::new();
        for (name, value) in request.headers() {
            let name = name.as_str();
            if UNSIGNED_HEADERS.contains(&name) {
                continue;
            }
            let value = value.to_str().map_err(|_| {
                Error::InvalidArgument(format!("header [{name}] is not valid ascii"))
            })?;
            sign_headers
                .entry(name.to_owned())
                .and_modify(|existing: &mut String| {
                    existing.push(',');
                    existing.push_str(value.trim());
                })
                .or_insert_with(|| value.trim().to_owned());
        }
        sign_headers.insert("host".to_owned(), host);

        let out = sign_v4(SignV4Param {
            access_key_id: &credentials.access_key_id,
            secret_access_key: &credentials.secret_access_key,
            region: &region,
            service: &service,
            method: request.method().as_str(),
            path: url.path(),
            query: url.query(),
            headers: &sign_headers,
            payload_hash: &payload_hash,
            date_time,
        });
        tracing::trace!(canonical_request = %out.canonical_request, "signed request with v4");

        let mut auth = to_header_value(&out.authorization)?;
        auth.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, auth);
        Ok(())
    }
}

impl Signature for SignatureV4 {
    fn name(&self) -> &'static str {
        "v4"
    }

    fn sign_request(
        &self,
        request: &mut reqwest::Request,
        credentials: &Credentials,
    ) -> Result<(), Error> {
        self.sign_request_at(request, credentials, &OffsetDateTime::now_utc())
    }

    fn for_endpoint(&self, service: &str, region: &str) -> Option<Arc<dyn Signature>> {
        Some(Arc::new(Self {
            service_name: Some(self.service_name.clone().unwrap_or_else(|| service.to_owned())),
            region_name: Some(self.region_name.clone().unwrap_or_else(|| region.to_owned())),
        }))
    }
}

fn to_header_value(s: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(s).map_err(|_| Error::InvalidArgument(format!("invalid header value [{s}]")))
}

/// `glacier.us-west-2.amazonaws.com` -> (glacier, us-west-2)
fn parse_host(host: &str) -> Option<(String, String)> {
    let host = host.split(':').next()?;
    let prefix = host.strip_suffix(".amazonaws.com")?;
    let mut parts = prefix.split('.');
    let service = parts.next().filter(|s| !s.is_empty())?;
    let region = parts.next().unwrap_or(DEFAULT_REGION);
    Some((service.to_owned(), region.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Request};
    use time::macros::datetime;
    use url::Url;

    fn creds() -> Credentials {
        Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            None,
            None,
        )
    }

    #[test]
    fn derives_scope_from_host() {
        assert_eq!(
            parse_host("glacier.us-west-2.amazonaws.com"),
            Some(("glacier".to_owned(), "us-west-2".to_owned()))
        );
        assert_eq!(
            parse_host("iam.amazonaws.com"),
            Some(("iam".to_owned(), "us-east-1".to_owned()))
        );
        assert_eq!(parse_host("localhost"), None);
    }

    #[test]
    fn signs_vanilla_request() {
        let mut req = Request::new(
            Method::GET,
            Url::parse("https://example.amazonaws.com/").unwrap(),
        );
        let sig = SignatureV4::with_scope("service", "us-east-1");
        sig.sign_request_at(&mut req, &creds(), &datetime!(2015-08-30 12:36:00 UTC))
            .unwrap();

        assert_eq!(req.headers()[AMZ_DATE], "20150830T123600Z");
        assert_eq!(
            req.headers()[AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn adds_security_token_and_signs_it() {
        let mut req = Request::new(
            Method::GET,
            Url::parse("https://glacier.us-east-1.amazonaws.com/-/vaults").unwrap(),
        );
        let creds = Credentials::new("AKID", "SECRET", Some("TOKEN".to_owned()), None);
        SignatureV4::new()
            .sign_request(&mut req, &creds)
            .unwrap();

        assert_eq!(req.headers()[SECURITY_TOKEN], "TOKEN");
        let auth = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains("/us-east-1/glacier/aws4_request"), "{auth}");
        assert!(auth.contains("SignedHeaders=host;x-amz-date;x-amz-security-token"), "{auth}");
    }

    #[test]
    fn requires_scope_for_unknown_hosts() {
        let mut req = Request::new(Method::GET, Url::parse("http://127.0.0.1:1234/").unwrap());
        assert!(SignatureV4::new().sign_request(&mut req, &creds()).is_err());

        let bound = SignatureV4::new().for_endpoint("glacier", "eu-west-1").unwrap();
        bound.sign_request(&mut req, &creds()).unwrap();
        let auth = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains("/eu-west-1/glacier/aws4_request"), "{auth}");
    }

    #[test]
    fn explicit_scope_survives_endpoint_binding() {
        let sig = SignatureV4::with_scope("custom", "ap-south-1");
        let bound = sig.for_endpoint("glacier", "us-east-1").unwrap();
        let mut req = Request::new(Method::GET, Url::parse("http://localhost/").unwrap());
        bound.sign_request(&mut req, &creds()).unwrap();
        let auth = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains("/ap-south-1/custom/aws4_request"), "{auth}");
    }
}
