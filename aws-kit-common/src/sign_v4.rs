//! AWS Signature Version 4 primitives.
//!
//! [签名文档](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html)
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedPayload
//! ```

use crate::helper::{amz_date, amz_date_time, hash_sha256, sign_hmac_sha256};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::BTreeMap;
use time::OffsetDateTime;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything except the RFC 3986 unreserved characters is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn uri_encode(s: &str) -> String {
    utf8_percent_encode(s, URI_ENCODE_SET).to_string()
}

/// `path` is the path as sent on the wire (already percent-encoded once); every
/// segment is encoded again, which is what non-S3 services expect.
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Sorted by key then value, both RFC 3986 encoded.
pub fn canonical_query_string(query: Option<&str>) -> String {
    let Some(query) = query else {
        return String::new();
    };
    let mut pairs = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// 返回 (CanonicalHeaders, SignedHeaders)
///
/// 传入的header名需为小写，value会去掉首尾空白并合并连续空格
pub fn canonical_headers(headers: &BTreeMap<String, String>) -> (String, String) {
    let mut can_headers = String::new();
    let mut signed_headers = Vec::with_capacity(headers.len());
    for (k, v) in headers {
        let value = v.split_whitespace().collect::<Vec<_>>().join(" ");
        can_headers.push_str(&format!("{k}:{value}\n"));
        signed_headers.push(k.as_str());
    }
    (can_headers, signed_headers.join(";"))
}

pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/aws4_request")
}

pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = sign_hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let date_region_key = sign_hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = sign_hmac_sha256(&date_region_key, service.as_bytes());
    sign_hmac_sha256(&date_region_service_key, b"aws4_request")
}

pub struct SignV4Param<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    /// lower-case name -> value, must already contain `host` and `x-amz-date`
    pub headers: &'a BTreeMap<String, String>,
    pub payload_hash: &'a str,
    pub date_time: &'a OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignV4Output {
    pub canonical_request: String,
    pub string_to_sign: String,
    pub signed_headers: String,
    pub signature: String,
    /// value of the `Authorization` header
    pub authorization: String,
}

pub fn sign_v4(param: SignV4Param<'_>) -> SignV4Output {
    let date = amz_date(param.date_time);
    let date_time = amz_date_time(param.date_time);

    let (can_headers, signed_headers) = canonical_headers(param.headers);
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        param.method,
        canonical_uri(param.path),
        canonical_query_string(param.query),
        can_headers,
        signed_headers,
        param.payload_hash
    );

    let scope = credential_scope(&date, param.region, param.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{date_time}\n{scope}\n{}",
        hash_sha256(canonical_request.as_bytes())
    );

    let key = signing_key(param.secret_access_key, &date, param.region, param.service);
    let signature = hex::encode(sign_hmac_sha256(&key, string_to_sign.as_bytes()));
    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        param.access_key_id
    );

    SignV4Output {
        canonical_request,
        string_to_sign,
        signed_headers,
        signature,
        authorization,
    }
}
