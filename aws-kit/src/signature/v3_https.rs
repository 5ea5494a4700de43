use super::Signature;
use super::v4::SECURITY_TOKEN;
use crate::Error;
use crate::credentials::Credentials;
use aws_kit_common::helper::{gmt_format, sign_hmac_sha256};
use base64::{Engine, engine::general_purpose};
use reqwest::header::{DATE, HeaderValue};
use time::OffsetDateTime;

pub const AMZN_AUTHORIZATION: &str = "x-amzn-authorization";

/// AWS Signature Version 3 over HTTPS: an HMAC-SHA256 of the `Date` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureV3Https;

impl SignatureV3Https {
    pub fn sign_request_at(
        &self,
        request: &mut reqwest::Request,
        credentials: &Credentials,
        date_time: &OffsetDateTime,
    ) -> Result<(), Error> {
        let date = gmt_format(date_time);
        let signature = general_purpose::STANDARD.encode(sign_hmac_sha256(
            credentials.secret_access_key.as_bytes(),
            date.as_bytes(),
        ));
        let authorization = format!(
            "AWS3-HTTPS AWSAccessKeyId={},Algorithm=HmacSHA256,Signature={}",
            credentials.access_key_id, signature
        );

        let invalid = |s: &str| Error::InvalidArgument(format!("invalid header value [{s}]"));
        let headers = request.headers_mut();
        headers.insert(DATE, HeaderValue::from_str(&date).map_err(|_| invalid(&date))?);
        if let Some(token) = &credentials.session_token {
            headers.insert(
                SECURITY_TOKEN,
                HeaderValue::from_str(token).map_err(|_| invalid(token))?,
            );
        }
        let mut auth = HeaderValue::from_str(&authorization).map_err(|_| invalid(&authorization))?;
        auth.set_sensitive(true);
        headers.insert(AMZN_AUTHORIZATION, auth);
        Ok(())
    }
}

impl Signature for SignatureV3Https {
    fn name(&self) -> &'static str {
        "v3https"
    }

    fn sign_request(
        &self,
        request: &mut reqwest::Request,
        credentials: &Credentials,
    ) -> Result<(), Error> {
        self.sign_request_at(request, credentials, &OffsetDateTime::now_utc())
    }
}
