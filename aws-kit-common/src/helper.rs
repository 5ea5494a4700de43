use crate::Error;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::macros::format_description;

/// 输出格式: Day, DD Mon YYYY hh:mm:ss GMT
///
/// eg: Thu, 13 Nov 2025 13:32:03 GMT
pub fn gmt_format(date_time: &OffsetDateTime) -> String {
    use time::format_description::well_known::Rfc2822;
    date_time
        .format(&Rfc2822)
        .expect("utc date time is always rfc2822 formattable")
        .replace("+0000", "GMT")
}

/// `x-amz-date` format: YYYYMMDDThhmmssZ
///
/// eg: 20150830T123600Z
pub fn amz_date_time(date_time: &OffsetDateTime) -> String {
    date_time
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]Z"
        ))
        .expect("utc date time is always formattable")
}

/// Credential scope date: YYYYMMDD
pub fn amz_date(date_time: &OffsetDateTime) -> String {
    date_time
        .format(format_description!("[year][month][day]"))
        .expect("utc date time is always formattable")
}

pub fn sign_hmac_sha256(secret: &[u8], str_to_sign: &[u8]) -> Vec<u8> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any size");
    mac.update(str_to_sign);
    mac.finalize().into_bytes().to_vec()
}

/// hex(sha256(bytes))
pub fn hash_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub async fn into_request_failed_error(resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await;
    match body {
        Ok(message) => Error::RequestAPIFailed {
            status: status.to_string(),
            message,
        },
        Err(e) => Error::Reqwest(e),
    }
}

pub async fn parse_json_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        return Err(into_request_failed_error(resp).await);
    }

    let text = resp.text().await?;
    // 部分api成功时body为空
    let text = if text.trim().is_empty() { "{}" } else { &text };
    let data = serde_json::from_str(text)
        .map_err(|e| Error::Common(format!("JSON parse error: {}", e)))?;
    Ok(data)
}
