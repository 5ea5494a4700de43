use super::Subscriber;
use crate::Error;
use reqwest::header::{HeaderValue, USER_AGENT};

pub const SDK_USER_AGENT: &str = concat!("aws-kit/", env!("CARGO_PKG_VERSION"));

/// Appends the SDK identifier to the `User-Agent` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentListener;

impl UserAgentListener {
    pub const NAME: &'static str = "user_agent";

    pub fn user_agent() -> String {
        format!(
            "{SDK_USER_AGENT} ({}; {}) reqwest",
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }
}

impl Subscriber for UserAgentListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn before_send(&self, request: &mut reqwest::Request) -> Result<(), Error> {
        let current = request
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if current.contains(SDK_USER_AGENT) {
            return Ok(());
        }

        let ua = if current.is_empty() {
            Self::user_agent()
        } else {
            format!("{current} {}", Self::user_agent())
        };
        let value = HeaderValue::from_str(&ua)
            .map_err(|_| Error::InvalidArgument(format!("invalid user agent [{ua}]")))?;
        request.headers_mut().insert(USER_AGENT, value);
        Ok(())
    }
}
