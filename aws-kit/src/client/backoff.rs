//! Exponential backoff applied by [`AwsClient::send`](super::AwsClient::send).

use rand::Rng;
use reqwest::{Method, StatusCode};
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];
pub const DEFAULT_LOG_TEMPLATE: &str =
    "{method} {url} - {code} - Retrying in {delay}ms (retry #{retries})";

/// Retry policy: `base * 2^(retries-1)` capped at `max_delay`, plus up to 10% jitter.
#[derive(Debug, Clone, bon::Builder)]
pub struct ExponentialBackoff {
    #[builder(default = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
    #[builder(default = Duration::from_millis(500))]
    base_delay: Duration,
    #[builder(default = Duration::from_secs(20))]
    max_delay: Duration,
    #[builder(default = DEFAULT_STATUS_CODES.to_vec())]
    status_codes: Vec<u16>,
    logger: Option<BackoffLogger>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExponentialBackoff {
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn status_codes(&self) -> &[u16] {
        &self.status_codes
    }

    pub fn logger(&self) -> Option<&BackoffLogger> {
        self.logger.as_ref()
    }

    pub fn set_logger(&mut self, logger: Option<BackoffLogger>) {
        self.logger = logger;
    }

    pub fn should_retry_status(&self, retries: u32, status: StatusCode) -> bool {
        retries < self.max_retries && self.status_codes.contains(&status.as_u16())
    }

    /// 超时和连接失败可以重试
    pub fn should_retry_error(&self, retries: u32, e: &reqwest::Error) -> bool {
        retries < self.max_retries && (e.is_timeout() || e.is_connect())
    }

    /// Delay before retry number `retries` (1-based).
    pub fn delay(&self, retries: u32) -> Duration {
        if retries == 0 {
            return Duration::ZERO;
        }
        let capped = self.delay_without_jitter(retries);

        let jitter_range = capped.as_millis() as u64 / 10;
        let jitter = if jitter_range > 0 {
            rand::rng().random_range(0..jitter_range)
        } else {
            0
        };
        capped + Duration::from_millis(jitter)
    }

    fn delay_without_jitter(&self, retries: u32) -> Duration {
        let factor = 2u32.saturating_pow(retries.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Writes one `tracing` line per retry.
#[derive(Debug, Clone)]
pub struct BackoffLogger {
    template: String,
}

impl Default for BackoffLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TEMPLATE)
    }
}

impl BackoffLogger {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// `code` is the status code, or the transport error for failed connections.
    pub fn render(
        &self,
        method: &Method,
        url: &str,
        code: &str,
        retries: u32,
        delay: Duration,
    ) -> String {
        self.template
            .replace("{method}", method.as_str())
            .replace("{url}", url)
            .replace("{code}", code)
            .replace("{retries}", &retries.to_string())
            .replace("{delay}", &delay.as_millis().to_string())
    }

    pub fn log(&self, method: &Method, url: &str, code: &str, retries: u32, delay: Duration) {
        tracing::warn!("{}", self.render(method, url, code, retries, delay));
    }
}
