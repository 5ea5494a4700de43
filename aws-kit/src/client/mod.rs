//! Configured HTTP client shared by the service modules.
//!
//! [`ClientBuilder`] turns options into a [`ClientConfig`] and hands it to a
//! [`ServiceClient`] constructor; every service client wraps an [`AwsClient`],
//! which signs, sends and retries requests.

mod backoff;
mod builder;
mod cache;
mod resolver;
mod subscriber;
mod user_agent;

pub use backoff::{
    BackoffLogger, DEFAULT_LOG_TEMPLATE, DEFAULT_MAX_RETRIES, DEFAULT_STATUS_CODES,
    ExponentialBackoff,
};
pub use builder::ClientBuilder;
pub use cache::{CacheKeyFilter, DEFAULT_KEY_FILTER};
pub use resolver::{
    CredentialsOptionResolver, ExponentialBackoffOptionResolver, OptionResolver,
    SignatureOptionResolver,
};
pub use subscriber::Subscriber;
pub use user_agent::{SDK_USER_AGENT, UserAgentListener};

use crate::Error;
use crate::config::Collection;
use crate::credentials::{Credentials, CredentialsError};
use crate::exception::RawResponse;
use crate::options;
use crate::signature::Signature;
use reqwest::header::{HeaderMap, HeaderName};
use reqwest::{Method, RequestBuilder};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CLIENT_TYPE: &str = "aws_kit::client::DefaultClient";

/// Everything a client constructor receives from the builder.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub options: Collection,
    pub credentials: Option<Credentials>,
    pub signature: Option<Arc<dyn Signature>>,
    pub backoff: Option<ExponentialBackoff>,
    /// e.g. `aws_kit::glacier::GlacierClient`
    pub client_type: String,
}

impl ClientConfig {
    pub fn new(options: Collection) -> Self {
        Self {
            options,
            credentials: None,
            signature: None,
            backoff: None,
            client_type: DEFAULT_CLIENT_TYPE.to_owned(),
        }
    }
}

/// Constructor used by [`ClientBuilder::build_as`].
pub trait ServiceClient: Sized {
    fn from_config(config: ClientConfig) -> Result<Self, Error>;

    fn aws_client_mut(&mut self) -> &mut AwsClient;
}

#[derive(Debug, Clone)]
pub struct AwsClient {
    credentials: Credentials,
    signature: Arc<dyn Signature>,
    config: Collection,
    backoff: Option<ExponentialBackoff>,
    subscribers: Vec<Arc<dyn Subscriber>>,
    default_headers: HeaderMap,
    header_blacklist: Vec<String>,
    base_url: Url,
    client_type: String,
    http_client: reqwest::Client,
}

impl ServiceClient for AwsClient {
    fn from_config(config: ClientConfig) -> Result<Self, Error> {
        AwsClient::new(config)
    }

    fn aws_client_mut(&mut self) -> &mut AwsClient {
        self
    }
}

impl AwsClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let ClientConfig {
            options,
            credentials,
            signature,
            backoff,
            client_type,
        } = config;

        let credentials = credentials.ok_or(CredentialsError::Missing)?;
        let signature = signature.ok_or_else(|| {
            Error::InvalidArgument("A signature has not been provided.".to_owned())
        })?;
        let base_url = options
            .get_str(options::BASE_URL)
            .ok_or_else(|| Error::InvalidArgument(format!("[{}] is not set", options::BASE_URL)))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidArgument(format!("invalid base url [{base_url}]: {e}")))?;

        let header_blacklist = options
            .get(options::HEADER_BLACKLIST)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_ascii_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        let http_client = build_http_client(&options)?;

        Ok(Self {
            credentials,
            signature,
            config: options,
            backoff,
            subscribers: Vec::new(),
            default_headers: HeaderMap::new(),
            header_blacklist,
            base_url,
            client_type,
            http_client,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn signature(&self) -> &Arc<dyn Signature> {
        &self.signature
    }

    pub fn config(&self) -> &Collection {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Collection {
        &mut self.config
    }

    pub fn backoff(&self) -> Option<&ExponentialBackoff> {
        self.backoff.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn client_type(&self) -> &str {
        &self.client_type
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn subscribers(&self) -> &[Arc<dyn Subscriber>] {
        &self.subscribers
    }

    pub fn has_subscriber(&self, name: &str) -> bool {
        self.subscribers.iter().any(|s| s.name() == name)
    }

    pub fn add_subscriber(&mut self, subscriber: Arc<dyn Subscriber>) -> &mut Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Headers added to every request that does not set them itself.
    pub fn set_default_headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.default_headers = headers;
        self
    }

    /// Defaults from the `command.params` option, e.g. `{"accountId": "-"}`.
    pub fn command_params(&self) -> Map<String, Value> {
        self.config
            .get(options::COMMAND_PARAMS)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// `params` layered over the `command.params` defaults; nulls never shadow a default.
    pub fn merge_command_params(&self, params: Map<String, Value>) -> Map<String, Value> {
        let mut merged = self.command_params();
        for (k, v) in params {
            if !v.is_null() {
                merged.insert(k, v);
            }
        }
        merged
    }

    pub fn command_param(&self, name: &str) -> Option<String> {
        self.config
            .get(options::COMMAND_PARAMS)
            .and_then(|p| p.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// Key under which a GET response to `request` could be cached.
    pub fn cache_key(&self, request: &reqwest::Request) -> Option<String> {
        let filter = self.config.get_str(options::CACHE_KEY_FILTER).unwrap_or_default();
        CacheKeyFilter::parse(filter).cache_key(request)
    }

    /// `path` is appended to the base URL, keeping any prefix it carries.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!("{base}/{}", path.trim_start_matches('/'));
        let url = Url::parse(&url)
            .map_err(|e| Error::InvalidArgument(format!("invalid request url [{url}]: {e}")))?;
        Ok(self.http_client.request(method, url))
    }

    // region:    --- send
    /// Signs and sends `request`, retrying per the backoff policy.
    ///
    /// Error responses that are not retried are translated by the subscribers;
    /// untranslated ones become [`Error::RequestFailed`].
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, Error> {
        let mut retries = 0;
        loop {
            // 流式body无法复制，只能发送一次
            let attempt = match request.try_clone() {
                Some(r) => r,
                None => return self.send_once(request).await,
            };
            let method = attempt.method().clone();
            let url = attempt.url().to_string();

            match self.execute(attempt).await {
                Ok(resp) if !is_error(&resp) => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    match &self.backoff {
                        Some(b) if b.should_retry_status(retries, status) => {
                            retries += 1;
                            self.wait(b, &method, &url, status.as_str(), retries).await;
                        }
                        _ => return Err(self.translate_error(resp).await),
                    }
                }
                Err(Error::Reqwest(e)) => match &self.backoff {
                    Some(b) if b.should_retry_error(retries, &e) => {
                        retries += 1;
                        self.wait(b, &method, &url, &e.to_string(), retries).await;
                    }
                    _ => return Err(Error::Reqwest(e)),
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: reqwest::Request) -> Result<reqwest::Response, Error> {
        let resp = self.execute(request).await?;
        if is_error(&resp) {
            return Err(self.translate_error(resp).await);
        }
        Ok(resp)
    }

    async fn wait(
        &self,
        backoff: &ExponentialBackoff,
        method: &Method,
        url: &str,
        code: &str,
        retries: u32,
    ) {
        let delay = backoff.delay(retries);
        match backoff.logger() {
            Some(logger) => logger.log(method, url, code, retries, delay),
            None => tracing::debug!(%method, url, code, retries, ?delay, "retrying request"),
        }
        tokio::time::sleep(delay).await;
    }

    async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response, Error> {
        self.prepare(&mut request)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        Ok(self.http_client.execute(request).await?)
    }

    /// Default headers, subscriber hooks, blacklist, then the signature.
    pub fn prepare(&self, request: &mut reqwest::Request) -> Result<(), Error> {
        for (name, value) in &self.default_headers {
            if !request.headers().contains_key(name) {
                request.headers_mut().insert(name.clone(), value.clone());
            }
        }

        for s in &self.subscribers {
            s.before_send(request)?;
        }

        for name in &self.header_blacklist {
            if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
                request.headers_mut().remove(name);
            }
        }

        self.signature.sign_request(request, &self.credentials)
    }

    async fn translate_error(&self, resp: reqwest::Response) -> Error {
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return Error::Reqwest(e),
        };
        let raw = RawResponse {
            status,
            headers,
            body,
        };

        self.subscribers
            .iter()
            .find_map(|s| s.on_request_error(&raw))
            .unwrap_or_else(|| Error::RequestFailed {
                status: raw.status.to_string(),
                body: raw.body,
            })
    }
    // endregion: --- send
}

fn is_error(resp: &reqwest::Response) -> bool {
    resp.status().is_client_error() || resp.status().is_server_error()
}

/// `curl.options` 和 `ssl.ca_bundle` 映射到 reqwest
fn build_http_client(options: &Collection) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder();

    if let Some(path) = options.get_str(options::SSL_CA_BUNDLE) {
        let pem = std::fs::read(path).map_err(|e| {
            Error::InvalidArgument(format!("unable to read the CA bundle [{path}]: {e}"))
        })?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| Error::InvalidArgument(format!("invalid CA bundle [{path}]: {e}")))?;
        builder = builder.add_root_certificate(cert);
    }

    if let Some(curl) = options.get(options::CURL_OPTIONS) {
        let curl = curl.as_object().ok_or_else(|| {
            Error::InvalidConfigType(format!("[{}] must be an object", options::CURL_OPTIONS))
        })?;
        let seconds = |key: &str| -> Result<Option<Duration>, Error> {
            match curl.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => v
                    .as_f64()
                    .and_then(|s| Duration::try_from_secs_f64(s).ok())
                    .map(Some)
                    .ok_or_else(|| {
                        Error::InvalidConfigType(format!(
                            "[{}.{key}] must be a non-negative number of seconds within range",
                            options::CURL_OPTIONS
                        ))
                    }),
            }
        };
        if let Some(d) = seconds("timeout")? {
            builder = builder.timeout(d);
        }
        if let Some(d) = seconds("connect_timeout")? {
            builder = builder.connect_timeout(d);
        }
        if let Some(proxy) = curl.get("proxy").and_then(Value::as_str) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::SignatureV4;
    use serde_json::json;

    fn client(options: Value) -> AwsClient {
        let mut config = ClientConfig::new(Collection::from_value(options).unwrap());
        config.credentials = Some(Credentials::new("AKID", "SECRET", None, None));
        config.signature = Some(Arc::new(SignatureV4::with_scope("glacier", "us-east-1")));
        AwsClient::new(config).unwrap()
    }

    #[test]
    fn requires_base_url() {
        let mut config = ClientConfig::new(Collection::new());
        config.credentials = Some(Credentials::new("AKID", "SECRET", None, None));
        config.signature = Some(Arc::new(SignatureV4::new()));
        assert!(matches!(AwsClient::new(config), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn request_keeps_base_path() {
        let c = client(json!({"base_url": "http://localhost:8080/prefix/"}));
        let req = c.request(Method::GET, "/-/vaults").unwrap().build().unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:8080/prefix/-/vaults");
    }

    #[test]
    fn prepare_strips_blacklisted_headers_and_signs() {
        let mut c = client(json!({
            "base_url": "https://glacier.us-east-1.amazonaws.com",
            "header.blacklist": ["Expect"],
        }));
        let mut defaults = HeaderMap::new();
        defaults.insert("x-amz-glacier-version", "2012-06-01".parse().unwrap());
        c.set_default_headers(defaults);

        let mut req = c
            .request(Method::GET, "/-/vaults")
            .unwrap()
            .header("expect", "100-continue")
            .build()
            .unwrap();
        c.prepare(&mut req).unwrap();

        assert!(req.headers().get("expect").is_none());
        assert_eq!(req.headers()["x-amz-glacier-version"], "2012-06-01");
        let auth = req.headers()["authorization"].to_str().unwrap();
        assert!(auth.contains("x-amz-glacier-version"), "{auth}");
    }

    #[test]
    fn reads_command_params() {
        let c = client(json!({
            "base_url": "https://glacier.us-east-1.amazonaws.com",
            "command.params": {"accountId": "-"},
        }));
        assert_eq!(c.command_param("accountId").as_deref(), Some("-"));
        assert_eq!(c.command_params().len(), 1);

        let mut params = Map::new();
        params.insert("accountId".to_owned(), json!("0123"));
        params.insert("limit".to_owned(), json!(10));
        params.insert("marker".to_owned(), Value::Null);
        let merged = c.merge_command_params(params);
        assert_eq!(merged["accountId"], "0123");
        assert_eq!(merged["limit"], 10);
        assert!(!merged.contains_key("marker"));
        assert_eq!(c.merge_command_params(Map::new())["accountId"], "-");
    }

    #[test]
    fn rejects_bad_curl_options() {
        let mut config = ClientConfig::new(
            Collection::from_value(json!({
                "base_url": "https://example.com",
                "curl.options": {"timeout": "soon"},
            }))
            .unwrap(),
        );
        config.credentials = Some(Credentials::new("AKID", "SECRET", None, None));
        config.signature = Some(Arc::new(SignatureV4::new()));
        assert!(matches!(AwsClient::new(config), Err(Error::InvalidConfigType(_))));
    }

    #[test]
    fn out_of_range_timeouts_are_config_errors() {
        for curl in [
            json!({"timeout": 1e300}),
            json!({"connect_timeout": -1}),
        ] {
            let mut config = ClientConfig::new(
                Collection::from_value(json!({
                    "base_url": "https://example.com",
                    "curl.options": curl,
                }))
                .unwrap(),
            );
            config.credentials = Some(Credentials::new("AKID", "SECRET", None, None));
            config.signature = Some(Arc::new(SignatureV4::new()));
            assert!(matches!(AwsClient::new(config), Err(Error::InvalidConfigType(_))));
        }

        let c = client(json!({
            "base_url": "https://example.com",
            "curl.options": {"timeout": 2.5, "connect_timeout": 1},
        }));
        assert_eq!(c.base_url().as_str(), "https://example.com/");
    }
}
