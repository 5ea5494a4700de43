//! Amazon Glacier
//!
//! API文档：<https://docs.aws.amazon.com/amazonglacier/latest/dev/amazon-glacier-api.html>
//!
//! 所有请求默认使用`accountId = "-"`，即凭证所属的账户；每个操作都可以单独指定。

pub mod archive;
pub mod job;
pub mod multipart;
pub mod notification;
pub mod vault;

mod error;
mod tree_hash;
mod upload_listener;

pub use error::{EXCEPTION_TYPES, Error, GlacierException, GlacierExceptionKind};
pub use tree_hash::{MB, TreeHash, combine_tree_hashes, linear_hash, tree_hash};
pub use upload_listener::{GlacierUploadListener, TREE_HASH};

use crate::client::{
    AwsClient, ClientBuilder as AwsClientBuilder, ClientConfig, ExponentialBackoff, ServiceClient,
};
use crate::credentials::Credentials;
use crate::exception::JsonRestExceptionParser;
use crate::options;
use crate::region::EndpointProvider;
use crate::signature::{Signature, SignatureV4};
use aws_kit_common::sign_v4::uri_encode;
use bon::bon;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const NAMESPACE: &str = "aws_kit::glacier";
pub const API_VERSION: &str = "2012-06-01";
pub const VERSION_HEADER: &str = "x-amz-glacier-version";

const ACCOUNT_ID: &str = "accountId";

pub(crate) const LOCATION: &str = "location";
pub(crate) const ARCHIVE_ID: &str = "x-amz-archive-id";
pub(crate) const ARCHIVE_DESCRIPTION: &str = "x-amz-archive-description";

#[derive(Debug, Clone)]
pub struct Client {
    inner: AwsClient,
}

impl ServiceClient for Client {
    fn from_config(config: ClientConfig) -> Result<Self, crate::Error> {
        let mut inner = AwsClient::new(config)?;

        // 所有操作都需要这个header
        let mut headers = HeaderMap::new();
        headers.insert(VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        inner.set_default_headers(headers);
        inner.add_subscriber(Arc::new(GlacierUploadListener));

        Ok(Self { inner })
    }

    fn aws_client_mut(&mut self) -> &mut AwsClient {
        &mut self.inner
    }
}

/// 创建Glacier客户端
#[bon]
impl Client {
    /// 需要`region`或`base_url`；凭证按顺序取`credentials`、`key`/`secret`、环境变量。
    ///
    /// `extra_options`可以传入其他配置项，如`{"curl.options": {"timeout": 30}}`，
    /// 与具名参数冲突时以具名参数为准。
    #[builder(on(String, into))]
    pub fn new(
        credentials: Option<Credentials>,
        key: Option<String>,
        secret: Option<String>,
        token: Option<String>,
        // 临时凭证过期的UNIX时间戳
        token_ttd: Option<i64>,
        region: Option<String>,
        scheme: Option<String>,
        base_url: Option<String>,
        endpoint_provider: Option<Arc<dyn EndpointProvider>>,
        signature: Option<Arc<dyn Signature>>,
        signature_service: Option<String>,
        signature_region: Option<String>,
        // `"true"`或CA证书路径
        ssl_cert: Option<String>,
        backoff: Option<ExponentialBackoff>,
        // `"debug"`时记录每次重试
        backoff_logger: Option<String>,
        backoff_logger_template: Option<String>,
        extra_options: Option<Value>,
    ) -> Result<Self, Error> {
        let mut config = match extra_options {
            None => Map::new(),
            Some(Value::Object(m)) => m,
            Some(_) => {
                return Err(crate::Error::InvalidConfigType(
                    "extra options must be an object".to_owned(),
                )
                .into());
            }
        };
        let named = [
            (options::KEY, key.map(Value::from)),
            (options::SECRET, secret.map(Value::from)),
            (options::TOKEN, token.map(Value::from)),
            (options::TOKEN_TTD, token_ttd.map(Value::from)),
            (options::REGION, region.map(Value::from)),
            (options::SCHEME, scheme.map(Value::from)),
            (options::BASE_URL, base_url.map(Value::from)),
            (options::SIGNATURE_SERVICE, signature_service.map(Value::from)),
            (options::SIGNATURE_REGION, signature_region.map(Value::from)),
            (options::SSL_CERT, ssl_cert.map(Value::from)),
            (options::BACKOFF_LOGGER, backoff_logger.map(Value::from)),
            (options::BACKOFF_LOGGER_TEMPLATE, backoff_logger_template.map(Value::from)),
        ];
        for (k, v) in named {
            if let Some(v) = v {
                config.insert(k.to_owned(), v);
            }
        }

        let mut builder = AwsClientBuilder::factory(Some(NAMESPACE))
            .config(Value::Object(config))
            .config_defaults(json!({
                "service": "glacier",
                "scheme": "https",
                "command.params": { "accountId": "-" },
            }))
            .signature(signature.unwrap_or_else(|| Arc::new(SignatureV4::new())))
            .exception_parser(Arc::new(JsonRestExceptionParser))
            .exception_types(EXCEPTION_TYPES);
        if let Some(c) = credentials {
            builder = builder.credentials(c);
        }
        if let Some(p) = endpoint_provider {
            builder = builder.endpoint_provider(p);
        }
        if let Some(b) = backoff {
            builder = builder.backoff(b);
        }

        let client = builder.build_as::<Self>()?;
        tracing::debug!(base_url = %client.inner.base_url(), "glacier client created");
        Ok(client)
    }

    pub fn inner(&self) -> &AwsClient {
        &self.inner
    }

    /// `command.params`中的`accountId`
    pub fn account_id(&self) -> String {
        self.resolve_account_id(None)
    }

    /// 操作参数中的`accountId`优先于`command.params`
    pub(crate) fn resolve_account_id(&self, account_id: Option<&str>) -> String {
        let mut params = Map::new();
        if let Some(a) = account_id {
            params.insert(ACCOUNT_ID.to_owned(), Value::from(a));
        }
        self.inner
            .merge_command_params(params)
            .get(ACCOUNT_ID)
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_owned()
    }

    /// `/{account}/vaults`
    pub(crate) fn vaults_path(&self, account_id: Option<&str>) -> String {
        format!("/{}/vaults", uri_encode(&self.resolve_account_id(account_id)))
    }

    /// `/{account}/vaults/{vault}{rest}`，各段会被编码
    pub(crate) fn vault_path(&self, account_id: Option<&str>, vault: &str, rest: &str) -> String {
        format!("{}/{}{rest}", self.vaults_path(account_id), uri_encode(vault))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        Ok(self.inner.request(method, path)?)
    }

    pub(crate) async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, Error> {
        let req = req.build()?;
        Ok(self.inner.send(req).await?)
    }
}

// region:    --- response helpers
pub(crate) fn header_string(resp: &reqwest::Response, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

pub(crate) fn required_header(resp: &reqwest::Response, name: &str) -> Result<String, Error> {
    header_string(resp, name)
        .ok_or_else(|| Error::Common(format!("response is missing the [{name}] header")))
}

pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    Ok(aws_kit_common::helper::parse_json_response(resp).await?)
}

/// 描述只允许ASCII可打印字符
pub(crate) fn description_header(description: &str) -> Result<HeaderValue, Error> {
    if !description.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(Error::Common(
            "archive description must only contain printable ASCII characters".to_owned(),
        ));
    }
    HeaderValue::from_str(description).map_err(|e| Error::Common(e.to_string()))
}
// endregion: --- response helpers

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::builder()
            .credentials(Credentials::new("AKID", "SECRET", None, None))
            .region("us-east-1")
            .build()
            .unwrap()
    }

    #[test]
    fn applies_glacier_defaults() {
        let c = client();
        assert_eq!(
            c.inner().base_url().as_str(),
            "https://glacier.us-east-1.amazonaws.com/"
        );
        assert_eq!(c.account_id(), "-");
        assert_eq!(c.inner().default_headers()[VERSION_HEADER], API_VERSION);
        assert_eq!(c.inner().client_type(), "aws_kit::glacier::GlacierClient");
        assert!(c.inner().has_subscriber(GlacierUploadListener::NAME));
        assert!(c.inner().has_subscriber(crate::exception::ExceptionListener::NAME));
        assert!(c.inner().has_subscriber(crate::client::UserAgentListener::NAME));
    }

    #[test]
    fn encodes_vault_path() {
        let c = client();
        assert_eq!(c.vault_path(None, "my vault", "/archives"), "/-/vaults/my%20vault/archives");
        assert_eq!(c.vault_path(Some("0123"), "v", ""), "/0123/vaults/v");
    }

    #[test]
    fn region_without_glacier_is_an_error() {
        let err = Client::builder()
            .credentials(Credentials::new("AKID", "SECRET", None, None))
            .region("sa-east-1")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Client(crate::Error::InvalidArgument(_))), "{err}");
    }

    #[test]
    fn account_id_from_command_params() {
        let c = Client::builder()
            .credentials(Credentials::new("AKID", "SECRET", None, None))
            .region("us-east-1")
            .extra_options(json!({"command.params": {"accountId": "0123456789"}}))
            .build()
            .unwrap();
        assert_eq!(c.account_id(), "0123456789");
        assert_eq!(c.vaults_path(None), "/0123456789/vaults");
        assert_eq!(c.vaults_path(Some("42")), "/42/vaults");
    }

    #[test]
    fn rejects_non_ascii_description() {
        assert!(description_header("photos 2012").is_ok());
        assert!(description_header("照片").is_err());
    }
}
