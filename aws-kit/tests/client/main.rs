use aws_kit::client::{
    AwsClient, ClientBuilder, ExponentialBackoff, ExponentialBackoffOptionResolver,
    OptionResolver, SDK_USER_AGENT, SignatureOptionResolver, UserAgentListener,
};
use aws_kit::credentials::Credentials;
use aws_kit::signature::{Signature, SignatureV4};
use aws_kit::{Error, options};
use mockito::{Matcher, Server};
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn fast_backoff(max_retries: u32) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
        .build()
}

fn client_for(url: &str, backoff: ExponentialBackoff) -> AwsClient {
    ClientBuilder::default()
        .config(json!({
            "base_url": url,
            "region": "us-east-1",
            "service": "test",
        }))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .backoff(backoff)
        .build()
        .unwrap()
}

#[test]
fn base_url_skips_endpoint_lookup() {
    let client = ClientBuilder::default()
        .config(json!({
            "base_url": "http://localhost:8080/prefix",
            "region": "mars-central-1",
        }))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .build()
        .unwrap();

    assert_eq!(client.base_url().as_str(), "http://localhost:8080/prefix");
    assert!(client.backoff().is_some());
    assert!(client.has_subscriber(UserAgentListener::NAME));
    assert_eq!(
        client.config().get_str(options::CACHE_KEY_FILTER),
        Some(aws_kit::client::DEFAULT_KEY_FILTER)
    );
}

#[test]
fn empty_config_fails() {
    let err = ClientBuilder::default()
        .config(json!({}))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    assert!(err.to_string().contains("region"), "{err}");
}

#[test]
fn missing_endpoint_information_fails() {
    let err = ClientBuilder::default()
        .config(json!({"region": "us-east-1"}))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
}

#[test]
fn signature_resolver_replaces_signature_requirement() {
    let config = json!({"base_url": "http://localhost", "region": "us-east-1"});

    let err = ClientBuilder::default()
        .config(config.clone())
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("signature"), "{err}");

    let client = ClientBuilder::default()
        .config(config)
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature_resolver(SignatureOptionResolver::new(|_| {
            let signature: Arc<dyn Signature> =
                Arc::new(SignatureV4::with_scope("custom", "eu-west-1"));
            Ok(signature)
        }))
        .build()
        .unwrap();
    assert_eq!(client.signature().name(), "v4");
}

#[test]
fn signature_option_selects_strategy() {
    let client = ClientBuilder::default()
        .config(json!({
            "base_url": "https://example.com",
            "region": "us-east-1",
            "signature": "v3https",
        }))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .build()
        .unwrap();
    assert_eq!(client.signature().name(), "v3https");
}

#[test]
fn exponential_backoff_is_added_once() {
    let mut builder = ClientBuilder::default();
    builder.add_exponential_backoff().add_exponential_backoff();
    let count = builder
        .client_resolvers()
        .iter()
        .filter(|r| r.as_any().is::<ExponentialBackoffOptionResolver>())
        .count();
    assert_eq!(count, 1);
}

#[test]
fn backoff_logger_option_attaches_logger() {
    let client = ClientBuilder::default()
        .config(json!({
            "base_url": "http://localhost",
            "region": "us-east-1",
            "client.backoff.logger": "debug",
            "client.backoff.logger.template": "{code} #{retries}",
        }))
        .credentials(Credentials::new("AKID", "SECRET", None, None))
        .signature(Arc::new(SignatureV4::new()))
        .build()
        .unwrap();
    let logger = client.backoff().and_then(|b| b.logger()).unwrap();
    assert_eq!(logger.template(), "{code} #{retries}");
}

#[tokio::test]
async fn signs_with_configured_scope_and_user_agent() {
    assert!(UserAgentListener::user_agent().starts_with(SDK_USER_AGENT));

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/things")
        .match_header(
            "authorization",
            Matcher::Regex(r"^AWS4-HMAC-SHA256 Credential=AKID/\d{8}/us-east-1/test/aws4_request".to_owned()),
        )
        .match_header("x-amz-date", Matcher::Any)
        .match_header("user-agent", Matcher::Exact(UserAgentListener::user_agent()))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = client_for(&server.url(), fast_backoff(0));
    let req = client.request(Method::GET, "/things").unwrap().build().unwrap();
    let resp = client.send(req).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn retries_server_errors_until_success() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/flaky")
        .with_status(200)
        .with_body("done")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), fast_backoff(3));
    let req = client.request(Method::GET, "/flaky").unwrap().build().unwrap();
    let resp = client.send(req).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "done");
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/down")
        .with_status(500)
        .with_body("boom")
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server.url(), fast_backoff(2));
    let req = client.request(Method::GET, "/down").unwrap().build().unwrap();
    let err = client.send(req).await.unwrap_err();
    match err {
        Error::RequestFailed { status, body } => {
            assert!(status.starts_with("500"), "{status}");
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), fast_backoff(3));
    let req = client.request(Method::GET, "/missing").unwrap().build().unwrap();
    assert!(client.send(req).await.is_err());
    mock.assert_async().await;
}
