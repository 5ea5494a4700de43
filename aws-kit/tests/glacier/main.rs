use aws_kit::client::ExponentialBackoff;
use aws_kit::glacier::{self, Client, GlacierExceptionKind, tree_hash};
use mockito::{Matcher, Server};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

fn mock_client(url: &str) -> Client {
    Client::builder()
        .key("AKID")
        .secret("SECRET")
        .region("us-east-1")
        .base_url(url)
        .backoff(
            ExponentialBackoff::builder()
                .max_retries(1)
                .base_delay(Duration::from_millis(1))
                .build(),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn upload_archive_adds_checksums() {
    let mut server = Server::new_async().await;
    let body = b"hello glacier".to_vec();
    let checksum = tree_hash(&body);

    let mock = server
        .mock("POST", "/-/vaults/my-vault/archives")
        .match_header(glacier::VERSION_HEADER, glacier::API_VERSION)
        .match_header(glacier::TREE_HASH, checksum.as_str())
        .match_header("x-amz-content-sha256", checksum.as_str())
        .match_header("x-amz-archive-description", "greeting")
        .match_header("authorization", Matcher::Regex("/us-east-1/glacier/aws4_request".to_owned()))
        .with_status(201)
        .with_header("location", "/-/vaults/my-vault/archives/abc")
        .with_header(glacier::TREE_HASH, &checksum)
        .with_header("x-amz-archive-id", "abc")
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let out = client
        .upload_archive("my-vault")
        .archive_description("greeting")
        .body(body)
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(out.archive_id, "abc");
    assert_eq!(out.checksum, checksum);
    assert_eq!(out.location, "/-/vaults/my-vault/archives/abc");
    mock.assert_async().await;
}

#[tokio::test]
async fn registered_exception_is_mapped() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/-/vaults/missing")
        .with_status(404)
        .with_header("x-amzn-requestid", "req-1")
        .with_body(
            json!({
                "code": "ResourceNotFoundException",
                "message": "Vault not found for ARN: arn:aws:glacier:us-east-1:012345678901:vaults/missing",
                "type": "Client"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let err = client.describe_vault("missing").await.unwrap_err();
    assert_eq!(err.kind(), Some(GlacierExceptionKind::ResourceNotFound));
    let glacier::Error::Glacier(e) = err else {
        panic!("expected a glacier exception");
    };
    assert_eq!(e.response.exception_type, "ResourceNotFoundException");
    assert_eq!(e.response.request_id.as_deref(), Some("req-1"));
    assert_eq!(e.response.status, 404);
    mock.assert_async().await;
}

#[tokio::test]
async fn unknown_code_uses_default_exception() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/-/vaults/busy")
        .with_status(400)
        .with_header("x-amzn-errortype", "PolicyEnforcedException:http://internal.amazon.com/")
        .with_body("{}")
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let err = client.delete_vault("busy").await.unwrap_err();
    assert_eq!(err.kind(), Some(GlacierExceptionKind::Glacier));
    let glacier::Error::Glacier(e) = err else {
        panic!("expected a glacier exception");
    };
    assert_eq!(e.response.exception_type, "GlacierException");
    assert_eq!(e.response.code.as_deref(), Some("PolicyEnforcedException"));
}

#[tokio::test]
async fn list_vaults_sends_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/-/vaults")
        .match_query(Matcher::UrlEncoded("limit".to_owned(), "2".to_owned()))
        .with_status(200)
        .with_body(
            json!({
                "Marker": "next",
                "VaultList": [{
                    "CreationDate": "2012-02-20T17:01:45.198Z",
                    "LastInventoryDate": null,
                    "NumberOfArchives": 0,
                    "SizeInBytes": 0,
                    "VaultARN": "arn:aws:glacier:us-east-1:012345678901:vaults/examplevault",
                    "VaultName": "examplevault"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let out = client.list_vaults().limit(2).build().send().await.unwrap();
    assert_eq!(out.marker.as_deref(), Some("next"));
    assert_eq!(out.vault_list[0].vault_name, "examplevault");
    mock.assert_async().await;
}

#[tokio::test]
async fn initiate_job_posts_json() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/-/vaults/v/jobs")
        .match_body(Matcher::PartialJson(json!({
            "Type": "inventory-retrieval",
            "Format": "JSON"
        })))
        .with_status(202)
        .with_header("location", "/-/vaults/v/jobs/job-1")
        .with_header("x-amz-job-id", "job-1")
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let out = client
        .initiate_job("v")
        .job_type(glacier::job::INVENTORY_RETRIEVAL)
        .format("JSON")
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(out.job_id, "job-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn archive_retrieval_requires_archive_id() {
    let client = mock_client("http://127.0.0.1:1");
    let err = client
        .initiate_job("v")
        .job_type(glacier::job::ARCHIVE_RETRIEVAL)
        .build()
        .send()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("archive_id"), "{err}");
}

#[tokio::test]
async fn multipart_upload_round() {
    let mut server = Server::new_async().await;
    let part = vec![7u8; 1024];
    let part_hash = tree_hash(&part);

    let init = server
        .mock("POST", "/-/vaults/v/multipart-uploads")
        .match_header("x-amz-part-size", "1048576")
        .with_status(201)
        .with_header("x-amz-multipart-upload-id", "up-1")
        .create_async()
        .await;
    let upload = server
        .mock("PUT", "/-/vaults/v/multipart-uploads/up-1")
        .match_header("content-range", "bytes 0-1023/*")
        .match_header(glacier::TREE_HASH, part_hash.as_str())
        .with_status(204)
        .with_header(glacier::TREE_HASH, &part_hash)
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/-/vaults/v/multipart-uploads/up-1")
        .match_header("x-amz-archive-size", "1024")
        .with_status(201)
        .with_header("location", "/-/vaults/v/archives/a-1")
        .with_header(glacier::TREE_HASH, &part_hash)
        .with_header("x-amz-archive-id", "a-1")
        .create_async()
        .await;

    let client = mock_client(&server.url());
    let started = client
        .initiate_multipart_upload("v")
        .part_size(glacier::MB as u64)
        .build()
        .send()
        .await
        .unwrap();
    let hash = client
        .upload_multipart_part("v", &started.upload_id)
        .range_start(0)
        .body(part)
        .build()
        .send()
        .await
        .unwrap();
    let total = glacier::combine_tree_hashes(&[hash]).unwrap();
    let out = client
        .complete_multipart_upload("v", &started.upload_id)
        .archive_size(1024)
        .checksum(&total)
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(out.archive_id, "a-1");

    init.assert_async().await;
    upload.assert_async().await;
    complete.assert_async().await;
}

// region:    --- live
#[derive(Deserialize, Debug)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub vault_name: String,
}

impl AwsConfig {
    pub fn get_conf() -> Self {
        let file_str = std::fs::read_to_string("tests/glacier/config.toml").unwrap();
        toml::from_str(&file_str).unwrap()
    }
}

#[tokio::test]
#[ignore = "needs tests/glacier/config.toml with real credentials"]
async fn live_list_vaults() {
    let conf = AwsConfig::get_conf();
    let client = Client::builder()
        .key(conf.access_key_id)
        .secret(conf.secret_access_key)
        .region(conf.region)
        .build()
        .unwrap();

    let res = client.list_vaults().build().send().await;
    match res {
        Ok(s) => println!("res:\n{:#?}", s),
        Err(e) => println!("{}", e),
    }
    let res = client.describe_vault(&conf.vault_name).await;
    println!("{res:#?}");
}
// endregion: --- live
