//! [Job操作](https://docs.aws.amazon.com/amazonglacier/latest/dev/job-operations.html)
//!
//! 读取archive或inventory需要先发起job，job完成（通常3-5小时）后再获取输出。

use super::{ARCHIVE_DESCRIPTION, Client, Error, LOCATION, TREE_HASH, header_string, parse_json};
use aws_kit_common::sign_v4::uri_encode;
use bon::Builder;
use reqwest::Method;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, RANGE};
use serde::{Deserialize, Serialize};

pub const ARCHIVE_RETRIEVAL: &str = "archive-retrieval";
pub const INVENTORY_RETRIEVAL: &str = "inventory-retrieval";

const JOB_ID: &str = "x-amz-job-id";

// region:    --- initiate job
#[serde_with::skip_serializing_none]
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryRetrievalParameters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub marker: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateJob<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) vault_name: &'a str,
    #[serde(skip_serializing)]
    account_id: Option<&'a str>,
    /// `archive-retrieval`或`inventory-retrieval`
    #[serde(rename = "Type")]
    job_type: &'a str,
    /// `archive-retrieval`时必须
    archive_id: Option<&'a str>,
    description: Option<&'a str>,
    #[serde(rename = "SNSTopic")]
    sns_topic: Option<&'a str>,
    /// `archive-retrieval`时可以只取一部分，如`0-1048575`，需按MB对齐
    retrieval_byte_range: Option<&'a str>,
    /// `inventory-retrieval`时为`CSV`或`JSON`
    format: Option<&'a str>,
    inventory_retrieval_parameters: Option<InventoryRetrievalParameters>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateJobOutput {
    pub location: Option<String>,
    pub job_id: String,
}

impl InitiateJob<'_> {
    pub async fn send(&self) -> Result<InitiateJobOutput, Error> {
        if self.job_type == ARCHIVE_RETRIEVAL && self.archive_id.is_none() {
            return Err(Error::Common(
                "archive_id is required for archive-retrieval jobs".to_owned(),
            ));
        }
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "/jobs");

        let resp = client
            .send(client.request(Method::POST, &path)?.json(self))
            .await?;
        let job_id = header_string(&resp, JOB_ID)
            .ok_or_else(|| Error::Common(format!("response is missing the [{JOB_ID}] header")))?;
        Ok(InitiateJobOutput {
            location: header_string(&resp, LOCATION),
            job_id,
        })
    }
}
// endregion: --- initiate job

// region:    --- describe job
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GlacierJobDescription {
    pub job_id: String,
    pub job_description: Option<String>,
    pub action: String,
    pub archive_id: Option<String>,
    #[serde(rename = "VaultARN")]
    pub vault_arn: String,
    pub creation_date: String,
    pub completed: bool,
    /// `InProgress`、`Succeeded`或`Failed`
    pub status_code: String,
    pub status_message: Option<String>,
    pub archive_size_in_bytes: Option<u64>,
    pub inventory_size_in_bytes: Option<u64>,
    #[serde(rename = "SNSTopic")]
    pub sns_topic: Option<String>,
    pub completion_date: Option<String>,
    #[serde(rename = "SHA256TreeHash")]
    pub sha256_tree_hash: Option<String>,
    #[serde(rename = "ArchiveSHA256TreeHash")]
    pub archive_sha256_tree_hash: Option<String>,
    pub retrieval_byte_range: Option<String>,
}
// endregion: --- describe job

// region:    --- list jobs
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct ListJobs<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) vault_name: &'a str,
    #[serde(skip_serializing)]
    account_id: Option<&'a str>,
    // query
    limit: Option<u32>,
    marker: Option<&'a str>,
    /// `InProgress`、`Succeeded`或`Failed`
    statuscode: Option<&'a str>,
    completed: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListJobsOutput {
    #[serde(default)]
    pub job_list: Vec<GlacierJobDescription>,
    pub marker: Option<String>,
}

impl ListJobs<'_> {
    pub async fn send(&self) -> Result<ListJobsOutput, Error> {
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "/jobs");
        let resp = client
            .send(client.request(Method::GET, &path)?.query(self))
            .await?;
        parse_json(resp).await
    }
}
// endregion: --- list jobs

// region:    --- get job output
#[derive(Builder)]
pub struct GetJobOutput<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    #[builder(start_fn)]
    pub(crate) job_id: &'a str,
    account_id: Option<&'a str>,
    /// 如`bytes=0-1048575`
    range: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetJobOutputOutput {
    pub body: Vec<u8>,
    /// 200或206
    pub status: u16,
    /// 请求整个archive或按MB对齐的范围时才会返回
    pub checksum: Option<String>,
    pub content_range: Option<String>,
    pub content_type: Option<String>,
    pub archive_description: Option<String>,
}

impl GetJobOutput<'_> {
    pub async fn send(&self) -> Result<GetJobOutputOutput, Error> {
        let client = self.client;
        let path = client.vault_path(
            self.account_id,
            self.vault_name,
            &format!("/jobs/{}/output", uri_encode(self.job_id)),
        );

        let mut req = client.request(Method::GET, &path)?;
        if let Some(r) = self.range {
            req = req.header(RANGE, r);
        }
        let resp = client.send(req).await?;

        let status = resp.status().as_u16();
        let checksum = header_string(&resp, TREE_HASH);
        let content_range = header_string(&resp, CONTENT_RANGE.as_str());
        let content_type = header_string(&resp, CONTENT_TYPE.as_str());
        let archive_description = header_string(&resp, ARCHIVE_DESCRIPTION);
        let body = resp.bytes().await?.to_vec();

        Ok(GetJobOutputOutput {
            body,
            status,
            checksum,
            content_range,
            content_type,
            archive_description,
        })
    }
}
// endregion: --- get job output

/// Job操作
impl Client {
    pub fn initiate_job<'a>(&'a self, vault_name: &'a str) -> InitiateJobBuilder<'a> {
        InitiateJob::builder(self, vault_name)
    }

    pub async fn describe_job(
        &self,
        vault_name: &str,
        job_id: &str,
    ) -> Result<GlacierJobDescription, Error> {
        let path = self.vault_path(None, vault_name, &format!("/jobs/{}", uri_encode(job_id)));
        let resp = self.send(self.request(Method::GET, &path)?).await?;
        parse_json(resp).await
    }

    pub fn list_jobs<'a>(&'a self, vault_name: &'a str) -> ListJobsBuilder<'a> {
        ListJobs::builder(self, vault_name)
    }

    pub fn get_job_output<'a>(
        &'a self,
        vault_name: &'a str,
        job_id: &'a str,
    ) -> GetJobOutputBuilder<'a> {
        GetJobOutput::builder(self, vault_name, job_id)
    }
}
