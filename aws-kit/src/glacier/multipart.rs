//! [分段上传](https://docs.aws.amazon.com/amazonglacier/latest/dev/uploading-archive-mpu.html)
//!
//! 分段大小为1MB乘以2的幂，最小1MB，最大4GB；除最后一段外所有分段大小相同。

use super::archive::{ArchiveCreationOutput, to_header};
use super::{
    ARCHIVE_DESCRIPTION, Client, Error, LOCATION, MB, TREE_HASH, description_header,
    header_string, parse_json, required_header,
};
use crate::signature::CONTENT_SHA256;
use aws_kit_common::sign_v4::uri_encode;
use bon::Builder;
use reqwest::Method;
use reqwest::header::CONTENT_RANGE;
use serde::{Deserialize, Serialize};

const PART_SIZE: &str = "x-amz-part-size";
const ARCHIVE_SIZE: &str = "x-amz-archive-size";
const MULTIPART_UPLOAD_ID: &str = "x-amz-multipart-upload-id";

/// 1MB * 2^n，且不超过4GB
pub fn is_valid_part_size(size: u64) -> bool {
    let mb = MB as u64;
    size >= mb && size <= 4096 * mb && size % mb == 0 && (size / mb).is_power_of_two()
}

/// `bytes 0-1048575/*`
pub fn content_range(start: u64, len: u64) -> String {
    format!("bytes {start}-{}/*", start + len.saturating_sub(1))
}

fn upload_path(client: &Client, account_id: Option<&str>, vault: &str, upload_id: &str) -> String {
    client.vault_path(
        account_id,
        vault,
        &format!("/multipart-uploads/{}", uri_encode(upload_id)),
    )
}

// region:    --- initiate
#[derive(Builder)]
pub struct InitiateMultipartUpload<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    /// 单位字节
    part_size: u64,
    archive_description: Option<&'a str>,
    account_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateMultipartUploadOutput {
    pub location: Option<String>,
    pub upload_id: String,
}

impl InitiateMultipartUpload<'_> {
    pub async fn send(&self) -> Result<InitiateMultipartUploadOutput, Error> {
        if !is_valid_part_size(self.part_size) {
            return Err(Error::Common(format!(
                "invalid part size {}, must be 1MB multiplied by a power of two and at most 4GB",
                self.part_size
            )));
        }
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "/multipart-uploads");

        let mut req = client
            .request(Method::POST, &path)?
            .header(PART_SIZE, self.part_size.to_string());
        if let Some(d) = self.archive_description {
            req = req.header(ARCHIVE_DESCRIPTION, description_header(d)?);
        }

        let resp = client.send(req).await?;
        Ok(InitiateMultipartUploadOutput {
            location: header_string(&resp, LOCATION),
            upload_id: required_header(&resp, MULTIPART_UPLOAD_ID)?,
        })
    }
}
// endregion: --- initiate

// region:    --- upload part
#[derive(Builder)]
pub struct UploadMultipartPart<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    #[builder(start_fn)]
    pub(crate) upload_id: &'a str,
    /// 该分段在archive中的起始位置
    range_start: u64,
    #[builder(into)]
    body: Vec<u8>,
    account_id: Option<&'a str>,
    checksum: Option<&'a str>,
    content_sha256: Option<&'a str>,
}

impl UploadMultipartPart<'_> {
    /// 返回服务端计算的该分段tree hash
    pub async fn send(&self) -> Result<String, Error> {
        let client = self.client;
        let path = upload_path(client, self.account_id, self.vault_name, self.upload_id);

        let mut req = client
            .request(Method::PUT, &path)?
            .header(CONTENT_RANGE, content_range(self.range_start, self.body.len() as u64))
            .body(self.body.clone());
        if let Some(c) = self.checksum {
            req = req.header(TREE_HASH, to_header(c)?);
        }
        if let Some(c) = self.content_sha256 {
            req = req.header(CONTENT_SHA256, to_header(c)?);
        }

        let resp = client.send(req).await?;
        required_header(&resp, TREE_HASH)
    }
}
// endregion: --- upload part

// region:    --- complete
#[derive(Builder)]
pub struct CompleteMultipartUpload<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    #[builder(start_fn)]
    pub(crate) upload_id: &'a str,
    archive_size: u64,
    /// 整个archive的tree hash，可用[`combine_tree_hashes`](super::combine_tree_hashes)由分段的tree hash得到
    checksum: &'a str,
    account_id: Option<&'a str>,
}

impl CompleteMultipartUpload<'_> {
    pub async fn send(&self) -> Result<ArchiveCreationOutput, Error> {
        let client = self.client;
        let path = upload_path(client, self.account_id, self.vault_name, self.upload_id);

        let req = client
            .request(Method::POST, &path)?
            .header(ARCHIVE_SIZE, self.archive_size.to_string())
            .header(TREE_HASH, to_header(self.checksum)?);
        let resp = client.send(req).await?;
        ArchiveCreationOutput::from_response(&resp)
    }
}
// endregion: --- complete

// region:    --- list uploads
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct ListMultipartUploads<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) vault_name: &'a str,
    #[serde(skip_serializing)]
    account_id: Option<&'a str>,
    limit: Option<u32>,
    marker: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UploadListElement {
    pub multipart_upload_id: String,
    #[serde(rename = "VaultARN")]
    pub vault_arn: String,
    pub archive_description: Option<String>,
    pub part_size_in_bytes: u64,
    pub creation_date: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListMultipartUploadsOutput {
    #[serde(default)]
    pub uploads_list: Vec<UploadListElement>,
    pub marker: Option<String>,
}

impl ListMultipartUploads<'_> {
    pub async fn send(&self) -> Result<ListMultipartUploadsOutput, Error> {
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "/multipart-uploads");
        let resp = client
            .send(client.request(Method::GET, &path)?.query(self))
            .await?;
        parse_json(resp).await
    }
}
// endregion: --- list uploads

// region:    --- list parts
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct ListParts<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) vault_name: &'a str,
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) upload_id: &'a str,
    #[serde(skip_serializing)]
    account_id: Option<&'a str>,
    limit: Option<u32>,
    marker: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PartListElement {
    /// `0-1048575`
    pub range_in_bytes: String,
    #[serde(rename = "SHA256TreeHash")]
    pub sha256_tree_hash: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListPartsOutput {
    pub multipart_upload_id: String,
    #[serde(rename = "VaultARN")]
    pub vault_arn: String,
    pub archive_description: Option<String>,
    pub part_size_in_bytes: u64,
    pub creation_date: String,
    #[serde(default)]
    pub parts: Vec<PartListElement>,
    pub marker: Option<String>,
}

impl ListParts<'_> {
    pub async fn send(&self) -> Result<ListPartsOutput, Error> {
        let client = self.client;
        let path = upload_path(client, self.account_id, self.vault_name, self.upload_id);
        let resp = client
            .send(client.request(Method::GET, &path)?.query(self))
            .await?;
        parse_json(resp).await
    }
}
// endregion: --- list parts

/// 分段上传操作
impl Client {
    pub fn initiate_multipart_upload<'a>(
        &'a self,
        vault_name: &'a str,
    ) -> InitiateMultipartUploadBuilder<'a> {
        InitiateMultipartUpload::builder(self, vault_name)
    }

    pub fn upload_multipart_part<'a>(
        &'a self,
        vault_name: &'a str,
        upload_id: &'a str,
    ) -> UploadMultipartPartBuilder<'a> {
        UploadMultipartPart::builder(self, vault_name, upload_id)
    }

    pub fn complete_multipart_upload<'a>(
        &'a self,
        vault_name: &'a str,
        upload_id: &'a str,
    ) -> CompleteMultipartUploadBuilder<'a> {
        CompleteMultipartUpload::builder(self, vault_name, upload_id)
    }

    pub async fn abort_multipart_upload(
        &self,
        vault_name: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        let path = upload_path(self, None, vault_name, upload_id);
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }

    pub fn list_multipart_uploads<'a>(
        &'a self,
        vault_name: &'a str,
    ) -> ListMultipartUploadsBuilder<'a> {
        ListMultipartUploads::builder(self, vault_name)
    }

    pub fn list_parts<'a>(&'a self, vault_name: &'a str, upload_id: &'a str) -> ListPartsBuilder<'a> {
        ListParts::builder(self, vault_name, upload_id)
    }
}
