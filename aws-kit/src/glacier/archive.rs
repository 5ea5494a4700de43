//! [Archive操作](https://docs.aws.amazon.com/amazonglacier/latest/dev/archive-operations.html)

use super::{
    ARCHIVE_DESCRIPTION, ARCHIVE_ID, Client, Error, LOCATION, TREE_HASH, description_header,
    required_header,
};
use crate::signature::CONTENT_SHA256;
use bon::Builder;
use reqwest::Method;
use reqwest::header::HeaderValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCreationOutput {
    pub location: String,
    /// 服务端计算的tree hash
    pub checksum: String,
    pub archive_id: String,
}

impl ArchiveCreationOutput {
    pub(crate) fn from_response(resp: &reqwest::Response) -> Result<Self, Error> {
        Ok(Self {
            location: required_header(resp, LOCATION)?,
            checksum: required_header(resp, TREE_HASH)?,
            archive_id: required_header(resp, ARCHIVE_ID)?,
        })
    }
}

// region:    --- upload archive
/// 单次上传，适合小于100MB的archive；校验和header未提供时自动计算
#[derive(Builder)]
pub struct UploadArchive<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    #[builder(into)]
    body: Vec<u8>,
    account_id: Option<&'a str>,
    archive_description: Option<&'a str>,
    /// `x-amz-sha256-tree-hash`
    checksum: Option<&'a str>,
    /// `x-amz-content-sha256`
    content_sha256: Option<&'a str>,
}

impl UploadArchive<'_> {
    pub async fn send(&self) -> Result<ArchiveCreationOutput, Error> {
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "/archives");

        let mut req = client
            .request(Method::POST, &path)?
            .body(self.body.clone());
        if let Some(d) = self.archive_description {
            req = req.header(ARCHIVE_DESCRIPTION, description_header(d)?);
        }
        if let Some(c) = self.checksum {
            req = req.header(TREE_HASH, to_header(c)?);
        }
        if let Some(c) = self.content_sha256 {
            req = req.header(CONTENT_SHA256, to_header(c)?);
        }

        let resp = client.send(req).await?;
        ArchiveCreationOutput::from_response(&resp)
    }
}
// endregion: --- upload archive

pub(crate) fn to_header(s: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(s).map_err(|_| Error::Common(format!("invalid header value [{s}]")))
}

/// Archive操作
impl Client {
    pub fn upload_archive<'a>(&'a self, vault_name: &'a str) -> UploadArchiveBuilder<'a> {
        UploadArchive::builder(self, vault_name)
    }

    pub async fn delete_archive(&self, vault_name: &str, archive_id: &str) -> Result<(), Error> {
        let path = self.vault_path(
            None,
            vault_name,
            &format!("/archives/{}", aws_kit_common::sign_v4::uri_encode(archive_id)),
        );
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }
}
