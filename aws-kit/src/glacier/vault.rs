//! [Vault操作](https://docs.aws.amazon.com/amazonglacier/latest/dev/vault-operations.html)

use super::{Client, Error, LOCATION, header_string, parse_json, required_header};
use bon::Builder;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVaultOutput {
    #[serde(rename = "VaultARN")]
    pub vault_arn: String,
    pub vault_name: String,
    pub creation_date: String,
    pub last_inventory_date: Option<String>,
    #[serde(default)]
    pub number_of_archives: u64,
    #[serde(default)]
    pub size_in_bytes: u64,
}

// region:    --- list vaults
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct ListVaults<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    pub(crate) client: &'a Client,
    #[serde(skip_serializing)]
    account_id: Option<&'a str>,
    // query
    marker: Option<&'a str>,
    /// 1-1000，默认1000
    limit: Option<u32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListVaultsOutput {
    #[serde(default)]
    pub vault_list: Vec<DescribeVaultOutput>,
    /// 为`None`时表示没有更多数据
    pub marker: Option<String>,
}

impl ListVaults<'_> {
    pub async fn send(&self) -> Result<ListVaultsOutput, Error> {
        let client = self.client;
        let path = client.vaults_path(self.account_id);

        let req = client.request(Method::GET, &path)?.query(self);
        let resp = client.send(req).await?;
        parse_json(resp).await
    }
}
// endregion: --- list vaults

// region:    --- create vault
#[derive(Builder)]
pub struct CreateVault<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    account_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVaultOutput {
    /// `/{account}/vaults/{vault}`
    pub location: String,
}

impl CreateVault<'_> {
    pub async fn send(&self) -> Result<CreateVaultOutput, Error> {
        let client = self.client;
        let path = client.vault_path(self.account_id, self.vault_name, "");

        let resp = client.send(client.request(Method::PUT, &path)?).await?;
        Ok(CreateVaultOutput {
            location: required_header(&resp, LOCATION)?,
        })
    }
}
// endregion: --- create vault

/// Vault操作
impl Client {
    pub fn list_vaults(&self) -> ListVaultsBuilder<'_> {
        ListVaults::builder(self)
    }

    /// 已存在同名vault时也会返回成功
    pub fn create_vault<'a>(&'a self, vault_name: &'a str) -> CreateVaultBuilder<'a> {
        CreateVault::builder(self, vault_name)
    }

    pub async fn describe_vault(&self, vault_name: &str) -> Result<DescribeVaultOutput, Error> {
        let path = self.vault_path(None, vault_name, "");
        let resp = self.send(self.request(Method::GET, &path)?).await?;
        parse_json(resp).await
    }

    /// vault中仍有archive或上次inventory之后写入过archive时无法删除
    pub async fn delete_vault(&self, vault_name: &str) -> Result<(), Error> {
        let path = self.vault_path(None, vault_name, "");
        let resp = self.send(self.request(Method::DELETE, &path)?).await?;
        tracing::debug!(
            vault_name,
            request_id = header_string(&resp, "x-amzn-requestid").as_deref(),
            "vault deleted"
        );
        Ok(())
    }
}
