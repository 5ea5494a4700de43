//! Vault通知配置：任务完成时向SNS topic发送消息

use super::{Client, Error, parse_json};
use bon::Builder;
use reqwest::Method;
use serde::{Deserialize, Serialize};

pub const ARCHIVE_RETRIEVAL_COMPLETED: &str = "ArchiveRetrievalCompleted";
pub const INVENTORY_RETRIEVAL_COMPLETED: &str = "InventoryRetrievalCompleted";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VaultNotificationConfig {
    #[serde(rename = "SNSTopic")]
    pub sns_topic: String,
    pub events: Vec<String>,
}

#[derive(Builder)]
pub struct SetVaultNotifications<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    #[builder(start_fn)]
    pub(crate) vault_name: &'a str,
    #[builder(into)]
    sns_topic: String,
    /// 默认两种事件都通知
    events: Option<Vec<String>>,
    account_id: Option<&'a str>,
}

impl SetVaultNotifications<'_> {
    pub async fn send(&self) -> Result<(), Error> {
        let client = self.client;
        let path = client.vault_path(
            self.account_id,
            self.vault_name,
            "/notification-configuration",
        );
        let config = VaultNotificationConfig {
            sns_topic: self.sns_topic.clone(),
            events: self.events.clone().unwrap_or_else(|| {
                vec![
                    ARCHIVE_RETRIEVAL_COMPLETED.to_owned(),
                    INVENTORY_RETRIEVAL_COMPLETED.to_owned(),
                ]
            }),
        };

        let req = client.request(Method::PUT, &path)?.json(&config);
        client.send(req).await?;
        Ok(())
    }
}

/// Vault通知操作
impl Client {
    pub fn set_vault_notifications<'a>(
        &'a self,
        vault_name: &'a str,
    ) -> SetVaultNotificationsBuilder<'a> {
        SetVaultNotifications::builder(self, vault_name)
    }

    /// 没有配置时返回`ResourceNotFound`
    pub async fn get_vault_notifications(
        &self,
        vault_name: &str,
    ) -> Result<VaultNotificationConfig, Error> {
        let path = self.vault_path(None, vault_name, "/notification-configuration");
        let resp = self.send(self.request(Method::GET, &path)?).await?;
        parse_json(resp).await
    }

    pub async fn delete_vault_notifications(&self, vault_name: &str) -> Result<(), Error> {
        let path = self.vault_path(None, vault_name, "/notification-configuration");
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }
}
