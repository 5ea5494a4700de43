use super::{Grant, Grantee};
use crate::s3::{GranteeError, GranteeType, Permission};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Access control policy: an owner plus a list of grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acp {
    owner: Grantee,
    grants: Vec<Grant>,
}

impl Acp {
    /// owner必须是canonical user
    pub fn new(owner: Grantee, grants: Vec<Grant>) -> Result<Self, GranteeError> {
        if !owner.is_canonical_user() {
            return Err(GranteeError::UnexpectedValue(format!(
                "the owner must be a canonical user, got [{}]",
                owner.grantee_type()
            )));
        }
        Ok(Self { owner, grants })
    }

    pub fn owner(&self) -> &Grantee {
        &self.owner
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn add_grant(&mut self, grant: Grant) -> &mut Self {
        self.grants.push(grant);
        self
    }

    /// 按权限合并为`x-amz-grant-*`请求头，同一权限的多个grantee用逗号分隔
    pub fn header_map(&self) -> Result<HeaderMap, GranteeError> {
        let mut grouped: BTreeMap<Permission, Vec<String>> = BTreeMap::new();
        for grant in &self.grants {
            grouped
                .entry(grant.permission())
                .or_default()
                .push(grant.grantee().header_value());
        }

        let mut headers = HeaderMap::with_capacity(grouped.len());
        for (permission, values) in grouped {
            let name = HeaderName::from_bytes(permission.header_name().as_bytes())
                .map_err(|e| GranteeError::InvalidArgument(e.to_string()))?;
            let value = HeaderValue::from_str(&values.join(", "))
                .map_err(|e| GranteeError::InvalidArgument(e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// 解析`GetBucketAcl`/`GetObjectAcl`返回的XML
    pub fn from_xml(xml: &str) -> Result<Self, GranteeError> {
        let doc: AccessControlPolicyXml = quick_xml::de::from_str(xml)?;
        let owner = Grantee::with_type(
            doc.owner.id,
            doc.owner.display_name.as_deref(),
            Some(GranteeType::CanonicalUser),
        )?;

        let grants = doc
            .access_control_list
            .map(|l| l.grant)
            .unwrap_or_default()
            .into_iter()
            .map(GrantXml::into_grant)
            .collect::<Result<Vec<_>, _>>()?;
        Acp::new(owner, grants)
    }
}

impl Display for Acp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let owner_id = quick_xml::escape::escape(self.owner.id());
        write!(f, "<AccessControlPolicy><Owner><ID>{owner_id}</ID>")?;
        if let Some(name) = self.owner.display_name() {
            write!(f, "<DisplayName>{}</DisplayName>", quick_xml::escape::escape(name))?;
        }
        f.write_str("</Owner><AccessControlList>")?;
        for grant in &self.grants {
            write!(f, "{grant}")?;
        }
        f.write_str("</AccessControlList></AccessControlPolicy>")
    }
}

// region:    --- xml
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccessControlPolicyXml {
    owner: OwnerXml,
    access_control_list: Option<GrantListXml>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OwnerXml {
    #[serde(rename = "ID")]
    id: String,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct GrantListXml {
    #[serde(rename = "Grant", default)]
    grant: Vec<GrantXml>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GrantXml {
    grantee: GranteeXml,
    permission: String,
}

/// 类型由子元素推断，不读取`xsi:type`
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GranteeXml {
    #[serde(rename = "ID")]
    id: Option<String>,
    display_name: Option<String>,
    email_address: Option<String>,
    #[serde(rename = "URI")]
    uri: Option<String>,
}

impl GrantXml {
    fn into_grant(self) -> Result<Grant, GranteeError> {
        let permission = self.permission.parse()?;
        let g = self.grantee;
        let grantee = match (g.id, g.email_address, g.uri) {
            (Some(id), _, _) => Grantee::with_type(
                id,
                g.display_name.as_deref(),
                Some(GranteeType::CanonicalUser),
            )?,
            (None, Some(email), _) => {
                Grantee::with_type(email, None, Some(GranteeType::AmazonCustomerByEmail))?
            }
            (None, None, Some(uri)) => Grantee::with_type(uri, None, Some(GranteeType::Group))?,
            (None, None, None) => {
                return Err(GranteeError::InvalidArgument(
                    "grantee has neither ID, EmailAddress nor URI".to_owned(),
                ));
            }
        };
        Ok(Grant::new(grantee, permission))
    }
}
// endregion: --- xml
