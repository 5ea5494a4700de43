use super::GranteeError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Predefined groups that can be granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    AllUsers,
    AuthenticatedUsers,
    LogDelivery,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::AllUsers, Group::AuthenticatedUsers, Group::LogDelivery];

    pub fn uri(&self) -> &'static str {
        match self {
            Group::AllUsers => "http://acs.amazonaws.com/groups/global/AllUsers",
            Group::AuthenticatedUsers => "http://acs.amazonaws.com/groups/global/AuthenticatedUsers",
            Group::LogDelivery => "http://acs.amazonaws.com/groups/s3/LogDelivery",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.uri() == uri)
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranteeType {
    CanonicalUser,
    AmazonCustomerByEmail,
    Group,
}

impl GranteeType {
    /// Value of the `xsi:type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            GranteeType::CanonicalUser => "CanonicalUser",
            GranteeType::AmazonCustomerByEmail => "AmazonCustomerByEmail",
            GranteeType::Group => "Group",
        }
    }

    /// Key used in `x-amz-grant-*` header values.
    pub fn header_key(&self) -> &'static str {
        match self {
            GranteeType::CanonicalUser => "id",
            GranteeType::AmazonCustomerByEmail => "emailAddress",
            GranteeType::Group => "uri",
        }
    }
}

impl Display for GranteeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    FullControl,
    Write,
    WriteAcp,
    Read,
    ReadAcp,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::FullControl,
        Permission::Write,
        Permission::WriteAcp,
        Permission::Read,
        Permission::ReadAcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FullControl => "FULL_CONTROL",
            Permission::Write => "WRITE",
            Permission::WriteAcp => "WRITE_ACP",
            Permission::Read => "READ",
            Permission::ReadAcp => "READ_ACP",
        }
    }

    /// e.g. `x-amz-grant-full-control`
    pub fn header_name(&self) -> String {
        format!(
            "x-amz-grant-{}",
            self.as_str().to_ascii_lowercase().replace('_', "-")
        )
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = GranteeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| GranteeError::UnexpectedValue(format!("unknown permission [{s}]")))
    }
}
