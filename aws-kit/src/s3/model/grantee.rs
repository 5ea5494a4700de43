use crate::s3::{GranteeError, GranteeType, Group};
use quick_xml::escape::escape;
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A principal in an access control list: a canonical user id, an email
/// address or a group URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grantee {
    id: String,
    display_name: Option<String>,
    grantee_type: GranteeType,
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

impl Grantee {
    /// Type is inferred from `id`.
    pub fn new(id: impl Into<String>) -> Result<Self, GranteeError> {
        Self::with_type(id, None, None)
    }

    /// - `display_name`: only for canonical users; defaults to the id
    /// - `expected_type`: fails with [`GranteeError::UnexpectedValue`] when the inferred type differs
    pub fn with_type(
        id: impl Into<String>,
        display_name: Option<&str>,
        expected_type: Option<GranteeType>,
    ) -> Result<Self, GranteeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(GranteeError::InvalidArgument(
                "the grantee ID must be a non-empty string".to_owned(),
            ));
        }

        let grantee_type = if is_email(&id) {
            GranteeType::AmazonCustomerByEmail
        } else if Group::from_uri(&id).is_some() {
            GranteeType::Group
        } else {
            GranteeType::CanonicalUser
        };
        if let Some(expected) = expected_type {
            if expected != grantee_type {
                return Err(GranteeError::UnexpectedValue(format!(
                    "the type of the grantee [{grantee_type}] does not match the expected type [{expected}]"
                )));
            }
        }

        let mut grantee = Self {
            id,
            display_name: None,
            grantee_type,
        };
        if grantee.is_canonical_user() {
            let name = display_name.map_or_else(|| grantee.id.clone(), str::to_owned);
            grantee.display_name = Some(name);
        }
        Ok(grantee)
    }

    pub fn from_group(group: Group) -> Self {
        Self {
            id: group.uri().to_owned(),
            display_name: None,
            grantee_type: GranteeType::Group,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<&mut Self, GranteeError> {
        if !self.is_canonical_user() {
            return Err(GranteeError::Logic(
                "display names can only be set for canonical user grantees".to_owned(),
            ));
        }
        self.display_name = Some(name.into());
        Ok(self)
    }

    pub fn email_address(&self) -> Option<&str> {
        self.is_amazon_customer_by_email().then_some(self.id.as_str())
    }

    pub fn group_uri(&self) -> Option<&str> {
        self.is_group().then_some(self.id.as_str())
    }

    pub fn grantee_type(&self) -> GranteeType {
        self.grantee_type
    }

    pub fn is_canonical_user(&self) -> bool {
        self.grantee_type == GranteeType::CanonicalUser
    }

    pub fn is_amazon_customer_by_email(&self) -> bool {
        self.grantee_type == GranteeType::AmazonCustomerByEmail
    }

    pub fn is_group(&self) -> bool {
        self.grantee_type == GranteeType::Group
    }

    /// `id="…"`, `emailAddress="…"` or `uri="…"`, as used in `x-amz-grant-*` headers
    pub fn header_value(&self) -> String {
        format!("{}=\"{}\"", self.grantee_type.header_key(), self.id)
    }
}

impl TryFrom<&Value> for Grantee {
    type Error = GranteeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Grantee::new(s.as_str()),
            other => Err(GranteeError::InvalidIdType(format!(
                "the grantee ID must be provided as a string, got {other}"
            ))),
        }
    }
}

impl Display for Grantee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            r#"<Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="{}">"#,
            self.grantee_type
        )?;
        let id = escape(self.id.as_str());
        match self.grantee_type {
            GranteeType::CanonicalUser => {
                write!(f, "<ID>{id}</ID>")?;
                if let Some(name) = &self.display_name {
                    write!(f, "<DisplayName>{}</DisplayName>", escape(name.as_str()))?;
                }
            }
            GranteeType::AmazonCustomerByEmail => write!(f, "<EmailAddress>{id}</EmailAddress>")?,
            GranteeType::Group => write!(f, "<URI>{id}</URI>")?,
        }
        f.write_str("</Grantee>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_USERS: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

    #[test]
    fn canonical_user_grantee() {
        let g = Grantee::with_type("1234567890", Some("foo"), None).unwrap();
        assert_eq!(g.id(), "1234567890");
        assert_eq!(g.display_name(), Some("foo"));
        assert!(g.is_canonical_user());
        assert!(!g.is_amazon_customer_by_email());
        assert!(!g.is_group());
        assert_eq!(g.grantee_type(), GranteeType::CanonicalUser);
    }

    #[test]
    fn email_grantee() {
        let g = Grantee::new("foo@example.com").unwrap();
        assert_eq!(g.id(), "foo@example.com");
        assert_eq!(g.email_address(), Some("foo@example.com"));
        assert_eq!(g.display_name(), None);
        assert!(g.is_amazon_customer_by_email());
        assert_eq!(g.grantee_type(), GranteeType::AmazonCustomerByEmail);
    }

    #[test]
    fn group_grantee() {
        let g = Grantee::new(ALL_USERS).unwrap();
        assert_eq!(g.group_uri(), Some(ALL_USERS));
        assert_eq!(g.display_name(), None);
        assert!(g.is_group());
        assert_eq!(g, Grantee::from_group(Group::AllUsers));
    }

    #[test]
    fn non_string_id_is_rejected() {
        let err = Grantee::try_from(&json!(100)).unwrap_err();
        assert!(matches!(err, GranteeError::InvalidIdType(_)));
        assert!(matches!(Grantee::new(""), Err(GranteeError::InvalidArgument(_))));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let err = Grantee::with_type("foo@example.com", None, Some(GranteeType::Group)).unwrap_err();
        assert!(matches!(err, GranteeError::UnexpectedValue(_)));
    }

    #[test]
    fn display_name_only_for_canonical_users() {
        let mut g = Grantee::new("foo@example.com").unwrap();
        assert!(matches!(g.set_display_name("FooBar"), Err(GranteeError::Logic(_))));

        let mut g = Grantee::from_group(Group::AllUsers);
        assert!(matches!(g.set_display_name("FooBar"), Err(GranteeError::Logic(_))));
        assert_eq!(g.display_name(), None);

        let mut g = Grantee::new("1234567890").unwrap();
        assert_eq!(g.display_name(), Some("1234567890"));
        g.set_display_name("FooBar").unwrap();
        assert_eq!(g.display_name(), Some("FooBar"));
    }

    #[test]
    fn renders_xml() {
        let cases = [
            (
                "1234567890",
                r#"<Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="CanonicalUser"><ID>1234567890</ID><DisplayName>1234567890</DisplayName></Grantee>"#.to_owned(),
            ),
            (
                "foo@example.com",
                r#"<Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="AmazonCustomerByEmail"><EmailAddress>foo@example.com</EmailAddress></Grantee>"#.to_owned(),
            ),
            (
                ALL_USERS,
                format!(
                    r#"<Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="Group"><URI>{ALL_USERS}</URI></Grantee>"#
                ),
            ),
        ];
        for (id, xml) in cases {
            assert_eq!(Grantee::new(id).unwrap().to_string(), xml);
        }
    }

    #[test]
    fn header_values() {
        let cases = [
            ("user-id", r#"id="user-id""#.to_owned()),
            ("foo@example.com", r#"emailAddress="foo@example.com""#.to_owned()),
            (ALL_USERS, format!(r#"uri="{ALL_USERS}""#)),
        ];
        for (id, value) in cases {
            assert_eq!(Grantee::new(id).unwrap().header_value(), value);
        }
    }
}
