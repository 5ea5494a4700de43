use super::Grantee;
use crate::s3::Permission;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    grantee: Grantee,
    permission: Permission,
}

impl Grant {
    pub fn new(grantee: Grantee, permission: Permission) -> Self {
        Self {
            grantee,
            permission,
        }
    }

    pub fn grantee(&self) -> &Grantee {
        &self.grantee
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }
}

impl Display for Grant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Grant>{}<Permission>{}</Permission></Grant>",
            self.grantee, self.permission
        )
    }
}
