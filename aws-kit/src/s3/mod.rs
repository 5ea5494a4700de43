//! S3 访问控制列表（ACL）相关的值对象
//!
//! ```
//! use aws_kit::s3::{Grantee, Grant, Permission};
//!
//! let grantee = Grantee::new("foo@example.com").unwrap();
//! assert!(grantee.is_amazon_customer_by_email());
//! assert_eq!(grantee.header_value(), r#"emailAddress="foo@example.com""#);
//!
//! let grant = Grant::new(grantee, Permission::Read);
//! assert_eq!(grant.permission().header_name(), "x-amz-grant-read");
//! ```

mod enums;
mod error;
pub mod model;

pub use enums::{GranteeType, Group, Permission};
pub use error::GranteeError;
pub use model::{Acp, Grant, Grantee};
