mod acp;
mod grant;
mod grantee;

pub use acp::Acp;
pub use grant::Grant;
pub use grantee::Grantee;
