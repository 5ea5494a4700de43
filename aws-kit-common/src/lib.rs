//! Shared helpers for `aws-kit`: time formatting, hashing, response parsing and
//! the AWS Signature Version 4 primitives.

mod error;
pub mod helper;
pub mod sign_v4;

pub use error::Error;
