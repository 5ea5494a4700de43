#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;

pub mod client;
pub mod config;
/// 凭证及其解析
pub mod credentials;
pub mod exception;
pub mod options;
pub mod region;
pub mod signature;

#[cfg(feature = "glacier")]
#[cfg_attr(docsrs, doc(cfg(feature = "glacier")))]
pub mod glacier;

#[cfg(feature = "s3")]
#[cfg_attr(docsrs, doc(cfg(feature = "s3")))]
pub mod s3;

pub use error::Error;
