//! Credentials used to sign requests.
//!
//! Credentials are resolved exactly once while a client is built: either passed
//! to the builder directly, produced by a user supplied provider function, or
//! read from the `key` / `secret` / `token` / `token.ttd` options. When the
//! options carry no key pair the standard environment variables are used.
//!
//! # Example
//! ```no_run
//! use aws_kit::credentials::Credentials;
//! use aws_kit::glacier;
//!
//! let client = glacier::Client::builder()
//!     .credentials(Credentials::new("AKID", "SECRET", None, None))
//!     .region("us-east-1")
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Collection;
use crate::options;
use time::OffsetDateTime;

pub const ENV_KEY: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Option names that map onto credential fields.
pub const CONFIG_KEYS: [&str; 4] = [
    options::KEY,
    options::SECRET,
    options::TOKEN,
    options::TOKEN_TTD,
];

#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub expires_at: Option<OffsetDateTime>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expires_at: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            expires_at,
        }
    }

    /// Builds credentials from the credential subset of `config`, falling back
    /// to the environment when no key pair is configured.
    pub fn from_config(config: &Collection) -> Result<Self, CredentialsError> {
        let config = config.get_all(CONFIG_KEYS);

        let expires_at = match config.get(options::TOKEN_TTD) {
            None => None,
            Some(v) => {
                let ts = v
                    .as_i64()
                    .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                    .ok_or_else(|| {
                        CredentialsError::Invalid(format!("[{}] must be a unix timestamp", options::TOKEN_TTD))
                    })?;
                Some(OffsetDateTime::from_unix_timestamp(ts).map_err(|e| {
                    CredentialsError::Invalid(format!("[{}] out of range: {e}", options::TOKEN_TTD))
                })?)
            }
        };

        match (config.get_str(options::KEY), config.get_str(options::SECRET)) {
            (Some(key), Some(secret)) => Ok(Self::new(
                key,
                secret,
                config.get_str(options::TOKEN).map(str::to_owned),
                expires_at,
            )),
            (Some(_), None) | (None, Some(_)) => Err(CredentialsError::Invalid(format!(
                "both [{}] and [{}] must be provided",
                options::KEY,
                options::SECRET
            ))),
            (None, None) => Self::from_env(),
        }
    }

    pub fn from_env() -> Result<Self, CredentialsError> {
        let key = std::env::var(ENV_KEY).ok().filter(|s| !s.is_empty());
        let secret = std::env::var(ENV_SECRET).ok().filter(|s| !s.is_empty());
        match (key, secret) {
            (Some(key), Some(secret)) => {
                let token = std::env::var(ENV_TOKEN).ok().filter(|s| !s.is_empty());
                Ok(Self::new(key, secret, token, None))
            }
            _ => Err(CredentialsError::Missing),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|t| t <= OffsetDateTime::now_utc())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CredentialsError {
    #[error(
        "no credentials were provided: set [key] and [secret], pass credentials to the builder, or set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
    )]
    Missing,
    #[error("invalid credentials: {0}")]
    Invalid(String),
    #[error("failed to load credentials: {0}")]
    Provider(String),
}
