//! Build steps that fill the typed slots of a [`ClientConfig`].

use super::ClientConfig;
use super::backoff::{BackoffLogger, ExponentialBackoff};
use crate::Error;
use crate::config::Collection;
use crate::credentials::{Credentials, CredentialsError};
use crate::options;
use crate::signature::{self, Signature};
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub type CredentialsFn = dyn Fn(&Collection) -> Result<Credentials, CredentialsError> + Send + Sync;
pub type SignatureFn = dyn Fn(&Collection) -> Result<Arc<dyn Signature>, Error> + Send + Sync;
pub type BackoffFn = dyn Fn(&Collection) -> ExponentialBackoff + Send + Sync;

pub trait OptionResolver: Any + Send + Sync + Debug {
    fn resolve(&self, config: &mut ClientConfig) -> Result<(), Error>;

    fn as_any(&self) -> &dyn Any;
}

// region:    --- credentials
/// Keeps explicitly supplied credentials, otherwise calls the provider once.
#[derive(Clone)]
pub struct CredentialsOptionResolver {
    provider: Arc<CredentialsFn>,
}

impl CredentialsOptionResolver {
    pub fn new(
        provider: impl Fn(&Collection) -> Result<Credentials, CredentialsError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl Default for CredentialsOptionResolver {
    fn default() -> Self {
        Self::new(Credentials::from_config)
    }
}

impl Debug for CredentialsOptionResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsOptionResolver").finish_non_exhaustive()
    }
}

impl OptionResolver for CredentialsOptionResolver {
    fn resolve(&self, config: &mut ClientConfig) -> Result<(), Error> {
        if config.credentials.is_none() {
            let credentials = (self.provider)(&config.options)?;
            config.credentials = Some(credentials);
        }
        if let Some(c) = &config.credentials {
            if c.is_expired() {
                tracing::warn!(access_key_id = %c.access_key_id, "credentials are already expired");
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
// endregion: --- credentials

// region:    --- signature
/// Picks the signature named by the `signature` option, else an already
/// supplied one, else the provider's; then binds endpoint scoped signatures
/// to the signing service and region.
#[derive(Clone)]
pub struct SignatureOptionResolver {
    provider: Arc<SignatureFn>,
}

impl SignatureOptionResolver {
    pub fn new(
        provider: impl Fn(&Collection) -> Result<Arc<dyn Signature>, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl Debug for SignatureOptionResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureOptionResolver").finish_non_exhaustive()
    }
}

impl OptionResolver for SignatureOptionResolver {
    fn resolve(&self, config: &mut ClientConfig) -> Result<(), Error> {
        let signature = match (config.options.get_str(options::SIGNATURE), &config.signature) {
            (Some(name), _) => signature::from_name(name)?,
            (None, Some(s)) => s.clone(),
            (None, None) => (self.provider)(&config.options)?,
        };

        let service = config
            .options
            .get_str(options::SIGNATURE_SERVICE)
            .or_else(|| config.options.get_str(options::SERVICE));
        let region = config
            .options
            .get_str(options::SIGNATURE_REGION)
            .or_else(|| config.options.get_str(options::REGION));
        let signature = match (service, region) {
            (Some(service), Some(region)) => signature
                .for_endpoint(service, region)
                .unwrap_or(signature),
            _ => signature,
        };

        tracing::debug!(signature = signature.name(), "signature resolved");
        config.signature = Some(signature);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
// endregion: --- signature

// region:    --- backoff
/// Installs the retry policy and its logger.
#[derive(Clone)]
pub struct ExponentialBackoffOptionResolver {
    provider: Arc<BackoffFn>,
}

impl ExponentialBackoffOptionResolver {
    pub fn new(provider: impl Fn(&Collection) -> ExponentialBackoff + Send + Sync + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl Default for ExponentialBackoffOptionResolver {
    fn default() -> Self {
        Self::new(|_| ExponentialBackoff::default())
    }
}

impl Debug for ExponentialBackoffOptionResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExponentialBackoffOptionResolver")
            .finish_non_exhaustive()
    }
}

impl OptionResolver for ExponentialBackoffOptionResolver {
    fn resolve(&self, config: &mut ClientConfig) -> Result<(), Error> {
        let mut backoff = match config.backoff.take() {
            Some(b) => b,
            None => (self.provider)(&config.options),
        };

        let enabled = config.options.get_bool(options::BACKOFF_LOGGER)
            || config.options.get_str(options::BACKOFF_LOGGER) == Some("debug");
        if enabled {
            let logger = match config.options.get_str(options::BACKOFF_LOGGER_TEMPLATE) {
                Some(t) => BackoffLogger::new(t),
                None => BackoffLogger::default(),
            };
            backoff.set_logger(Some(logger));
        }

        config.backoff = Some(backoff);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
// endregion: --- backoff
