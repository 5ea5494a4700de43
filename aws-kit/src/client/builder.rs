use super::resolver::{
    CredentialsOptionResolver, ExponentialBackoffOptionResolver, OptionResolver,
    SignatureOptionResolver,
};
use super::{
    AwsClient, ClientConfig, DEFAULT_CLIENT_TYPE, DEFAULT_KEY_FILTER, ExponentialBackoff,
    ServiceClient, UserAgentListener,
};
use crate::Error;
use crate::config::{self, Collection};
use crate::credentials::Credentials;
use crate::exception::{
    DefaultXmlExceptionParser, ExceptionListener, ExceptionParser, NamespaceExceptionFactory,
};
use crate::options;
use crate::region::{EndpointProvider, default_endpoint_provider};
use crate::signature::Signature;
use serde_json::{Map, Value, json};
use std::sync::Arc;

const MISSING_ENDPOINT: &str =
    "You must specify a [base_url] or a [region, service, and optional scheme]";
const MISSING_SIGNATURE: &str = "A signature has not been provided.";

/// Options shared by every client.
fn common_defaults() -> Collection {
    let mut defaults = Collection::new();
    defaults.set(options::HEADER_BLACKLIST, json!(["Accept", "Expect"]));
    defaults
}

const COMMON_REQUIREMENTS: [&str; 1] = [options::REGION];

/// Assembles a client from options, defaults and requirements.
///
/// Everything is validated in [`build`](Self::build); setters never fail.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    namespace: Option<String>,
    config: Value,
    config_defaults: Value,
    config_requirements: Value,
    credentials: Option<Credentials>,
    credentials_resolver: Option<CredentialsOptionResolver>,
    signature: Option<Arc<dyn Signature>>,
    signature_resolver: Option<SignatureOptionResolver>,
    client_resolvers: Vec<Arc<dyn OptionResolver>>,
    endpoint_provider: Option<Arc<dyn EndpointProvider>>,
    backoff: Option<ExponentialBackoff>,
    exception_parser: Option<Arc<dyn ExceptionParser>>,
    exception_types: Vec<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::factory(None)
    }
}

impl ClientBuilder {
    /// `namespace` is the module path of the service, e.g. `aws_kit::glacier`.
    pub fn factory(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_owned),
            config: Value::Object(Map::new()),
            config_defaults: Value::Object(Map::new()),
            config_requirements: Value::Array(Vec::new()),
            credentials: None,
            credentials_resolver: None,
            signature: None,
            signature_resolver: None,
            client_resolvers: Vec::new(),
            endpoint_provider: None,
            backoff: None,
            exception_parser: None,
            exception_types: Vec::new(),
        }
    }

    // region:    --- setters
    /// Explicit options; must be a JSON object.
    pub fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn config_defaults(mut self, defaults: Value) -> Self {
        self.config_defaults = defaults;
        self
    }

    /// JSON array of option names.
    pub fn config_requirements(mut self, requirements: Value) -> Self {
        self.config_requirements = requirements;
        self
    }

    /// Wins over every credentials source.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn credentials_resolver(mut self, resolver: CredentialsOptionResolver) -> Self {
        self.credentials_resolver = Some(resolver);
        self
    }

    /// Default signature of the client; the `signature` option overrides it.
    pub fn signature(mut self, signature: Arc<dyn Signature>) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn signature_resolver(mut self, resolver: SignatureOptionResolver) -> Self {
        self.signature_resolver = Some(resolver);
        self
    }

    pub fn add_client_resolver(mut self, resolver: Arc<dyn OptionResolver>) -> Self {
        self.client_resolvers.push(resolver);
        self
    }

    pub fn endpoint_provider(mut self, provider: Arc<dyn EndpointProvider>) -> Self {
        self.endpoint_provider = Some(provider);
        self
    }

    /// Replaces the default retry policy.
    pub fn backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn exception_parser(mut self, parser: Arc<dyn ExceptionParser>) -> Self {
        self.exception_parser = Some(parser);
        self
    }

    pub fn exception_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exception_types = types.into_iter().map(Into::into).collect();
        self
    }
    // endregion: --- setters

    pub fn client_resolvers(&self) -> &[Arc<dyn OptionResolver>] {
        &self.client_resolvers
    }

    /// Adds the default backoff resolver unless one is already registered.
    pub fn add_exponential_backoff(&mut self) -> &mut Self {
        let exists = self
            .client_resolvers
            .iter()
            .any(|r| r.as_any().is::<ExponentialBackoffOptionResolver>());
        if !exists {
            self.client_resolvers
                .push(Arc::new(ExponentialBackoffOptionResolver::default()));
        }
        self
    }

    /// `aws_kit::glacier` -> `Glacier`
    pub fn service_name(&self) -> Option<String> {
        let ns = self.namespace.as_deref()?;
        let last = ns.rsplit("::").next().filter(|s| !s.is_empty())?;
        Some(
            last.split('_')
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect(),
        )
    }

    /// `aws_kit::glacier` -> `aws_kit::glacier::GlacierClient`
    pub fn client_type_name(&self) -> String {
        match (&self.namespace, self.service_name()) {
            (Some(ns), Some(service)) => format!("{ns}::{service}Client"),
            _ => DEFAULT_CLIENT_TYPE.to_owned(),
        }
    }

    pub fn build(self) -> Result<AwsClient, Error> {
        self.build_as()
    }

    pub fn build_as<C: ServiceClient>(mut self) -> Result<C, Error> {
        let specific = Collection::from_value(std::mem::take(&mut self.config_defaults))?;
        let defaults = config::prepare_config(specific, common_defaults(), &[])?;
        let mut requirements = COMMON_REQUIREMENTS.map(str::to_owned).to_vec();
        for r in config::process_requirements(std::mem::take(&mut self.config_requirements))? {
            if !requirements.contains(&r) {
                requirements.push(r);
            }
        }
        let explicit = Collection::from_value(std::mem::take(&mut self.config))?;
        let mut options = config::prepare_config(explicit, defaults, &requirements)?;

        if !options.has_key(options::BASE_URL) {
            let provider = self
                .endpoint_provider
                .clone()
                .unwrap_or_else(default_endpoint_provider);
            add_base_url(&mut options, provider.as_ref())?;
        }
        resolve_ssl_options(&mut options);

        let mut config = ClientConfig::new(options);
        config.credentials = self.credentials.take();
        config.backoff = self.backoff.take();
        config.client_type = self.client_type_name();

        self.credentials_resolver
            .take()
            .unwrap_or_default()
            .resolve(&mut config)?;

        let signature_resolver = match self.signature_resolver.take() {
            Some(r) => r,
            None => {
                if !config.options.has_key(options::SIGNATURE) && self.signature.is_none() {
                    return Err(Error::InvalidArgument(MISSING_SIGNATURE.to_owned()));
                }
                let signature = self.signature.clone();
                SignatureOptionResolver::new(move |_| {
                    signature
                        .clone()
                        .ok_or_else(|| Error::InvalidArgument(MISSING_SIGNATURE.to_owned()))
                })
            }
        };
        signature_resolver.resolve(&mut config)?;

        self.add_exponential_backoff();
        for resolver in &self.client_resolvers {
            resolver.resolve(&mut config)?;
        }

        tracing::debug!(client_type = %config.client_type, "building client");
        let mut client = C::from_config(config)?;
        let inner = client.aws_client_mut();

        if let Some(ns) = &self.namespace {
            let parser = self
                .exception_parser
                .take()
                .unwrap_or_else(|| Arc::new(DefaultXmlExceptionParser));
            let default_exception = format!("{}Exception", self.service_name().unwrap_or_default());
            let factory = NamespaceExceptionFactory::new(
                parser,
                format!("{ns}::exception"),
                default_exception,
                std::mem::take(&mut self.exception_types),
            );
            inner.add_subscriber(Arc::new(ExceptionListener::new(Arc::new(factory))));
        }
        inner.add_subscriber(Arc::new(UserAgentListener));
        inner
            .config_mut()
            .set(options::CACHE_KEY_FILTER, DEFAULT_KEY_FILTER);

        Ok(client)
    }
}

/// Looks up `base_url` from `region`, `service` and optional `scheme`.
fn add_base_url(options: &mut Collection, provider: &dyn EndpointProvider) -> Result<(), Error> {
    let (Some(region), Some(service)) = (
        options.get_str(options::REGION),
        options.get_str(options::SERVICE),
    ) else {
        return Err(Error::InvalidArgument(MISSING_ENDPOINT.to_owned()));
    };

    let endpoint = provider.get_endpoint(service, region)?;
    let base_url = endpoint.base_url(options.get_str(options::SCHEME))?;
    tracing::debug!(service, region, base_url, "endpoint resolved");
    options.set(options::BASE_URL, base_url);
    Ok(())
}

/// `ssl.cert`: `true` keeps the bundled roots, a path becomes `ssl.ca_bundle`.
fn resolve_ssl_options(options: &mut Collection) {
    let path = match options.get(options::SSL_CERT) {
        Some(Value::String(s)) if s != "true" && s != "false" && !s.is_empty() => s.clone(),
        _ => return,
    };
    options.set(options::SSL_CA_BUNDLE, path);
}
