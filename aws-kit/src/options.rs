//! Names of the options understood by [`ClientBuilder`](crate::client::ClientBuilder).

/// Region name, e.g. `us-east-1`
pub const REGION: &str = "region";
/// Service identifier used for endpoint lookup, e.g. `glacier`
pub const SERVICE: &str = "service";
/// URI scheme of the base URL (`https` or `http`)
pub const SCHEME: &str = "scheme";
/// Explicit base URL; skips the endpoint lookup
pub const BASE_URL: &str = "base_url";
/// `true` to verify against the bundled roots, or a path to a PEM bundle
pub const SSL_CERT: &str = "ssl.cert";
/// Resolved path of the CA bundle, written by the builder
pub const SSL_CA_BUNDLE: &str = "ssl.ca_bundle";
/// Signature name (`v4`, `v3https`)
pub const SIGNATURE: &str = "signature";
/// Overrides the service name used in signatures
pub const SIGNATURE_SERVICE: &str = "signature.service";
/// Overrides the region name used in signatures
pub const SIGNATURE_REGION: &str = "signature.region";
/// AWS access key id
pub const KEY: &str = "key";
/// AWS secret access key
pub const SECRET: &str = "secret";
/// Session token for temporary credentials
pub const TOKEN: &str = "token";
/// UNIX timestamp at which the temporary credentials expire
pub const TOKEN_TTD: &str = "token.ttd";
/// `"debug"` or `true` to log retries
pub const BACKOFF_LOGGER: &str = "client.backoff.logger";
/// Template of the retry log line
pub const BACKOFF_LOGGER_TEMPLATE: &str = "client.backoff.logger.template";
/// Transport options: `timeout`, `connect_timeout` (seconds), `proxy` (URL)
pub const CURL_OPTIONS: &str = "curl.options";
/// Default parameters merged into every operation
pub const COMMAND_PARAMS: &str = "command.params";
/// Headers that are never sent
pub const HEADER_BLACKLIST: &str = "header.blacklist";
/// Headers excluded when computing cache keys of GET responses
pub const CACHE_KEY_FILTER: &str = "params.cache.key_filter";
