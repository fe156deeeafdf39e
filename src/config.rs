//! Module argument parsing.
//!
//! PAM hands modules an ordered list of `key=value` tokens from the service
//! file. Later duplicates overwrite earlier ones; tokens without a `=` and
//! unrecognized keys are ignored so old service files keep working across
//! upgrades. Nothing here errors: the orchestrator validates the presence of
//! required fields before going to the network.

use secrecy::{ExposeSecret, SecretString};

/// Immutable per-attempt module configuration.
///
/// Identity fields default to empty; an attempt with an incomplete service
/// identity must fail closed before any network call is made.
#[derive(Clone, Default)]
pub struct Config {
    /// Decision service host, optionally with an explicit `http(s)://` scheme.
    /// Without a scheme, `https://` is assumed.
    pub server_url: String,
    /// Service identity registered with the decision service.
    pub service_id: String,
    /// Shared secret proving the service identity.
    pub service_key: SecretString,
    /// Comma-separated account names allowed in when the service is unreachable.
    pub offline_users: String,
    /// Skip TLS peer verification. Lab use only.
    pub insecure_skip_verify: bool,
    /// Write debug detail to the audit log.
    pub debug: bool,
}

impl Config {
    /// Resolve the ordered `key=value` argument list into a configuration.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = Self::default();
        for arg in args {
            let Some((key, value)) = arg.as_ref().split_once('=') else {
                continue;
            };
            match key {
                "server_url" => config.server_url = value.to_string(),
                "service_id" => config.service_id = value.to_string(),
                "service_key" => config.service_key = SecretString::from(value.to_string()),
                "offline_users" => config.offline_users = value.to_string(),
                "insecure_skip_verify" => config.insecure_skip_verify = parse_bool(value),
                "debug" => config.debug = parse_bool(value),
                _ => {}
            }
        }
        config
    }

    /// True when `server_url`, `service_id`, and `service_key` are all set.
    #[must_use]
    pub fn has_service_identity(&self) -> bool {
        !self.server_url.is_empty()
            && !self.service_id.is_empty()
            && !self.service_key.expose_secret().is_empty()
    }
}

fn parse_bool(value: &str) -> bool {
    value == "true" || value == "1"
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("service_id", &self.service_id)
            .field("service_key", &"***")
            .field("offline_users", &self.offline_users)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("debug", &self.debug)
            .finish()
    }
}
