//! HTTP client for the decision service.
//!
//! One blocking POST per attempt, bounded by a fixed timeout. Transport
//! failure hands the verdict to the offline allow-list; every completed
//! exchange is classified locally and never retried. All diagnostic detail
//! goes to the audit log only; the caller sees a bare verdict.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::models::{DecisionRequest, DecisionResponse};
use super::offline;
use crate::audit::AuditLog;
use crate::config::Config;
use crate::host::credentials::Credentials;
use crate::APP_USER_AGENT;

pub const ENDPOINT_PATH: &str = "/auth/agent/nix";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Verdict for one attempt: `true` grants, `false` denies.
///
/// Denies without a network call when the bundle lacks a username or peer
/// address, or when the configured server URL cannot be parsed.
pub fn verify(config: &Config, log: &AuditLog, credentials: &Credentials) -> bool {
    if credentials.username.is_empty() || credentials.peer_address.is_empty() {
        log.error(&format!(
            "invalid decision parameters - user: {:?}, peer: {:?}",
            credentials.username, credentials.peer_address
        ));
        return false;
    }

    let endpoint = match endpoint_url(&config.server_url) {
        Ok(url) => url,
        Err(err) => {
            log.error(&format!(
                "invalid server URL {:?}: {err:#}",
                config.server_url
            ));
            return false;
        }
    };

    let request = DecisionRequest::new(config, credentials);

    if let Ok(body) = serde_json::to_string(&request.redacted()) {
        log.debug(
            config.debug,
            &format!(
                "sending TFA request to {endpoint} | method: {} | data: {body}",
                request.tfa_method
            ),
        );
    }

    let response = match send(config, &endpoint, &request) {
        Ok(response) => response,
        Err(err) => {
            // no contact was made; the offline allow-list is the verdict now
            log.error(&format!("failed to reach decision service: {err:#}"));
            if offline::evaluate(&credentials.username, &config.offline_users) {
                log.info(&format!(
                    "allowing offline access for user {}",
                    credentials.username
                ));
                return true;
            }
            return false;
        }
    };

    let status = response.status();
    let body = match response.text() {
        Ok(body) => body,
        Err(err) => {
            log.error(&format!("failed to read response body: {err:#}"));
            return false;
        }
    };

    if !status.is_success() {
        log.error(&format!("decision service returned {status}: {body}"));
        return false;
    }

    let response: DecisionResponse = match serde_json::from_str(&body) {
        Ok(response) => response,
        Err(err) => {
            log.error(&format!("failed to parse response body: {err}"));
            return false;
        }
    };

    log.debug(
        config.debug,
        &format!("decision response: {}", response.redacted()),
    );

    if response.granted() {
        return true;
    }

    log.warn(&format!(
        "authentication failed for user {} - status: {}, reason: {}",
        credentials.username,
        response.status,
        response.reason.as_deref().unwrap_or_default()
    ));
    false
}

fn send(config: &Config, endpoint: &Url, request: &DecisionRequest) -> Result<Response> {
    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .danger_accept_invalid_certs(config.insecure_skip_verify)
        .build()
        .context("failed to build HTTP client")?;

    client
        .post(endpoint.clone())
        .json(request)
        .send()
        .context("failed to connect to decision service")
}

/// Compute the agent endpoint from the configured server.
///
/// A bare host gets `https://`; an explicit `http(s)://` scheme is honored
/// (the insecure form exists for lab and stub setups).
///
/// # Errors
/// Returns an error if the resulting URL cannot be parsed.
pub(crate) fn endpoint_url(server_url: &str) -> Result<Url> {
    let base = if server_url.starts_with("http://") || server_url.starts_with("https://") {
        server_url.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", server_url.trim_end_matches('/'))
    };

    let url = Url::parse(&format!("{base}{ENDPOINT_PATH}"))
        .with_context(|| format!("error parsing server URL {server_url:?}"))?;

    debug!("decision endpoint: {url}");

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::SecretString;

    #[test]
    fn endpoint_url_assumes_https() -> Result<()> {
        let url = endpoint_url("tfa.example.com")?;
        assert_eq!(url.as_str(), "https://tfa.example.com/auth/agent/nix");
        Ok(())
    }

    #[test]
    fn endpoint_url_honors_explicit_scheme_and_port() -> Result<()> {
        let url = endpoint_url("http://127.0.0.1:8080")?;
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/auth/agent/nix");
        Ok(())
    }

    #[test]
    fn endpoint_url_drops_trailing_slash() -> Result<()> {
        let url = endpoint_url("https://tfa.example.com/")?;
        assert_eq!(url.as_str(), "https://tfa.example.com/auth/agent/nix");
        Ok(())
    }

    #[test]
    fn endpoint_url_rejects_garbage() {
        assert!(endpoint_url("").is_err());
        assert!(endpoint_url("https://").is_err());
    }

    #[test]
    fn missing_peer_address_denies_without_touching_the_network() -> Result<()> {
        // with an offline-listed user, a transport attempt would have
        // produced a degraded grant; a plain deny proves none was made
        let dir = tempfile::tempdir()?;
        let log = AuditLog::open(&dir.path().join("audit.log"));
        let config = Config::from_args(&[
            "server_url=127.0.0.1:1",
            "service_id=svc",
            "service_key=k",
            "offline_users=alice",
        ]);
        let credentials = Credentials {
            username: "alice".to_string(),
            peer_address: String::new(),
            workload_id: "alice".to_string(),
            second_factor: SecretString::default(),
        };
        assert!(!verify(&config, &log, &credentials));
        Ok(())
    }
}
