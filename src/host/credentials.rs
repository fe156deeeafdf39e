//! Credential collection through the host bridge.

use secrecy::SecretString;
use tracing::debug;

use super::{intercept_sentinel, Flags, Host, HostError};
use crate::audit::AuditLog;

/// Everything one authentication attempt sends to the decision service.
///
/// Built fresh per attempt and discarded with it; never persisted.
pub struct Credentials {
    pub username: String,
    pub peer_address: String,
    pub workload_id: String,
    pub second_factor: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("peer_address", &self.peer_address)
            .field("workload_id", &self.workload_id)
            .field("second_factor", &"***")
            .finish()
    }
}

/// Collect the full credential bundle for a login authentication.
///
/// # Errors
/// Returns `UnknownUser` when the host cannot supply the account name, peer
/// address, or workload identity, and the mapped failure when a
/// conversation-backed capability yields a sentinel.
pub fn collect(
    host: &mut dyn Host,
    flags: Flags,
    log: &AuditLog,
) -> Result<Credentials, HostError> {
    let username = require_username(host, log)?;

    let Some(peer_address) = host.peer_address() else {
        log.warn(&format!("failed to get remote host for user {username}"));
        return Err(HostError::UnknownUser);
    };

    let workload_id = match host.workload_id(flags) {
        Some(raw) => {
            let value = intercept_sentinel(raw)?;
            if value.is_empty() {
                username.clone()
            } else {
                value
            }
        }
        None => return Err(HostError::UnknownUser),
    };

    let second_factor = match host.prompt_second_factor(flags) {
        // empty is a valid answer: it selects the U2F path downstream
        Some(raw) => SecretString::from(intercept_sentinel(raw)?),
        None => return Err(HostError::Conversation),
    };

    debug!(%username, %peer_address, %workload_id, "collected credentials");

    Ok(Credentials {
        username,
        peer_address,
        workload_id,
        second_factor,
    })
}

/// Collect the reduced bundle for an account-management check: no prompt,
/// second factor forced empty, workload identity pinned to the account name.
///
/// # Errors
/// Returns `UnknownUser` when the host cannot supply the account name or
/// peer address.
pub fn collect_account(host: &mut dyn Host, log: &AuditLog) -> Result<Credentials, HostError> {
    let username = require_username(host, log)?;

    let Some(peer_address) = host.peer_address() else {
        log.warn(&format!("failed to get remote host for user {username}"));
        return Err(HostError::UnknownUser);
    };

    Ok(Credentials {
        workload_id: username.clone(),
        username,
        peer_address,
        second_factor: SecretString::default(),
    })
}

fn require_username(host: &mut dyn Host, log: &AuditLog) -> Result<String, HostError> {
    match host.username() {
        Some(username) if !username.is_empty() => Ok(username),
        Some(_) => Err(HostError::UnknownUser),
        None => {
            log.error("failed to get username from host");
            Err(HostError::UnknownUser)
        }
    }
}
