//! PAM service-module entry points.
//!
//! One synchronous pipeline per attempt: resolve the argument list into a
//! [`Config`], collect the credential bundle through the host bridge, run
//! the decision client, and map the outcome onto a [`Status`]. No error
//! value ever crosses the plugin boundary: the host sees a status code,
//! the audit log sees the detail.

use tracing::debug;

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::host::credentials::{self, Credentials};
use crate::host::{Flags, Host, HostError};
use crate::tfa;

/// Status codes returned to the host framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    Ignored,
    UnknownUser,
    AuthenticationError,
    ConversationError,
}

impl Status {
    /// The Linux-PAM numeric constant for this status.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,             // PAM_SUCCESS
            Self::AuthenticationError => 7, // PAM_AUTH_ERR
            Self::UnknownUser => 10,        // PAM_USER_UNKNOWN
            Self::ConversationError => 19,  // PAM_CONV_ERR
            Self::Ignored => 25,            // PAM_IGNORE
        }
    }
}

impl From<HostError> for Status {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnknownUser => Self::UnknownUser,
            HostError::Conversation => Self::ConversationError,
            HostError::AuthRejected => Self::AuthenticationError,
        }
    }
}

/// `pam_sm_authenticate` equivalent: gate a login on the second factor.
pub fn authenticate(host: &mut dyn Host, flags: Flags, args: &[String]) -> Status {
    authenticate_with(host, flags, args, audit::shared())
}

/// [`authenticate`] with an explicit audit sink (tests, embedding hosts).
pub fn authenticate_with(
    host: &mut dyn Host,
    flags: Flags,
    args: &[String],
    log: &AuditLog,
) -> Status {
    let Some(config) = resolve_config(args, log) else {
        return Status::AuthenticationError;
    };

    let bundle = match credentials::collect(host, flags, log) {
        Ok(bundle) => bundle,
        Err(err) => {
            debug!(%err, "credential collection failed");
            return Status::from(err);
        }
    };

    decide(&config, log, &bundle)
}

/// `pam_sm_setcred` equivalent: this module never manages credential state.
pub fn set_credentials(_host: &mut dyn Host, _flags: Flags, _args: &[String]) -> Status {
    Status::Ignored
}

/// `pam_sm_acct_mgmt` equivalent: login-independent account-validity check.
/// Same pipeline with the second factor forced empty and the workload
/// identity pinned to the account name.
pub fn account_management(host: &mut dyn Host, flags: Flags, args: &[String]) -> Status {
    account_management_with(host, flags, args, audit::shared())
}

/// [`account_management`] with an explicit audit sink.
pub fn account_management_with(
    host: &mut dyn Host,
    _flags: Flags,
    args: &[String],
    log: &AuditLog,
) -> Status {
    let Some(config) = resolve_config(args, log) else {
        return Status::AuthenticationError;
    };

    let bundle = match credentials::collect_account(host, log) {
        Ok(bundle) => bundle,
        Err(err) => {
            debug!(%err, "account credential collection failed");
            return Status::from(err);
        }
    };

    decide(&config, log, &bundle)
}

/// Fails closed before any network attempt when the service identity is
/// incomplete.
fn resolve_config(args: &[String], log: &AuditLog) -> Option<Config> {
    let config = Config::from_args(args);
    debug!(?config, "resolved module configuration");
    if !config.has_service_identity() {
        log.error("invalid configuration - missing server_url, service_id or service_key");
        return None;
    }
    Some(config)
}

fn decide(config: &Config, log: &AuditLog, bundle: &Credentials) -> Status {
    if tfa::verify(config, log, bundle) {
        Status::Success
    } else {
        Status::AuthenticationError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHost;

    impl Host for NullHost {
        fn username(&self) -> Option<String> {
            None
        }

        fn peer_address(&self) -> Option<String> {
            None
        }

        fn workload_id(&mut self, _flags: Flags) -> Option<String> {
            None
        }

        fn prompt_second_factor(&mut self, _flags: Flags) -> Option<String> {
            None
        }
    }

    #[test]
    fn status_codes_match_linux_pam_constants() {
        assert_eq!(Status::Success.code(), 0);
        assert_eq!(Status::AuthenticationError.code(), 7);
        assert_eq!(Status::UnknownUser.code(), 10);
        assert_eq!(Status::ConversationError.code(), 19);
        assert_eq!(Status::Ignored.code(), 25);
    }

    #[test]
    fn host_failures_map_onto_statuses() {
        assert_eq!(Status::from(HostError::UnknownUser), Status::UnknownUser);
        assert_eq!(
            Status::from(HostError::Conversation),
            Status::ConversationError
        );
        assert_eq!(
            Status::from(HostError::AuthRejected),
            Status::AuthenticationError
        );
    }

    #[test]
    fn set_credentials_is_always_ignored() {
        let mut host = NullHost;
        assert_eq!(
            set_credentials(&mut host, Flags::default(), &[]),
            Status::Ignored
        );
    }

    #[test]
    fn incomplete_service_identity_fails_closed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = AuditLog::open(&dir.path().join("audit.log"));
        let args = vec!["server_url=tfa.example.com".to_string()];
        let mut host = NullHost;
        assert_eq!(
            authenticate_with(&mut host, Flags::default(), &args, &log),
            Status::AuthenticationError
        );
        assert_eq!(
            account_management_with(&mut host, Flags::default(), &args, &log),
            Status::AuthenticationError
        );
        Ok(())
    }

    #[test]
    fn unknown_user_before_any_decision() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = AuditLog::open(&dir.path().join("audit.log"));
        let args: Vec<String> = ["server_url=tfa.example.com", "service_id=svc", "service_key=k"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut host = NullHost;
        assert_eq!(
            authenticate_with(&mut host, Flags::default(), &args, &log),
            Status::UnknownUser
        );
        Ok(())
    }
}
