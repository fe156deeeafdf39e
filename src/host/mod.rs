//! Host-framework bridge: capabilities, flags, and typed failures.
//!
//! The host exposes four capabilities: the account name and peer address
//! from its item store, and two values obtained through its synchronous
//! conversation mechanism (one message out, one response in, no
//! cancellation from this side). The conversation-backed capabilities may
//! yield one of three sentinel strings instead of a real value; those are
//! error signals, not data, and are converted to a typed [`HostError`] the
//! moment they cross into this crate so they can never collide with a
//! legitimate value downstream.

pub mod credentials;

use thiserror::Error;

/// Bridge result signaling the host rejected the attempt.
pub const SENTINEL_AUTH_ERR: &str = "pam_auth_err";
/// Bridge result signaling the conversation mechanism failed.
pub const SENTINEL_CONV_ERR: &str = "pam_conv_err";
/// Bridge result signaling the conversation was aborted.
pub const SENTINEL_CONV_ABORT: &str = "cr";

/// The flag word the host passes to each entry point, forwarded verbatim to
/// the conversation-backed capabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags(pub u32);

/// Typed failures of the host bridge.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("user is not known to the host")]
    UnknownUser,
    #[error("conversation with the host failed")]
    Conversation,
    #[error("host rejected the authentication attempt")]
    AuthRejected,
}

/// Capabilities the host framework provides to the module.
///
/// `workload_id` and `prompt_second_factor` may block the calling thread
/// until the human answers or the host times the conversation out; timeout
/// ownership stays with the host.
pub trait Host {
    /// Account name being authenticated.
    fn username(&self) -> Option<String>;

    /// Network address of the remote peer.
    fn peer_address(&self) -> Option<String>;

    /// Workload identity token, prompted through the host conversation.
    /// May yield a sentinel string.
    fn workload_id(&mut self, flags: Flags) -> Option<String>;

    /// Second-factor value, prompted through the host conversation.
    /// May yield a sentinel string; an empty string is a valid value.
    fn prompt_second_factor(&mut self, flags: Flags) -> Option<String>;
}

/// Convert a bridge value into data or the typed failure it encodes.
pub(crate) fn intercept_sentinel(value: String) -> Result<String, HostError> {
    match value.as_str() {
        SENTINEL_AUTH_ERR => Err(HostError::AuthRejected),
        SENTINEL_CONV_ERR | SENTINEL_CONV_ABORT => Err(HostError::Conversation),
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_typed_failures() {
        assert_eq!(
            intercept_sentinel("pam_auth_err".to_string()),
            Err(HostError::AuthRejected)
        );
        assert_eq!(
            intercept_sentinel("pam_conv_err".to_string()),
            Err(HostError::Conversation)
        );
        assert_eq!(
            intercept_sentinel("cr".to_string()),
            Err(HostError::Conversation)
        );
    }

    #[test]
    fn ordinary_values_pass_through() {
        assert_eq!(
            intercept_sentinel("123456".to_string()),
            Ok("123456".to_string())
        );
        assert_eq!(intercept_sentinel(String::new()), Ok(String::new()));
        // near-misses are data, not signals
        assert_eq!(
            intercept_sentinel("CR".to_string()),
            Ok("CR".to_string())
        );
    }
}
