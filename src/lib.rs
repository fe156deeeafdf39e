//! # `pam_permesi` (PAM second-factor gate)
//!
//! `pam_permesi` is a PAM service module that gates interactive logins on a
//! remote second-factor decision service. It collects the account name, the
//! remote peer address, and a second-factor value from the host framework,
//! submits them to the decision service over TLS, and maps the verdict onto
//! the status codes PAM understands.
//!
//! ## Flow Overview
//!
//! 1) The host framework invokes one of the entry points in [`module`] with
//!    its `key=value` argument list.
//! 2) [`config`] resolves the arguments into an immutable per-attempt
//!    [`Config`]; attempts with an incomplete service identity fail closed
//!    before any network traffic.
//! 3) [`host`] collects the credential bundle through the host's synchronous
//!    prompt capability, converting the bridge's sentinel error strings into
//!    typed failures at the boundary.
//! 4) [`tfa`] shapes the decision request, performs the HTTPS exchange, and
//!    classifies the verdict; when the service is unreachable the offline
//!    allow-list is the alternate decision path.
//!
//! ## Security boundaries
//!
//! - The service key and the collected second-factor value are held as
//!   [`secrecy::SecretString`] and exposed only while the wire body is built.
//! - Every logged representation of a request or response is redacted before
//!   it reaches the audit sink; see [`audit`].
//! - No error detail crosses the plugin boundary: the host only ever sees a
//!   [`Status`] code.

pub mod audit;
pub mod config;
pub mod host;
pub mod module;
pub mod tfa;

pub use config::Config;
pub use host::{Flags, Host, HostError};
pub use module::{account_management, authenticate, set_credentials, Status};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
