//! Wire types for the decision service.

use regex::Regex;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::{redact_json, REDACTED};
use crate::config::Config;
use crate::host::credentials::Credentials;

/// Which second-factor flow the service should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TfaMethod {
    Totp,
    U2f,
}

impl TfaMethod {
    /// Derived, never caller-supplied: exactly six ASCII digits selects the
    /// TOTP flow, everything else (including empty) the U2F flow.
    #[must_use]
    pub fn infer(code: &str) -> Self {
        let is_totp = Regex::new(r"^[0-9]{6}$").is_ok_and(|shape| shape.is_match(code));
        if is_totp {
            Self::Totp
        } else {
            Self::U2f
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::U2f => "U2F",
        }
    }
}

/// Body of the agent login request.
#[derive(Clone, Serialize)]
pub struct DecisionRequest {
    #[serde(rename = "serviceID")]
    pub service_id: String,
    #[serde(rename = "serviceKey")]
    pub service_key: String,
    pub user: String,
    #[serde(rename = "tfaMethod")]
    pub tfa_method: String,
    #[serde(rename = "totpCode")]
    pub totp_code: String,
    #[serde(rename = "userIP")]
    pub user_ip: String,
    #[serde(rename = "wID")]
    pub workload_id: String,
}

impl DecisionRequest {
    /// Shape the request for one attempt. The workload identity falls back
    /// to the account name when the host supplied none.
    #[must_use]
    pub fn new(config: &Config, credentials: &Credentials) -> Self {
        let totp_code = credentials.second_factor.expose_secret().to_string();
        let workload_id = if credentials.workload_id.is_empty() {
            credentials.username.clone()
        } else {
            credentials.workload_id.clone()
        };
        Self {
            service_id: config.service_id.clone(),
            service_key: config.service_key.expose_secret().to_string(),
            user: credentials.username.clone(),
            tfa_method: TfaMethod::infer(&totp_code).as_str().to_string(),
            totp_code,
            user_ip: credentials.peer_address.clone(),
            workload_id,
        }
    }

    /// Copy safe to log: the service key and the second-factor code are
    /// replaced before serialization, never after.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            service_key: REDACTED.to_string(),
            totp_code: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

/// Body of the decision service response. Grant iff `status == "success"`
/// on a successful HTTP exchange; everything else is a deny.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DecisionResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl DecisionResponse {
    #[must_use]
    pub fn granted(&self) -> bool {
        self.status == "success"
    }

    /// JSON view safe to log, with `key`/`token` fields in the opaque
    /// payload replaced by the redaction marker.
    #[must_use]
    pub fn redacted(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        redact_json(&mut value);
        value
    }
}
