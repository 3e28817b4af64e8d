//! Token endpoint response types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PaytrError, Result};

/// Base URL of the hosted payment page. The token is appended as the last path segment.
pub const IFRAME_BASE_URL: &str = "https://www.paytr.com/odeme/guvenli/";

/// Outcome reported in the `status` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Token issued.
    Success,
    /// Request rejected; see [`GatewayResponse::reason`].
    Failed,
    /// Any value this client does not know.
    Other(String),
}

impl PaymentStatus {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failed" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Parsed body of a token request.
///
/// `reason` is set on failure, `token` on success. Either may be absent in
/// the body, in which case it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Request outcome.
    pub status: PaymentStatus,
    /// Human-readable failure reason.
    #[serde(default)]
    pub reason: String,
    /// Iframe token.
    #[serde(default)]
    pub token: String,
}

impl GatewayResponse {
    /// Returns `true` if the gateway issued a token.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }

    /// Extracts the token from a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::GatewayRejected`] if the status is not
    /// `success` or the token is empty.
    pub fn into_token(self) -> Result<String> {
        match self.status {
            PaymentStatus::Success if !self.token.is_empty() => Ok(self.token),
            PaymentStatus::Success => Err(PaytrError::GatewayRejected {
                reason: "gateway reported success without a token".to_owned(),
            }),
            PaymentStatus::Failed => Err(PaytrError::GatewayRejected { reason: self.reason }),
            PaymentStatus::Other(status) => Err(PaytrError::GatewayRejected {
                reason: format!("unexpected status '{status}': {}", self.reason),
            }),
        }
    }

    /// Returns the hosted payment page URL for a successful response.
    #[must_use]
    pub fn iframe_url(&self) -> Option<String> {
        (self.is_success() && !self.token.is_empty()).then(|| format!("{IFRAME_BASE_URL}{}", self.token))
    }
}
