//! Error types for the PayTR client.
//!
//! All fallible operations in this crate return [`Result<T>`], whose error type
//! is [`PaytrError`]. Every variant implements [`std::error::Error`] via
//! [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Validation** ([`PaytrError::ValidationError`]): missing fields or an
//!   empty basket, detected before any network call
//! - **Encoding** ([`PaytrError::EncodingError`]): item data that cannot be
//!   written into the canonical basket
//! - **Transport** ([`PaytrError::TransportError`]): connection failures and timeouts
//! - **Response format** ([`PaytrError::ResponseFormatError`]): the gateway
//!   answered with something that is not the expected JSON object
//! - **Authenticity** ([`PaytrError::AuthenticityError`]): a callback whose hash
//!   does not match
//!
//! # Examples
//!
//! ```
//! use paytr_client::error::{PaytrError, Result};
//!
//! fn require(name: &str, value: &str) -> Result<()> {
//!     if value.is_empty() {
//!         return Err(PaytrError::ValidationError(format!("missing required field: {name}")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require("email", "").is_err());
//! ```

use thiserror::Error;

/// Result type alias for PayTR client operations.
pub type Result<T> = std::result::Result<T, PaytrError>;

/// Errors that can occur while talking to the PayTR gateway.
///
/// None of these errors are retried internally. Use
/// [`is_transient`](Self::is_transient) to decide whether a retry might help.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum PaytrError {
    /// A required field is missing or empty, or the basket has no items.
    ///
    /// Raised before any network traffic. Fix the input and try again.
    ///
    /// # Examples
    ///
    /// ```
    /// use paytr_client::error::PaytrError;
    ///
    /// let err = PaytrError::ValidationError("basket must contain at least one item".to_owned());
    /// assert!(err.to_string().starts_with("Validation failed"));
    /// ```
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Item data could not be encoded into the canonical basket.
    ///
    /// The most common cause is a unit price that is not a plain decimal
    /// literal such as `"18.00"`.
    #[error("Basket encoding failed: {0}")]
    EncodingError(String),

    /// The HTTP request to the gateway failed.
    ///
    /// Wraps [`reqwest::Error`]. Common causes:
    /// - Connection refused or DNS failure
    /// - Timeout (see [`HttpConfig`](crate::transport::HttpConfig))
    /// - TLS errors
    ///
    /// # Recovery
    ///
    /// The request never produced a usable answer; the caller may retry with
    /// the same merchant order id.
    #[error("Gateway request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The gateway response body is not the expected JSON object.
    ///
    /// The HTTP status and the raw body are preserved for diagnostics.
    #[error("Unparseable gateway response (HTTP {status}): {reason}")]
    ResponseFormatError {
        /// HTTP status code returned by the gateway.
        status: u16,
        /// Raw response body, lossily decoded as UTF-8.
        body: String,
        /// Why the body could not be decoded.
        reason: String,
    },

    /// The gateway answered with `status = "failed"`.
    ///
    /// Only produced by [`GatewayResponse::into_token`](crate::gateway::GatewayResponse::into_token);
    /// the client itself returns failed responses as values.
    #[error("Gateway rejected token request: {reason}")]
    GatewayRejected {
        /// Reason text returned by the gateway.
        reason: String,
    },

    /// A payment callback failed hash verification.
    ///
    /// Only produced by [`CallbackVerdict::ensure_authentic`](crate::signing::CallbackVerdict::ensure_authentic).
    /// The notification must be discarded.
    #[error("Callback hash mismatch for order {merchant_oid}")]
    AuthenticityError {
        /// Merchant order id carried by the rejected callback.
        merchant_oid: String,
    },

    /// Invalid configuration or credentials.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl PaytrError {
    /// Returns `true` if retrying the same call might succeed.
    ///
    /// Only transport failures and server-side (5xx) format errors are
    /// considered transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransportError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::ResponseFormatError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = PaytrError::ValidationError("missing required field: email".into());
        assert_eq!(error.to_string(), "Validation failed: missing required field: email");
    }

    #[test]
    fn test_response_format_error_display() {
        let error = PaytrError::ResponseFormatError {
            status: 502,
            body: "<html>Bad Gateway</html>".to_owned(),
            reason: "expected value at line 1 column 1".to_owned(),
        };
        let message = error.to_string();
        assert!(message.contains("HTTP 502"));
        assert!(message.contains("expected value"));
    }

    #[test]
    fn test_authenticity_error_display() {
        let error = PaytrError::AuthenticityError { merchant_oid: "SP123".to_owned() };
        assert_eq!(error.to_string(), "Callback hash mismatch for order SP123");
    }

    #[test]
    fn test_is_transient() {
        let server_side =
            PaytrError::ResponseFormatError { status: 503, body: String::new(), reason: "x".into() };
        assert!(server_side.is_transient());

        let client_side =
            PaytrError::ResponseFormatError { status: 200, body: String::new(), reason: "x".into() };
        assert!(!client_side.is_transient());

        assert!(!PaytrError::ValidationError("x".into()).is_transient());
        assert!(!PaytrError::GatewayRejected { reason: "x".into() }.is_transient());
    }
}
