//! Payment notification (callback) verification.
//!
//! After a payment completes, the gateway POSTs a notification to the
//! merchant's callback URL. Its `hash` field must be checked with
//! [`verify_callback`] before the notification is trusted. The HTTP endpoint
//! that receives the callback belongs to the embedding application.
//!
//! # Examples
//!
//! ```
//! use paytr_client::signing::{CALLBACK_ACK, CallbackNotification, MerchantSecrets, verify_callback};
//!
//! # fn example() -> paytr_client::Result<()> {
//! let secrets = MerchantSecrets::new("merchant-key", "merchant-salt")?;
//! let notification = CallbackNotification::from_pairs([
//!     ("merchant_oid", "SP1001"),
//!     ("status", "success"),
//!     ("total_amount", "3588"),
//!     ("hash", "forged"),
//! ]);
//!
//! let verdict = verify_callback(&notification, &secrets);
//! assert!(!verdict.authentic);
//! assert!(verdict.ensure_authentic().is_err());
//!
//! // Answer the gateway once the notification has been handled.
//! assert_eq!(CALLBACK_ACK, "OK");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{instrument, warn};

use super::{MerchantSecrets, keyed_digest};
use crate::error::{PaytrError, Result};

/// Order in which callback fields and the salt are fed into the MAC.
///
/// The salt sits between the order id and the status.
pub const CALLBACK_FIELD_ORDER: [&str; 4] = ["merchant_oid", "merchant_salt", "status", "total_amount"];

/// Plain-text body the callback endpoint returns after handling a notification.
///
/// The gateway keeps re-sending a notification until it receives this reply.
pub const CALLBACK_ACK: &str = "OK";

/// Inbound payment notification.
///
/// Deserializable from the callback form body. Missing fields default to
/// empty strings so that malformed input still yields a verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackNotification {
    /// Merchant order id the notification refers to.
    pub merchant_oid: String,
    /// `"success"` or `"failed"`.
    pub status: String,
    /// Total charged amount in minor units, including installment interest.
    pub total_amount: String,
    /// Base64 HMAC supplied by the gateway. Untrusted.
    pub hash: String,
    /// Payment method (`card`, `eft`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    /// Original payment amount in minor units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<String>,
    /// Currency of the payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// `"1"` when the payment was made in test mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<String>,
    /// Failure code when `status` is `"failed"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason_code: Option<String>,
    /// Failure message when `status` is `"failed"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason_msg: Option<String>,
}

impl CallbackNotification {
    /// Builds a notification from decoded `(name, value)` form pairs.
    ///
    /// Unknown names are ignored; for repeated names the last value wins.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut notification = Self::default();
        for (name, value) in pairs {
            let value = value.into();
            match name.as_ref() {
                "merchant_oid" => notification.merchant_oid = value,
                "status" => notification.status = value,
                "total_amount" => notification.total_amount = value,
                "hash" => notification.hash = value,
                "payment_type" => notification.payment_type = Some(value),
                "payment_amount" => notification.payment_amount = Some(value),
                "currency" => notification.currency = Some(value),
                "test_mode" => notification.test_mode = Some(value),
                "failed_reason_code" => notification.failed_reason_code = Some(value),
                "failed_reason_msg" => notification.failed_reason_msg = Some(value),
                _ => {}
            }
        }
        notification
    }

    /// Returns `true` if the gateway reports a successful payment.
    ///
    /// Meaningless unless the notification has been verified.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Result of verifying a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackVerdict {
    /// `true` iff the recomputed hash equals the received one.
    pub authentic: bool,
    /// Locally computed hash, for diagnostics.
    pub computed_hash: String,
    merchant_oid: String,
}

impl CallbackVerdict {
    /// Converts a negative verdict into [`PaytrError::AuthenticityError`].
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::AuthenticityError`] if the callback is not authentic.
    pub fn ensure_authentic(self) -> Result<()> {
        if self.authentic {
            Ok(())
        } else {
            Err(PaytrError::AuthenticityError { merchant_oid: self.merchant_oid })
        }
    }
}

/// Computes the expected callback hash.
///
/// HMAC-SHA256 keyed by the merchant key over
/// `merchant_oid || merchant_salt || status || total_amount`, base64-encoded.
#[must_use]
pub fn callback_hash(notification: &CallbackNotification, secrets: &MerchantSecrets) -> String {
    keyed_digest(secrets, &[
        notification.merchant_oid.as_bytes(),
        secrets.salt(),
        notification.status.as_bytes(),
        notification.total_amount.as_bytes(),
    ])
}

/// Verifies the `hash` of an inbound payment notification.
///
/// Never fails: malformed input simply produces a non-matching hash. The
/// comparison runs in constant time. Acting on the notification (fulfilling
/// the order, answering [`CALLBACK_ACK`]) is left to the caller.
#[instrument(skip(notification, secrets), fields(merchant_oid = %notification.merchant_oid, status = %notification.status))]
pub fn verify_callback(notification: &CallbackNotification, secrets: &MerchantSecrets) -> CallbackVerdict {
    let computed_hash = callback_hash(notification, secrets);
    let authentic: bool = computed_hash.as_bytes().ct_eq(notification.hash.as_bytes()).into();

    if !authentic {
        warn!("callback hash mismatch");
    }

    CallbackVerdict { authentic, computed_hash, merchant_oid: notification.merchant_oid.clone() }
}
