//! HMAC-SHA256 signing and verification.
//!
//! Two procedures share the same primitive, an HMAC-SHA256 keyed by the
//! merchant key whose digest is base64-encoded:
//!
//! - [`token`]: signs the outbound token request (`paytr_token`)
//! - [`callback`]: verifies the `hash` field of inbound payment notifications
//!
//! The field concatenation order of each procedure is dictated by the gateway
//! and is exposed as [`TOKEN_FIELD_ORDER`] and [`CALLBACK_FIELD_ORDER`].
//! Changing either silently breaks authentication.

pub mod callback;
pub mod token;


use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

pub use self::{
    callback::{CALLBACK_ACK, CALLBACK_FIELD_ORDER, CallbackNotification, CallbackVerdict, verify_callback},
    token::{TOKEN_FIELD_ORDER, TokenFields, sign_token},
};
use crate::error::{PaytrError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Merchant key and salt.
///
/// Both values are opaque shared secrets issued by the gateway. They are
/// zeroized on drop and never printed: the [`Debug`] output is redacted.
///
/// # Examples
///
/// ```
/// use paytr_client::signing::MerchantSecrets;
///
/// let secrets = MerchantSecrets::new("merchant-key", "merchant-salt").unwrap();
/// assert!(!format!("{secrets:?}").contains("merchant-key"));
/// ```
#[derive(Clone)]
pub struct MerchantSecrets {
    key: Zeroizing<String>,
    salt: Zeroizing<String>,
}

impl MerchantSecrets {
    /// Creates a secret pair.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the key or salt is empty.
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(key: impl Into<String>, salt: impl Into<String>) -> Result<Self> {
        let key = Zeroizing::new(key.into());
        let salt = Zeroizing::new(salt.into());
        if key.is_empty() {
            return Err(PaytrError::ConfigError("merchant key must not be empty".to_owned()));
        }
        if salt.is_empty() {
            return Err(PaytrError::ConfigError("merchant salt must not be empty".to_owned()));
        }
        Ok(Self { key, salt })
    }

    pub(crate) fn salt(&self) -> &[u8] {
        self.salt.as_bytes()
    }

    /// Returns a fresh MAC keyed by the merchant key.
    #[allow(clippy::expect_used, reason = "HMAC accepts keys of any length")]
    pub(crate) fn mac(&self) -> HmacSha256 {
        <HmacSha256 as Mac>::new_from_slice(self.key.as_bytes())
            .expect("HMAC accepts keys of any length")
    }
}

impl fmt::Debug for MerchantSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantSecrets")
            .field("key", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

/// Feeds `parts` into a fresh merchant-keyed MAC and returns the base64 digest.
pub(crate) fn keyed_digest(secrets: &MerchantSecrets, parts: &[&[u8]]) -> String {
    let mut mac = secrets.mac();
    for part in parts {
        mac.update(part);
    }
    STANDARD.encode(mac.finalize().into_bytes())
}
