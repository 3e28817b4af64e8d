//! `paytr_token` generation for token requests.

use tracing::{debug, instrument};

use super::{MerchantSecrets, keyed_digest};
use crate::error::{PaytrError, Result};

/// Order in which request fields are concatenated into the signing string.
///
/// Must match the gateway's own order byte for byte.
pub const TOKEN_FIELD_ORDER: [&str; 10] = [
    "merchant_id",
    "user_ip",
    "merchant_oid",
    "email",
    "payment_amount",
    "user_basket",
    "no_installment",
    "max_installment",
    "currency",
    "test_mode",
];

/// Fields that may be sent empty. An empty currency selects the gateway default.
const OPTIONAL_FIELDS: [&str; 1] = ["currency"];

/// The ten request fields covered by the token signature.
///
/// All values are the exact strings that will be sent in the form body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenFields<'a> {
    /// Merchant id issued by the gateway.
    pub merchant_id: &'a str,
    /// Customer IP address.
    pub user_ip: &'a str,
    /// Merchant order id, unique per payment attempt.
    pub merchant_oid: &'a str,
    /// Customer e-mail address.
    pub email: &'a str,
    /// Payment amount in minor units (e.g. `"3588"` for 35.88).
    pub payment_amount: &'a str,
    /// Encoded basket from [`encode_basket`](crate::basket::encode_basket).
    pub user_basket: &'a str,
    /// `"1"` to disable installments, `"0"` otherwise.
    pub no_installment: &'a str,
    /// Maximum installment count, `"0"` for no limit.
    pub max_installment: &'a str,
    /// Currency code, or empty for the gateway default.
    pub currency: &'a str,
    /// `"1"` for test transactions on a live store, `"0"` otherwise.
    pub test_mode: &'a str,
}

impl<'a> TokenFields<'a> {
    /// Returns `(name, value)` pairs in [`TOKEN_FIELD_ORDER`].
    #[must_use]
    pub const fn ordered(&self) -> [(&'static str, &'a str); 10] {
        [
            (TOKEN_FIELD_ORDER[0], self.merchant_id),
            (TOKEN_FIELD_ORDER[1], self.user_ip),
            (TOKEN_FIELD_ORDER[2], self.merchant_oid),
            (TOKEN_FIELD_ORDER[3], self.email),
            (TOKEN_FIELD_ORDER[4], self.payment_amount),
            (TOKEN_FIELD_ORDER[5], self.user_basket),
            (TOKEN_FIELD_ORDER[6], self.no_installment),
            (TOKEN_FIELD_ORDER[7], self.max_installment),
            (TOKEN_FIELD_ORDER[8], self.currency),
            (TOKEN_FIELD_ORDER[9], self.test_mode),
        ]
    }

    /// Checks that every required field has a non-blank value.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ValidationError`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.ordered() {
            if value.trim().is_empty() && !OPTIONAL_FIELDS.contains(&name) {
                return Err(PaytrError::ValidationError(format!("missing required field: {name}")));
            }
        }
        Ok(())
    }

    /// Concatenates the fields without separators.
    ///
    /// The result contains no secrets; the merchant salt is appended only
    /// inside the MAC.
    #[must_use]
    pub fn signing_string(&self) -> String {
        self.ordered().iter().map(|(_, value)| *value).collect()
    }
}

/// Computes the `paytr_token` for a token request.
///
/// A single HMAC-SHA256 keyed by the merchant key is fed the signing string
/// and then the merchant salt; the digest is base64-encoded.
///
/// # Errors
///
/// Returns [`PaytrError::ValidationError`] if a required field is empty.
/// Signing an incomplete field set would only produce a token the gateway rejects.
///
/// # Examples
///
/// ```
/// use paytr_client::signing::{MerchantSecrets, TokenFields, sign_token};
///
/// # fn example() -> paytr_client::Result<()> {
/// let secrets = MerchantSecrets::new("merchant-key", "merchant-salt")?;
/// let fields = TokenFields {
///     merchant_id: "100001",
///     user_ip: "192.168.1.56",
///     merchant_oid: "SP1001",
///     email: "buyer@example.com",
///     payment_amount: "3588",
///     user_basket: "W1siS2FsZW0iLCIxMC41MCIsM11d",
///     no_installment: "0",
///     max_installment: "0",
///     currency: "TL",
///     test_mode: "1",
/// };
///
/// let token = sign_token(&fields, &secrets)?;
/// assert_eq!(token.len(), 44);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[instrument(skip(token_fields, secrets), fields(merchant_oid = token_fields.merchant_oid))]
pub fn sign_token(token_fields: &TokenFields<'_>, secrets: &MerchantSecrets) -> Result<String> {
    token_fields.validate()?;

    let signing_string = token_fields.signing_string();
    let token = keyed_digest(secrets, &[signing_string.as_bytes(), secrets.salt()]);

    debug!(signing_string_len = signing_string.len(), "computed paytr_token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASKET: &str = "W1siXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAxIiwiMTguMDAiLDFdLFsiXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAyIiwiMzMuMjUiLDJdLFsiXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAzIiwiNDUuNDIiLDFdXQ==";

    fn fixture_secrets() -> MerchantSecrets {
        MerchantSecrets::new("YZ1pKmQeTZ7cvw3R", "gF4cLw8aZ2hNq6Ts").unwrap()
    }

    fn fixture_fields() -> TokenFields<'static> {
        TokenFields {
            merchant_id: "100001",
            user_ip: "192.168.1.56",
            merchant_oid: "20190925T113214",
            email: "info@example.com",
            payment_amount: "3588",
            user_basket: BASKET,
            no_installment: "0",
            max_installment: "0",
            currency: "TL",
            test_mode: "1",
        }
    }

    #[test]
    fn test_sign_token_golden() {
        let token = sign_token(&fixture_fields(), &fixture_secrets()).unwrap();
        assert_eq!(token, "Mpd6tVOZqqp+oAZ9+o63nfnrXKKrZHDYVgK9CRj9CUQ=");
    }

    #[test]
    fn test_sign_token_is_deterministic() {
        let secrets = fixture_secrets();
        let first = sign_token(&fixture_fields(), &secrets).unwrap();
        let second = sign_token(&fixture_fields(), &secrets).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_signing_string_order() {
        let fields = fixture_fields();
        let expected = format!("100001192.168.1.5620190925T113214info@example.com3588{BASKET}00TL1");
        assert_eq!(fields.signing_string(), expected);
    }

    #[test]
    fn test_ordered_matches_field_order_constant() {
        let names: Vec<&str> = fixture_fields().ordered().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, TOKEN_FIELD_ORDER);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let fields = TokenFields { email: "", ..fixture_fields() };
        let err = sign_token(&fields, &fixture_secrets()).unwrap_err();
        assert!(matches!(err, PaytrError::ValidationError(ref msg) if msg.contains("email")));

        let fields = TokenFields { user_basket: "", ..fixture_fields() };
        let err = sign_token(&fields, &fixture_secrets()).unwrap_err();
        assert!(matches!(err, PaytrError::ValidationError(ref msg) if msg.contains("user_basket")));
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        for fields in [
            TokenFields { merchant_oid: "   ", ..fixture_fields() },
            TokenFields { email: "\t", ..fixture_fields() },
        ] {
            let err = sign_token(&fields, &fixture_secrets()).unwrap_err();
            assert!(matches!(err, PaytrError::ValidationError(ref msg) if msg.starts_with("missing required field")));
        }
    }

    #[test]
    fn test_empty_currency_is_allowed() {
        let with_default = TokenFields { currency: "", ..fixture_fields() };
        let token = sign_token(&with_default, &fixture_secrets()).unwrap();
        assert_ne!(token, sign_token(&fixture_fields(), &fixture_secrets()).unwrap());
    }

    #[test]
    fn test_any_field_change_changes_token() {
        let secrets = fixture_secrets();
        let base = sign_token(&fixture_fields(), &secrets).unwrap();

        let changed = TokenFields { payment_amount: "3589", ..fixture_fields() };
        assert_ne!(sign_token(&changed, &secrets).unwrap(), base);

        let changed = TokenFields { test_mode: "0", ..fixture_fields() };
        assert_ne!(sign_token(&changed, &secrets).unwrap(), base);
    }

    #[test]
    fn test_salt_changes_token() {
        let other = MerchantSecrets::new("YZ1pKmQeTZ7cvw3R", "another-salt").unwrap();
        assert_ne!(
            sign_token(&fixture_fields(), &other).unwrap(),
            sign_token(&fixture_fields(), &fixture_secrets()).unwrap()
        );
    }
}
