//! Typed gateway configuration and merchant credentials.
//!
//! [`GatewayConfig`] is deserialized from TOML and holds everything that is
//! not secret: the endpoint, HTTP settings and per-store payment defaults.
//! [`MerchantCredentials`] holds the merchant id and the signing secrets and
//! is usually read from the environment.
//!
//! # Examples
//!
//! ```
//! use paytr_client::config::{Currency, GatewayConfig};
//!
//! let toml = r#"
//!     [http]
//!     timeout_secs = 20
//!
//!     [payment]
//!     currency = "TL"
//!     max_installment = 6
//!     merchant_ok_url = "https://shop.example.com/payment/ok"
//!     merchant_fail_url = "https://shop.example.com/payment/fail"
//! "#;
//!
//! let config = GatewayConfig::from_toml(toml).unwrap();
//! assert_eq!(config.payment.currency, Some(Currency::Tl));
//! assert_eq!(config.endpoint, paytr_client::config::DEFAULT_ENDPOINT);
//! ```

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::{PaytrError, Result},
    signing::MerchantSecrets,
    transport::HttpConfig,
};

/// Production token endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.paytr.com/odeme/api/get-token";

/// Default environment variable holding the merchant id.
pub const ENV_MERCHANT_ID: &str = "PAYTR_MERCHANT_ID";
/// Default environment variable holding the merchant key.
pub const ENV_MERCHANT_KEY: &str = "PAYTR_MERCHANT_KEY";
/// Default environment variable holding the merchant salt.
pub const ENV_MERCHANT_SALT: &str = "PAYTR_MERCHANT_SALT";

/// Highest installment count the gateway offers.
const MAX_INSTALLMENT_LIMIT: u8 = 12;

/// Root gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Token endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Permit a plain-HTTP or loopback endpoint. Only for mock gateways in tests.
    #[serde(default)]
    pub allow_insecure_endpoint: bool,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Store-wide payment defaults, overridable per request.
    #[serde(default)]
    pub payment: PaymentOptions,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            allow_insecure_endpoint: false,
            http: HttpConfig::default(),
            payment: PaymentOptions::default(),
        }
    }
}

impl GatewayConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the TOML is malformed, contains
    /// unknown keys, or fails [`validate`](Self::validate).
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)
            .map_err(|e| PaytrError::ConfigError(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PaytrError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - `endpoint` is an HTTPS URL that is not a loopback address, unless
    ///   `allow_insecure_endpoint` is set
    /// - HTTP timeouts are within bounds
    /// - payment defaults are valid
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;
        self.http.validate()?;
        self.payment.validate()
    }

    /// Returns the parsed, validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the endpoint is not acceptable.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            PaytrError::ConfigError(format!("invalid endpoint '{}': {e}", self.endpoint))
        })?;

        if self.allow_insecure_endpoint {
            return Ok(url);
        }

        if url.scheme() != "https" {
            return Err(PaytrError::ConfigError(format!(
                "endpoint must use HTTPS, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str() {
            let host_lower = host.to_lowercase();
            if host_lower == "localhost"
                || host_lower.starts_with("127.")
                || host_lower == "[::1]"
                || host_lower == "::1"
            {
                return Err(PaytrError::ConfigError(format!(
                    "endpoint must not be localhost or loopback: {host}"
                )));
            }
        }

        Ok(url)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

/// Store-wide payment defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentOptions {
    /// Payment currency. `None` leaves the choice to the gateway (`TL`).
    #[serde(default)]
    pub currency: Option<Currency>,

    /// Offer single payment only.
    #[serde(default)]
    pub no_installment: bool,

    /// Maximum installment count shown to the customer, `0` for no limit.
    #[serde(default)]
    pub max_installment: u8,

    /// Run payments in test mode on a live store.
    #[serde(default)]
    pub test_mode: bool,

    /// Ask the gateway to return detailed error messages.
    #[serde(default)]
    pub debug_on: bool,

    /// Minutes the customer has to complete the payment.
    #[serde(default = "default_timeout_limit")]
    pub timeout_limit: u32,

    /// Redirect target after a successful payment.
    #[serde(default)]
    pub merchant_ok_url: Option<String>,

    /// Redirect target after a failed payment.
    #[serde(default)]
    pub merchant_fail_url: Option<String>,
}

impl Default for PaymentOptions {
    fn default() -> Self {
        Self {
            currency: None,
            no_installment: false,
            max_installment: 0,
            test_mode: false,
            debug_on: false,
            timeout_limit: default_timeout_limit(),
            merchant_ok_url: None,
            merchant_fail_url: None,
        }
    }
}

impl PaymentOptions {
    /// Validates installment bounds, timeout and redirect URLs.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.max_installment > MAX_INSTALLMENT_LIMIT {
            return Err(PaytrError::ConfigError(format!(
                "max_installment must be between 0 and {MAX_INSTALLMENT_LIMIT}, got {}",
                self.max_installment
            )));
        }
        if self.timeout_limit == 0 {
            return Err(PaytrError::ConfigError("timeout_limit must be at least 1 minute".to_owned()));
        }
        for (name, url) in [
            ("merchant_ok_url", &self.merchant_ok_url),
            ("merchant_fail_url", &self.merchant_fail_url),
        ] {
            if let Some(url) = url {
                validate_redirect_url(name, url)?;
            }
        }
        Ok(())
    }
}

fn default_timeout_limit() -> u32 {
    30
}

fn validate_redirect_url(name: &str, url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| PaytrError::ConfigError(format!("invalid {name} '{url}': {e}")))?;
    if !matches!(parsed.scheme(), "https" | "http") {
        return Err(PaytrError::ConfigError(format!(
            "{name} must be an HTTP(S) URL, got: {}",
            parsed.scheme()
        )));
    }
    Ok(())
}

/// Currencies accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Turkish lira.
    #[serde(rename = "TL")]
    Tl,
    /// Euro.
    #[serde(rename = "EUR")]
    Eur,
    /// US dollar.
    #[serde(rename = "USD")]
    Usd,
    /// Pound sterling.
    #[serde(rename = "GBP")]
    Gbp,
    /// Russian ruble.
    #[serde(rename = "RUB")]
    Rub,
}

impl Currency {
    /// Returns the code sent in the `currency` form field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tl => "TL",
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Rub => "RUB",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = PaytrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TL" | "TRY" => Ok(Self::Tl),
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "RUB" => Ok(Self::Rub),
            _ => Err(PaytrError::ConfigError(format!("unsupported currency: {s}"))),
        }
    }
}

/// Merchant id plus signing secrets.
///
/// The secrets are redacted in [`Debug`] output.
#[derive(Debug, Clone)]
pub struct MerchantCredentials {
    merchant_id: String,
    secrets: MerchantSecrets,
}

impl MerchantCredentials {
    /// Creates credentials from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if any value is empty.
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_key: impl Into<String>,
        merchant_salt: impl Into<String>,
    ) -> Result<Self> {
        let merchant_id = merchant_id.into();
        if merchant_id.trim().is_empty() {
            return Err(PaytrError::ConfigError("merchant id must not be empty".to_owned()));
        }
        Ok(Self { merchant_id, secrets: MerchantSecrets::new(merchant_key, merchant_salt)? })
    }

    /// Reads credentials from `PAYTR_MERCHANT_ID`, `PAYTR_MERCHANT_KEY` and
    /// `PAYTR_MERCHANT_SALT`.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(ENV_MERCHANT_ID, ENV_MERCHANT_KEY, ENV_MERCHANT_SALT)
    }

    /// Reads credentials from custom environment variable names.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] naming the first missing or empty
    /// variable. Values are never included in the message.
    pub fn from_env_vars(id_var: &str, key_var: &str, salt_var: &str) -> Result<Self> {
        Self::new(read_env(id_var)?, read_env(key_var)?, read_env(salt_var)?)
    }

    /// Merchant id issued by the gateway.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Signing secrets.
    #[must_use]
    pub const fn secrets(&self) -> &MerchantSecrets {
        &self.secrets
    }
}

fn read_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(PaytrError::ConfigError(format!("environment variable {name} is empty"))),
        Err(_) => Err(PaytrError::ConfigError(format!("environment variable {name} is not set"))),
    }
}
