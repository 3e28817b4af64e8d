//! Token request client.
//!
//! [`GatewayClient::get_token`] turns a [`TokenRequest`] into a signed form,
//! POSTs it to the token endpoint and parses the JSON answer. One call is one
//! HTTP exchange: nothing is retried and nothing is cached.
//!
//! # Examples
//!
//! ```rust,no_run
//! use paytr_client::{
//!     basket::BasketItem,
//!     config::{GatewayConfig, MerchantCredentials},
//!     gateway::{GatewayClient, TokenRequest},
//! };
//!
//! # async fn example() -> paytr_client::Result<()> {
//! let client = GatewayClient::new(MerchantCredentials::from_env()?, GatewayConfig::default())?;
//!
//! let request = TokenRequest::new("SP1001", "203.0.113.7", "buyer@example.com", 3588, vec![
//!     BasketItem::new("Kalem", "35.88", 1),
//! ])
//! .with_customer("Ada Lovelace", "Moda Cd. 1, Istanbul", "05550000000");
//!
//! let response = client.get_token(&request).await?;
//! if let Some(url) = response.iframe_url() {
//!     println!("embed {url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod form;
pub mod models;

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::{Span, debug, instrument, warn};
use url::Url;

pub use self::{
    form::FORM_FIELDS,
    models::{GatewayResponse, IFRAME_BASE_URL, PaymentStatus},
};
use self::form::PaymentForm;
use crate::{
    basket::{BasketItem, encode_basket},
    config::{Currency, GatewayConfig, MerchantCredentials, PaymentOptions},
    error::{PaytrError, Result},
    signing::sign_token,
    transport::{HttpTransport, Transport, TransportResponse},
};

/// One payment attempt.
///
/// The optional fields override the matching [`PaymentOptions`] of the
/// client configuration for this request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Merchant order id. Alphanumeric, unique per attempt.
    pub merchant_oid: String,
    /// Customer IP address as seen by the merchant.
    pub user_ip: String,
    /// Customer e-mail address.
    pub email: String,
    /// Total amount in minor units (`3588` for 35.88).
    pub payment_amount: u64,
    /// Purchased items.
    pub items: Vec<BasketItem>,
    /// Customer full name.
    #[serde(default)]
    pub user_name: String,
    /// Customer postal address.
    #[serde(default)]
    pub user_address: String,
    /// Customer phone number.
    #[serde(default)]
    pub user_phone: String,
    /// Overrides [`PaymentOptions::no_installment`].
    #[serde(default)]
    pub no_installment: Option<bool>,
    /// Overrides [`PaymentOptions::max_installment`].
    #[serde(default)]
    pub max_installment: Option<u8>,
    /// Overrides [`PaymentOptions::currency`].
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Overrides [`PaymentOptions::test_mode`].
    #[serde(default)]
    pub test_mode: Option<bool>,
    /// Overrides [`PaymentOptions::debug_on`].
    #[serde(default)]
    pub debug_on: Option<bool>,
    /// Overrides [`PaymentOptions::timeout_limit`].
    #[serde(default)]
    pub timeout_limit: Option<u32>,
    /// Overrides [`PaymentOptions::merchant_ok_url`].
    #[serde(default)]
    pub merchant_ok_url: Option<String>,
    /// Overrides [`PaymentOptions::merchant_fail_url`].
    #[serde(default)]
    pub merchant_fail_url: Option<String>,
}

impl TokenRequest {
    /// Creates a request with no customer details and no overrides.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(
        merchant_oid: impl Into<String>,
        user_ip: impl Into<String>,
        email: impl Into<String>,
        payment_amount: u64,
        items: Vec<BasketItem>,
    ) -> Self {
        Self {
            merchant_oid: merchant_oid.into(),
            user_ip: user_ip.into(),
            email: email.into(),
            payment_amount,
            items,
            user_name: String::new(),
            user_address: String::new(),
            user_phone: String::new(),
            no_installment: None,
            max_installment: None,
            currency: None,
            test_mode: None,
            debug_on: None,
            timeout_limit: None,
            merchant_ok_url: None,
            merchant_fail_url: None,
        }
    }

    /// Sets the customer name, address and phone.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builders"
    )]
    pub fn with_customer(
        mut self,
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        self.user_name = name.into();
        self.user_address = address.into();
        self.user_phone = phone.into();
        self
    }

    /// Overrides the currency.
    #[must_use]
    pub const fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Overrides the installment settings.
    #[must_use]
    pub const fn with_installments(mut self, no_installment: bool, max_installment: u8) -> Self {
        self.no_installment = Some(no_installment);
        self.max_installment = Some(max_installment);
        self
    }

    /// Overrides test mode.
    #[must_use]
    pub const fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = Some(test_mode);
        self
    }

    /// Checks the request fields that are not covered by [`PaymentOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ValidationError`] if the order id is empty or
    /// not alphanumeric, the IP does not parse, the e-mail is empty, the
    /// amount is zero, or the basket is empty.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_oid.is_empty() {
            return Err(PaytrError::ValidationError("missing required field: merchant_oid".to_owned()));
        }
        if !self.merchant_oid.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(PaytrError::ValidationError(format!(
                "merchant_oid must be alphanumeric: {}",
                self.merchant_oid
            )));
        }
        if self.user_ip.parse::<IpAddr>().is_err() {
            return Err(PaytrError::ValidationError(format!(
                "user_ip is not an IP address: '{}'",
                self.user_ip
            )));
        }
        if self.email.trim().is_empty() {
            return Err(PaytrError::ValidationError("missing required field: email".to_owned()));
        }
        if self.payment_amount == 0 {
            return Err(PaytrError::ValidationError("payment_amount must be positive".to_owned()));
        }
        if self.items.is_empty() {
            return Err(PaytrError::ValidationError("basket must contain at least one item".to_owned()));
        }
        Ok(())
    }

    /// Applies the overrides of this request to `defaults`.
    #[must_use]
    pub fn effective_options(&self, defaults: &PaymentOptions) -> PaymentOptions {
        PaymentOptions {
            currency: self.currency.or(defaults.currency),
            no_installment: self.no_installment.unwrap_or(defaults.no_installment),
            max_installment: self.max_installment.unwrap_or(defaults.max_installment),
            test_mode: self.test_mode.unwrap_or(defaults.test_mode),
            debug_on: self.debug_on.unwrap_or(defaults.debug_on),
            timeout_limit: self.timeout_limit.unwrap_or(defaults.timeout_limit),
            merchant_ok_url: self.merchant_ok_url.clone().or_else(|| defaults.merchant_ok_url.clone()),
            merchant_fail_url: self
                .merchant_fail_url
                .clone()
                .or_else(|| defaults.merchant_fail_url.clone()),
        }
    }
}

/// Client for the token endpoint.
///
/// Cheap to share behind a reference: all methods take `&self` and the
/// underlying HTTP connection pool is reused across calls.
#[derive(Debug, Clone)]
pub struct GatewayClient<T: Transport = HttpTransport> {
    credentials: MerchantCredentials,
    config: GatewayConfig,
    endpoint: Url,
    transport: T,
}

impl GatewayClient<HttpTransport> {
    /// Creates a client with an HTTP transport built from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the configuration is invalid,
    /// or [`PaytrError::TransportError`] if the HTTP client cannot be built.
    pub fn new(credentials: MerchantCredentials, config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.http)?;
        Self::with_transport(credentials, config, transport)
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Creates a client over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the configuration is invalid.
    pub fn with_transport(credentials: MerchantCredentials, config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        Ok(Self { credentials, config, endpoint, transport })
    }

    /// Token endpoint in use.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Requests an iframe token for `request`.
    ///
    /// A `failed` status in a well-formed answer is returned as `Ok`; use
    /// [`GatewayResponse::into_token`] to turn it into an error.
    ///
    /// # Errors
    ///
    /// - [`PaytrError::ValidationError`] for invalid request fields or overrides
    /// - [`PaytrError::EncodingError`] for an unencodable basket item
    /// - [`PaytrError::TransportError`] if the POST fails or times out
    /// - [`PaytrError::ResponseFormatError`] if the body is not a JSON object
    ///   with a `status` field, or reports `success` without a `token`
    #[instrument(
        skip(self, request),
        fields(
            merchant_oid = %request.merchant_oid,
            item_count = request.items.len(),
            protocol = self.transport.protocol_name(),
            http_status = tracing::field::Empty,
        )
    )]
    pub async fn get_token(&self, request: &TokenRequest) -> Result<GatewayResponse> {
        request.validate()?;

        let options = request.effective_options(&self.config.payment);
        options.validate().map_err(|e| match e {
            PaytrError::ConfigError(msg) => PaytrError::ValidationError(msg),
            other => other,
        })?;

        let user_basket = encode_basket(&request.items)?;
        let form = PaymentForm::new(self.credentials.merchant_id(), request, &options, user_basket);
        let paytr_token = sign_token(&form.token_fields(), self.credentials.secrets())?;

        let response = self.transport.post_form(&self.endpoint, &form.into_pairs(paytr_token)).await?;
        Span::current().record("http_status", response.status);

        parse_response(response)
    }
}

/// Decodes the JSON answer, keeping status and body on failure.
///
/// A `success` answer without a token counts as malformed.
fn parse_response(response: TransportResponse) -> Result<GatewayResponse> {
    let reason = match serde_json::from_slice::<GatewayResponse>(&response.body) {
        Ok(parsed) if parsed.is_success() && parsed.token.is_empty() => {
            "success response without token".to_owned()
        }
        Ok(parsed) => {
            debug!(status = %parsed.status, "gateway answered");
            return Ok(parsed);
        }
        Err(e) => e.to_string(),
    };

    warn!(
        http_status = response.status,
        body_len = response.body.len(),
        content_type = response.content_type.as_deref().unwrap_or(""),
        "unparseable gateway response"
    );
    Err(PaytrError::ResponseFormatError { status: response.status, body: response.body_text(), reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_request() -> TokenRequest {
        TokenRequest::new("SP1001", "192.168.1.56", "buyer@example.com", 3588, vec![BasketItem::new(
            "Kalem", "35.88", 1,
        )])
    }

    fn fixture_credentials() -> MerchantCredentials {
        MerchantCredentials::new("100001", "YZ1pKmQeTZ7cvw3R", "gF4cLw8aZ2hNq6Ts").unwrap()
    }

    #[test]
    fn test_request_validation() {
        assert!(fixture_request().validate().is_ok());

        let cases = [
            TokenRequest { merchant_oid: String::new(), ..fixture_request() },
            TokenRequest { merchant_oid: "SP-1001".to_owned(), ..fixture_request() },
            TokenRequest { user_ip: "not-an-ip".to_owned(), ..fixture_request() },
            TokenRequest { email: " ".to_owned(), ..fixture_request() },
            TokenRequest { payment_amount: 0, ..fixture_request() },
            TokenRequest { items: Vec::new(), ..fixture_request() },
        ];
        for request in cases {
            assert!(
                matches!(request.validate(), Err(PaytrError::ValidationError(_))),
                "{request:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ipv6_user_ip_is_accepted() {
        let request = TokenRequest { user_ip: "2001:db8::1".to_owned(), ..fixture_request() };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_effective_options_prefers_overrides() {
        let defaults = PaymentOptions {
            currency: Some(Currency::Tl),
            max_installment: 3,
            merchant_ok_url: Some("https://shop.example.com/ok".to_owned()),
            ..PaymentOptions::default()
        };
        let request = fixture_request().with_currency(Currency::Eur).with_installments(true, 0).with_test_mode(true);

        let options = request.effective_options(&defaults);
        assert_eq!(options.currency, Some(Currency::Eur));
        assert!(options.no_installment);
        assert_eq!(options.max_installment, 0);
        assert!(options.test_mode);
        assert_eq!(options.timeout_limit, defaults.timeout_limit);
        assert_eq!(options.merchant_ok_url, defaults.merchant_ok_url);
    }

    #[test]
    fn test_effective_options_without_overrides_equals_defaults() {
        let defaults = PaymentOptions { debug_on: true, timeout_limit: 5, ..PaymentOptions::default() };
        assert_eq!(fixture_request().effective_options(&defaults), defaults);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{
            "merchant_oid": "SP1",
            "user_ip": "10.0.0.1",
            "email": "a@b.c",
            "payment_amount": 100,
            "items": [{"name": "A", "unit_price": "1.00", "quantity": 1}],
            "currency": "USD"
        }"#;
        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.currency, Some(Currency::Usd));
        assert!(request.user_name.is_empty());
        assert!(request.test_mode.is_none());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = GatewayConfig { endpoint: "http://www.paytr.com/odeme/api/get-token".to_owned(), ..GatewayConfig::default() };
        let result = GatewayClient::new(fixture_credentials(), config);
        assert!(matches!(result, Err(PaytrError::ConfigError(_))));
    }

    #[test]
    fn test_client_uses_default_endpoint() {
        let client = GatewayClient::new(fixture_credentials(), GatewayConfig::default()).unwrap();
        assert_eq!(client.endpoint().as_str(), crate::config::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_parse_response_success() {
        let response = TransportResponse {
            status: 200,
            content_type: Some("application/json".to_owned()),
            body: br#"{"status":"success","token":"abc"}"#.to_vec(),
        };
        let parsed = parse_response(response).unwrap();
        assert_eq!(parsed.token, "abc");
    }

    #[test]
    fn test_parse_response_keeps_status_and_body() {
        let response = TransportResponse {
            status: 502,
            content_type: Some("text/html".to_owned()),
            body: b"<html>Bad Gateway</html>".to_vec(),
        };
        let err = parse_response(response).unwrap_err();
        assert!(matches!(
            err,
            PaytrError::ResponseFormatError { status: 502, ref body, .. } if body == "<html>Bad Gateway</html>"
        ));
    }

    #[test]
    fn test_parse_response_success_without_token() {
        let body = br#"{"status":"success"}"#.to_vec();
        let response = TransportResponse { status: 200, content_type: None, body };
        let err = parse_response(response).unwrap_err();
        assert!(matches!(
            err,
            PaytrError::ResponseFormatError { status: 200, ref body, ref reason }
                if body == r#"{"status":"success"}"# && reason.contains("without token")
        ));
    }

    #[test]
    fn test_parse_response_failed_without_token_is_ok() {
        let body = br#"{"status":"failed","reason":"x"}"#.to_vec();
        let response = TransportResponse { status: 200, content_type: None, body };
        assert_eq!(parse_response(response).unwrap().status, PaymentStatus::Failed);
    }

    #[test]
    fn test_parse_response_missing_status() {
        let response = TransportResponse { status: 200, content_type: None, body: br#"{"token":"abc"}"#.to_vec() };
        assert!(matches!(parse_response(response), Err(PaytrError::ResponseFormatError { status: 200, .. })));
    }

    #[tokio::test]
    async fn test_get_token_rejects_invalid_override_before_sending() {
        let client = GatewayClient::new(fixture_credentials(), GatewayConfig::default()).unwrap();
        let request = fixture_request().with_installments(false, 24);
        let err = client.get_token(&request).await.unwrap_err();
        assert!(matches!(err, PaytrError::ValidationError(ref msg) if msg.contains("max_installment")));
    }
}
