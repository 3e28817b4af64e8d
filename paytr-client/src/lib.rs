//! PayTR Client: Token Requests and Callback Verification for the PayTR Gateway
//!
//! A Rust library for merchants integrating the PayTR iframe payment flow. It
//! builds the canonical basket string, signs token requests, posts them to the
//! gateway and verifies the payment notifications the gateway sends back.
//!
//! # What does it cover?
//!
//! - **Basket Encoding**: items serialized into the exact byte layout the gateway hashes
//! - **Request Signing**: HMAC-SHA256 `paytr_token` over the fixed field order
//! - **Token Requests**: async form POST with bounded timeouts and typed responses
//! - **Callback Verification**: constant-time check of the notification `hash`
//!
//! # Payment Flow
//!
//! ```text
//! ┌──────────────┐  1. get_token (signed form)   ┌──────────────┐
//! │   Merchant   │──────────────────────────────▶│    PayTR     │
//! │   backend    │◀──────────────────────────────│   gateway    │
//! │ (this crate) │      {status, token}          │              │
//! └──────┬───────┘                               └──────┬───────┘
//!        │ 2. iframe_url(token)                         │
//!        ▼                                              │
//! ┌──────────────┐       3. customer pays               │
//! │   Browser    │─────────────────────────────────────▶│
//! └──────────────┘                                      │
//!        ┌──────────────────────────────────────────────┘
//!        │ 4. callback {merchant_oid, status, total_amount, hash}
//!        ▼
//!   verify_callback ──▶ fulfil order ──▶ reply "OK"
//! ```
//!
//! # Quick Start
//!
//! ## 1. Request a Token
//!
//! ```rust,no_run
//! use paytr_client::{
//!     BasketItem, GatewayClient, GatewayConfig, MerchantCredentials, TokenRequest,
//!     config::Currency,
//! };
//!
//! # async fn example() -> paytr_client::Result<()> {
//! let credentials = MerchantCredentials::from_env()?;
//! let config = GatewayConfig::from_file("paytr.toml")?;
//! let client = GatewayClient::new(credentials, config)?;
//!
//! let request = TokenRequest::new("SP1001", "203.0.113.7", "buyer@example.com", 5642, vec![
//!     BasketItem::new("Örnek ürün 1", "18.00", 1),
//!     BasketItem::new("Örnek ürün 2", "33.25", 2),
//! ])
//! .with_customer("Ada Lovelace", "Moda Cd. 1, Istanbul", "05550000000")
//! .with_currency(Currency::Tl);
//!
//! let token = client.get_token(&request).await?.into_token()?;
//! println!("https://www.paytr.com/odeme/guvenli/{token}");
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Verify a Callback
//!
//! ```rust
//! use paytr_client::{CALLBACK_ACK, CallbackNotification, MerchantCredentials, verify_callback};
//!
//! # fn example() -> paytr_client::Result<()> {
//! let credentials = MerchantCredentials::new("100001", "merchant-key", "merchant-salt")?;
//!
//! // Decoded form body of the gateway's POST to the callback URL.
//! let notification = CallbackNotification::from_pairs([
//!     ("merchant_oid", "SP1001"),
//!     ("status", "success"),
//!     ("total_amount", "5642"),
//!     ("hash", "received-hash"),
//! ]);
//!
//! let verdict = verify_callback(&notification, credentials.secrets());
//! if verdict.authentic {
//!     // Mark the order paid, then answer the gateway.
//!     assert_eq!(CALLBACK_ACK, "OK");
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Configuration
//!
//! Credentials come from `PAYTR_MERCHANT_ID`, `PAYTR_MERCHANT_KEY` and
//! `PAYTR_MERCHANT_SALT`. Everything else lives in a TOML file:
//!
//! ```toml
//! endpoint = "https://www.paytr.com/odeme/api/get-token"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [payment]
//! currency = "TL"
//! max_installment = 0
//! timeout_limit = 30
//! merchant_ok_url = "https://shop.example.com/payment/ok"
//! merchant_fail_url = "https://shop.example.com/payment/fail"
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`] with [`PaytrError`]. Nothing is retried
//! internally:
//!
//! ```rust,no_run
//! use paytr_client::{GatewayClient, PaytrError, TokenRequest};
//!
//! # async fn example(client: GatewayClient, request: TokenRequest) {
//! match client.get_token(&request).await.and_then(|response| response.into_token()) {
//!     Ok(token) => println!("token: {token}"),
//!     Err(PaytrError::GatewayRejected { reason }) => eprintln!("rejected: {reason}"),
//!     Err(e) if e.is_transient() => eprintln!("try again later: {e}"),
//!     Err(e) => eprintln!("error: {e}"),
//! }
//! # }
//! ```
//!
//! # Security
//!
//! - Merchant key and salt are zeroized on drop and redacted in `Debug` output
//! - Neither the secrets nor the computed token are written to logs
//! - The endpoint must be HTTPS unless `allow_insecure_endpoint` is set

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and wiremock"
)]

pub mod basket;
pub mod config;
pub mod error;
pub mod gateway;
pub mod signing;
pub mod transport;

pub use basket::{BasketItem, encode_basket};
pub use config::{GatewayConfig, MerchantCredentials};
pub use error::{PaytrError, Result};
pub use gateway::{GatewayClient, GatewayResponse, PaymentStatus, TokenRequest};
pub use signing::{CALLBACK_ACK, CallbackNotification, CallbackVerdict, MerchantSecrets, verify_callback};
