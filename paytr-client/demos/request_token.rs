//! Requests an iframe token for a sample basket.
//!
//! # Running this demo
//!
//! Set the merchant credentials issued in the PayTR merchant panel and run:
//! ```bash
//! export PAYTR_MERCHANT_ID=<id>
//! export PAYTR_MERCHANT_KEY=<key>
//! export PAYTR_MERCHANT_SALT=<salt>
//! cargo run --example request_token
//! ```
//!
//! The request is sent with `test_mode = 1`, so no card is charged.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "demos are allowed to use println"
)]

use paytr_client::{
    BasketItem, GatewayClient, GatewayConfig, MerchantCredentials, PaytrError, TokenRequest,
    config::{Currency, PaymentOptions},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("paytr_client=debug").init();

    let credentials = MerchantCredentials::from_env()?;
    let config = GatewayConfig {
        payment: PaymentOptions {
            currency: Some(Currency::Tl),
            test_mode: true,
            merchant_ok_url: Some("https://shop.example.com/payment/ok".to_owned()),
            merchant_fail_url: Some("https://shop.example.com/payment/fail".to_owned()),
            ..PaymentOptions::default()
        },
        ..GatewayConfig::default()
    };
    let client = GatewayClient::new(credentials, config)?;

    let merchant_oid = format!(
        "DEMO{}",
        std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)?.as_secs()
    );
    let request = TokenRequest::new(&merchant_oid, "203.0.113.7", "buyer@example.com", 14_350, vec![
        BasketItem::new("Örnek ürün 1", "18.00", 1),
        BasketItem::new("Örnek ürün 2", "33.25", 2),
        BasketItem::new("Örnek ürün 3", "45.42", 1),
    ])
    .with_customer("Ada Lovelace", "Moda Cd. 1, Kadikoy, Istanbul", "05550000000");

    println!("Requesting token for order {merchant_oid}...");

    let response = client.get_token(&request).await?;
    match response.iframe_url() {
        Some(url) => println!("Payment page: {url}"),
        None => match response.into_token() {
            Err(PaytrError::GatewayRejected { reason }) => eprintln!("Gateway rejected the request: {reason}"),
            Err(e) => eprintln!("Unexpected answer: {e}"),
            Ok(_) => {}
        },
    }

    Ok(())
}
