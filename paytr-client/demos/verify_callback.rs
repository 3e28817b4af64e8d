//! Verifies a payment notification the way a callback endpoint would.
//!
//! The form body is taken from the first argument, or a built-in sample
//! signed with demo secrets is used.
//!
//! # Running this demo
//!
//! ```bash
//! cargo run --example verify_callback
//! cargo run --example verify_callback -- 'merchant_oid=SP1&status=success&total_amount=100&hash=...'
//! ```
//!
//! Set `PAYTR_MERCHANT_KEY` and `PAYTR_MERCHANT_SALT` to check real notifications.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "demos are allowed to use println"
)]

use paytr_client::{
    CALLBACK_ACK, CallbackNotification, MerchantSecrets, PaytrError, verify_callback,
};

const SAMPLE_BODY: &str = "merchant_oid=20190925T113214&status=success&total_amount=3588&hash=43VSVqDyUbJudTukeO4cJKVgvgTYu15qL6dRv%2BknO7g%3D&payment_type=card&currency=TL";

fn load_secrets() -> Result<MerchantSecrets, PaytrError> {
    match (std::env::var("PAYTR_MERCHANT_KEY"), std::env::var("PAYTR_MERCHANT_SALT")) {
        (Ok(key), Ok(salt)) => MerchantSecrets::new(key, salt),
        _ => MerchantSecrets::new("YZ1pKmQeTZ7cvw3R", "gF4cLw8aZ2hNq6Ts"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let body = std::env::args().nth(1).unwrap_or_else(|| SAMPLE_BODY.to_owned());
    let notification = CallbackNotification::from_pairs(url::form_urlencoded::parse(body.as_bytes()));

    let secrets = load_secrets()?;
    let verdict = verify_callback(&notification, &secrets);

    println!("Order:         {}", notification.merchant_oid);
    println!("Status:        {}", notification.status);
    println!("Total amount:  {}", notification.total_amount);
    println!("Computed hash: {}", verdict.computed_hash);
    println!("Authentic:     {}", verdict.authentic);

    verdict.ensure_authentic()?;

    if notification.is_success() {
        println!("Payment confirmed, fulfil the order.");
    } else {
        println!(
            "Payment failed: {}",
            notification.failed_reason_msg.as_deref().unwrap_or("no reason given")
        );
    }
    println!("Reply to gateway: {CALLBACK_ACK}");

    Ok(())
}
