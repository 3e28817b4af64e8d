//! PayTR CLI - command-line harness for the PayTR client library
//!
//! Requests iframe tokens, verifies callback hashes and prints encoded
//! baskets. Merchant credentials are read from `PAYTR_MERCHANT_ID`,
//! `PAYTR_MERCHANT_KEY` and `PAYTR_MERCHANT_SALT`.
//!
//! # Examples
//!
//! ```bash
//! paytr-cli basket --item 'Kalem:10.50:3'
//! paytr-cli token --merchant-oid SP1001 --user-ip 203.0.113.7 \
//!     --email buyer@example.com --amount 3150 --item 'Kalem:10.50:3' --test-mode
//! paytr-cli verify-callback --merchant-oid SP1001 --status success \
//!     --total-amount 3150 --hash '...'
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command output goes to stdout, diagnostics to stderr"
)]

mod observability;

use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use paytr_client::{
    BasketItem, CallbackNotification, GatewayClient, GatewayConfig, MerchantCredentials,
    PaytrError, Result, TokenRequest, config::Currency, encode_basket, verify_callback,
};
use tracing::{error, info};

use crate::observability::{LogFormat, init_observability};

#[derive(Debug, Parser)]
#[command(name = "paytr-cli", version, about = "PayTR token requests and callback verification")]
struct Cli {
    /// TOML gateway configuration. Defaults apply when omitted.
    #[arg(long, short, global = true, env = "PAYTR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Request an iframe token from the gateway.
    Token(TokenArgs),
    /// Check the hash of a payment notification.
    VerifyCallback(VerifyArgs),
    /// Print the encoded basket for the given items.
    Basket {
        /// Item as `name:unit_price:quantity`. Repeat for each item.
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<BasketItem>,
    },
}

#[derive(Debug, Args)]
struct TokenArgs {
    /// Merchant order id (alphanumeric).
    #[arg(long)]
    merchant_oid: String,
    /// Customer IP address.
    #[arg(long)]
    user_ip: String,
    /// Customer e-mail address.
    #[arg(long)]
    email: String,
    /// Payment amount in minor units.
    #[arg(long)]
    amount: u64,
    /// Item as `name:unit_price:quantity`. Repeat for each item.
    #[arg(long = "item", required = true, value_parser = parse_item)]
    items: Vec<BasketItem>,
    /// Customer name.
    #[arg(long, default_value = "")]
    user_name: String,
    /// Customer address.
    #[arg(long, default_value = "")]
    user_address: String,
    /// Customer phone.
    #[arg(long, default_value = "")]
    user_phone: String,
    /// Currency code (TL, EUR, USD, GBP, RUB).
    #[arg(long)]
    currency: Option<Currency>,
    /// Send the request in test mode.
    #[arg(long)]
    test_mode: bool,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// `merchant_oid` field of the notification.
    #[arg(long)]
    merchant_oid: String,
    /// `status` field of the notification.
    #[arg(long)]
    status: String,
    /// `total_amount` field of the notification.
    #[arg(long)]
    total_amount: String,
    /// `hash` field of the notification.
    #[arg(long)]
    hash: String,
}

/// Parses `name:unit_price:quantity`, splitting from the right so names may contain `:`.
fn parse_item(value: &str) -> std::result::Result<BasketItem, String> {
    let mut parts = value.rsplitn(3, ':');
    let (Some(quantity), Some(price), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected name:unit_price:quantity, got '{value}'"));
    };
    let quantity = quantity.parse::<u32>().map_err(|e| format!("invalid quantity '{quantity}': {e}"))?;
    Ok(BasketItem::new(name, price, quantity))
}

fn load_config(path: Option<&PathBuf>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path),
        None => Ok(GatewayConfig::default()),
    }
}

async fn run_token(config: GatewayConfig, args: TokenArgs) -> Result<ExitCode> {
    let client = GatewayClient::new(MerchantCredentials::from_env()?, config)?;

    let mut request = TokenRequest::new(args.merchant_oid, args.user_ip, args.email, args.amount, args.items)
        .with_customer(args.user_name, args.user_address, args.user_phone);
    request.currency = args.currency;
    if args.test_mode {
        request = request.with_test_mode(true);
    }

    let response = client.get_token(&request).await?;
    info!(status = %response.status, "token request finished");

    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|e| PaytrError::EncodingError(format!("failed to render response: {e}")))?;
    println!("{rendered}");

    match response.iframe_url() {
        Some(url) => {
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn run_verify(args: VerifyArgs) -> Result<ExitCode> {
    let credentials = MerchantCredentials::from_env()?;
    let notification = CallbackNotification {
        merchant_oid: args.merchant_oid,
        status: args.status,
        total_amount: args.total_amount,
        hash: args.hash,
        ..CallbackNotification::default()
    };

    let verdict = verify_callback(&notification, credentials.secrets());
    println!("authentic: {}", verdict.authentic);
    println!("computed_hash: {}", verdict.computed_hash);

    Ok(if verdict.authentic { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Command::Token(args) => run_token(config, args).await,
        Command::VerifyCallback(args) => run_verify(args),
        Command::Basket { items } => {
            println!("{}", encode_basket(&items)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, transient = e.is_transient(), "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
