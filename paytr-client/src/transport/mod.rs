//! Transport layer for gateway calls.
//!
//! The [`Transport`] trait separates HTTP mechanics from request assembly:
//! the gateway client builds and signs the form, the transport delivers it and
//! hands back the raw status and body.
//!
//! # Examples
//!
//! ```rust,no_run
//! use paytr_client::transport::{HttpTransport, Transport};
//! use url::Url;
//!
//! # async fn example() -> paytr_client::Result<()> {
//! let transport = HttpTransport::new()?;
//! let url = Url::parse("https://www.paytr.com/odeme/api/get-token").unwrap();
//! let form = vec![("merchant_id", "100001".to_owned())];
//!
//! let response = transport.post_form(&url, &form).await?;
//! println!("HTTP {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use url::Url;

use crate::error::Result;

pub mod config;
pub mod http;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Raw response from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns the body lossily decoded as UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Delivers form-encoded requests to the gateway.
///
/// This trait is sealed; [`HttpTransport`] is the only implementation.
///
/// Dropping the returned future aborts the in-flight request.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// POSTs `form` as `application/x-www-form-urlencoded` to `url`.
    ///
    /// Non-2xx statuses are returned as responses, not errors, so that the
    /// caller can report the body.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::TransportError`](crate::PaytrError::TransportError)
    /// on connection failure or timeout, and
    /// [`PaytrError::ConfigError`](crate::PaytrError::ConfigError) if `url`
    /// is not an HTTP(S) URL with a host.
    fn post_form<'a>(
        &'a self,
        url: &'a Url,
        form: &'a [(&'static str, String)],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_lossy() {
        let response = TransportResponse {
            status: 200,
            content_type: None,
            body: vec![b'o', b'k', 0xff],
        };
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }

    #[test]
    fn test_transport_response_debug() {
        let response = TransportResponse {
            status: 502,
            content_type: Some("text/html".to_owned()),
            body: b"Bad Gateway".to_vec(),
        };
        let debug_str = format!("{response:?}");
        assert!(debug_str.contains("TransportResponse"));
        assert!(debug_str.contains("502"));
    }
}
