//! HTTP transport implementation using reqwest.

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{PaytrError, Result},
    transport::{Transport, TransportResponse, sealed},
};

/// Ensures the URL is HTTP(S) and has a host.
///
/// Whether plain HTTP is acceptable is decided by
/// [`GatewayConfig::validate`](crate::config::GatewayConfig::validate).
fn validate_url(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "https" | "http") {
        return Err(PaytrError::ConfigError(format!(
            "unsupported URL scheme '{}': {url}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(PaytrError::ConfigError(format!("URL missing host: {url}")));
    }
    Ok(())
}

/// HTTP/1.1 and HTTP/2 transport.
///
/// # Examples
///
/// ```
/// use paytr_client::transport::{HttpConfig, HttpTransport, HttpVersion};
///
/// let config = HttpConfig { timeout_secs: 15, http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with [`HttpConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend failure).
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PaytrError::ConfigError`] if the configuration is out of
    /// bounds, or [`PaytrError::TransportError`] if the client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build()?;

        Ok(Self { client, http_version: config.http_version })
    }

    #[instrument(
        skip(self, form),
        fields(url = %url, field_count = form.len(), status = tracing::field::Empty)
    )]
    async fn execute_post(
        &self,
        url: &Url,
        form: &[(&'static str, String)],
    ) -> Result<TransportResponse> {
        validate_url(url)?;

        let response = self.client.post(url.clone()).form(form).send().await?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await?.to_vec();
        debug!(body_len = body.len(), "gateway responded");

        Ok(TransportResponse { status, content_type, body })
    }
}

impl Transport for HttpTransport {
    async fn post_form<'a>(
        &'a self,
        url: &'a Url,
        form: &'a [(&'static str, String)],
    ) -> Result<TransportResponse> {
        self.execute_post(url, form).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_new() {
        let transport = HttpTransport::new();
        assert!(transport.is_ok());
    }

    #[test]
    fn test_http_transport_protocol_name() {
        for (version, name) in [
            (HttpVersion::Http1, "http/1.1"),
            (HttpVersion::Http2, "http/2"),
            (HttpVersion::Auto, "http"),
        ] {
            let config = HttpConfig { http_version: version, ..HttpConfig::default() };
            let transport = HttpTransport::with_config(&config).unwrap();
            assert_eq!(transport.protocol_name(), name);
        }
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let config = HttpConfig { timeout_secs: 0, ..HttpConfig::default() };
        let result = HttpTransport::with_config(&config);
        assert!(matches!(result, Err(PaytrError::ConfigError(_))));
    }

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url(&Url::parse("https://www.paytr.com/odeme/api/get-token").unwrap()).is_ok());
        assert!(validate_url(&Url::parse("http://127.0.0.1:8080/get-token").unwrap()).is_ok());

        let result = validate_url(&Url::parse("file:///etc/passwd").unwrap());
        assert!(matches!(result, Err(PaytrError::ConfigError(_))));

        let result = validate_url(&Url::parse("ftp://example.com/token").unwrap());
        assert!(matches!(result, Err(PaytrError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_post_form_rejects_unsupported_scheme() {
        let transport = HttpTransport::new().unwrap();
        let url = Url::parse("file:///tmp/token").unwrap();
        let result = transport.post_form(&url, &[]).await;
        assert!(matches!(result, Err(PaytrError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_post_form_connection_refused_is_transport_error() {
        let config = HttpConfig { connect_timeout_secs: 2, timeout_secs: 5, ..HttpConfig::default() };
        let transport = HttpTransport::with_config(&config).unwrap();
        // Port 9 (discard) is closed on loopback in test environments.
        let url = Url::parse("http://127.0.0.1:9/odeme/api/get-token").unwrap();

        let result = transport.post_form(&url, &[("merchant_id", "1".to_owned())]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, PaytrError::TransportError(_)), "unexpected error: {err}");
        assert!(err.is_transient());
    }
}
