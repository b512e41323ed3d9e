//! Order endpoint client.
//!
//! Sends the finished order as a single JSON `POST`. No retries: a failed
//! attempt is reported back to the customer, who may resubmit.

use certificate_order_core::OrderPayload;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::WebhookConfig;

/// Errors that can occur when sending an order.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No endpoint URL is configured; nothing was sent.
    #[error("webhook URL not configured")]
    NotConfigured,

    /// The request could not be sent or no response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("webhook request failed: {status}")]
    Rejected { status: u16 },
}

/// Client for the configured order endpoint.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    endpoint: Option<SecretString>,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient")
            .field("endpoint", &self.endpoint.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl WebhookClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.url.clone(),
        })
    }

    /// Whether an endpoint URL is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send an order to the endpoint.
    ///
    /// Any 2xx status counts as accepted; the response body is not read.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::NotConfigured`] without making a request when
    /// no endpoint is set, [`WebhookError::Http`] on transport failure and
    /// [`WebhookError::Rejected`] for any other status.
    pub async fn send_order(&self, payload: &OrderPayload) -> Result<(), WebhookError> {
        let endpoint = self.endpoint.as_ref().ok_or(WebhookError::NotConfigured)?;

        let response = self
            .client
            .post(endpoint.expose_secret())
            .json(payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            return Err(WebhookError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use certificate_order_core::{Catalog, OrderDraft, SizeCode};
    use chrono::Utc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn payload() -> OrderPayload {
        let draft = OrderDraft {
            size: Some(SizeCode::SixBySix),
            ..OrderDraft::default()
        };
        OrderPayload::build(&draft, &Catalog::default(), Utc::now())
    }

    fn client_for(url: Option<String>) -> WebhookClient {
        WebhookClient::new(&WebhookConfig {
            url: url.map(SecretString::from),
            timeout: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_order_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(Some(format!("{}/orders", server.uri())));
        client.send_order(&payload()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["certificateSize"], "6x6");
        assert_eq!(body["productId"], 4843);
        assert_eq!(body["price"], "$89.99");
    }

    #[tokio::test]
    async fn test_any_success_status_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = client_for(Some(server.uri()));
        assert!(client.send_order(&payload()).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(Some(server.uri()));
        let err = client.send_order(&payload()).await.unwrap_err();
        assert!(matches!(err, WebhookError::Rejected { status: 500 }));
    }

    #[tokio::test]
    async fn test_not_configured_sends_nothing() {
        let client = client_for(None);
        assert!(!client.is_configured());
        let err = client.send_order(&payload()).await.unwrap_err();
        assert!(matches!(err, WebhookError::NotConfigured));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Nothing listens on port 1.
        let client = client_for(Some("http://127.0.0.1:1/orders".to_string()));
        let err = client.send_order(&payload()).await.unwrap_err();
        assert!(matches!(err, WebhookError::Http(_)));
    }

    #[tokio::test]
    async fn test_debug_redacts_endpoint() {
        let client = client_for(Some("https://hooks.example.com/secret-token".to_string()));
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret-token"));
    }
}
