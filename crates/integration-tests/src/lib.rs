//! Integration tests for the certificate order wizard.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p certificate-order-integration-tests
//! ```
//!
//! Each test starts the storefront in-process on an ephemeral port and
//! drives it with a cookie-keeping HTTP client, the way a browser would.
//! The order endpoint is a `wiremock` server.

use std::collections::HashMap;

use certificate_order_storefront::config::StorefrontConfig;
use certificate_order_storefront::state::AppState;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

/// A tiny PNG header; the storefront only looks at the declared type.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image body";

/// Required details for a complete order.
pub const DETAILS: &[(&str, &str)] = &[
    ("first_name", "Grace"),
    ("last_name", "Hopper"),
    ("email", "grace@example.com"),
    ("address", "1 Navy Way"),
    ("city", "Arlington"),
    ("postal_code", "22201"),
    ("country", "United States"),
];

/// A running storefront and a browser-like client for it.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// Start a storefront that sends orders to `webhook_url`, if any.
    pub async fn start(webhook_url: Option<&str>) -> Self {
        let mut vars = HashMap::new();
        if let Some(url) = webhook_url {
            vars.insert("ORDER_WEBHOOK_URL".to_string(), url.to_string());
        }
        let config = StorefrontConfig::from_lookup(&|key| vars.get(key).cloned())
            .expect("Failed to build test configuration");
        let state = AppState::new(config).expect("Failed to build application state");
        let app = certificate_order_storefront::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("form POST failed")
    }

    /// Upload a file through the image form.
    pub async fn upload_image(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Response {
        let part = Part::bytes(bytes.to_vec())
            .file_name(name.to_string())
            .mime_str(mime_type)
            .expect("invalid MIME type");
        self.client
            .post(self.url("/order/image"))
            .multipart(Form::new().part("image", part))
            .send()
            .await
            .expect("upload failed")
    }

    /// Walk the wizard up to the review step with `photo.png`, `size`, and
    /// [`DETAILS`].
    pub async fn fill_to_review(&self, size: &str) {
        let resp = self.upload_image("photo.png", "image/png", PNG_BYTES).await;
        assert!(resp.status().is_success(), "upload: {}", resp.status());

        let resp = self.post("/order/next").await;
        assert!(resp.status().is_success(), "next: {}", resp.status());

        let resp = self
            .post_form("/order/size", &[("size", size), ("intent", "next")])
            .await;
        assert!(resp.status().is_success(), "size: {}", resp.status());

        let mut details = DETAILS.to_vec();
        details.push(("intent", "next"));
        let resp = self.post_form("/order/details", &details).await;
        assert!(resp.status().is_success(), "details: {}", resp.status());

        let body = resp.text().await.expect("Failed to read response");
        assert!(body.contains("Step 4 of 4"), "not on review: {body}");
    }
}
