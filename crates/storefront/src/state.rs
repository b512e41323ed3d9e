//! Application state shared across handlers.

use std::sync::Arc;

use certificate_order_core::Catalog;

use crate::config::StorefrontConfig;
use crate::services::{DraftStore, WebhookClient, WebhookError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, the order endpoint client and the in-progress drafts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    webhook: WebhookClient,
    drafts: DraftStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, WebhookError> {
        let catalog = Catalog::new(config.product_ids);
        let webhook = WebhookClient::new(&config.webhook)?;
        let drafts = DraftStore::new(config.draft_idle_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                webhook,
                drafts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the size catalog built from the configured product ids.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the order endpoint client.
    #[must_use]
    pub fn webhook(&self) -> &WebhookClient {
        &self.inner.webhook
    }

    /// Get the in-progress drafts.
    #[must_use]
    pub fn drafts(&self) -> &DraftStore {
        &self.inner.drafts
    }
}
