//! In-memory storage for in-progress orders.
//!
//! Each browser session holds a draft id; the wizard itself lives here and
//! is never written to disk. Drafts idle for longer than the configured
//! timeout are evicted.

use std::sync::Arc;
use std::time::Duration;

use certificate_order_core::OrderWizard;
use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Upper bound on concurrently held drafts.
const MAX_DRAFTS: u64 = 10_000;

/// A wizard shared between the requests of one session.
pub type SharedWizard = Arc<Mutex<OrderWizard>>;

/// Draft id to wizard map with idle expiry.
#[derive(Clone)]
pub struct DraftStore {
    drafts: Cache<Uuid, SharedWizard>,
}

impl DraftStore {
    /// Create a store whose entries expire after `idle_timeout` without access.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        let drafts = Cache::builder()
            .max_capacity(MAX_DRAFTS)
            .time_to_idle(idle_timeout)
            .build();
        Self { drafts }
    }

    /// Look up a draft.
    pub async fn get(&self, id: &Uuid) -> Option<SharedWizard> {
        self.drafts.get(id).await
    }

    /// Start a new, empty draft and return its id.
    pub async fn create(&self) -> (Uuid, SharedWizard) {
        let id = Uuid::new_v4();
        let wizard = Arc::new(Mutex::new(OrderWizard::new()));
        self.drafts.insert(id, Arc::clone(&wizard)).await;
        tracing::debug!(draft_id = %id, "draft created");
        (id, wizard)
    }

    /// Drop a draft once the flow has ended.
    pub async fn discard(&self, id: &Uuid) {
        self.drafts.invalidate(id).await;
        tracing::debug!(draft_id = %id, "draft discarded");
    }
}
