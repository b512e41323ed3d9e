//! Session-related types.
//!
//! The session holds nothing but a pointer to the visitor's draft; the draft
//! itself lives in the [`DraftStore`](crate::services::DraftStore).

/// Session keys for order data.
pub mod keys {
    /// Key for the id of the visitor's in-progress draft.
    pub const DRAFT_ID: &str = "draft_id";
}
