//! Business services for the order flow.
//!
//! These sit between the route handlers and the core wizard: they hold the
//! lock on a draft only for as long as a state transition takes and do the
//! slow work (encoding, the outbound call) in between.

pub mod drafts;
pub mod intake;
pub mod submission;
pub mod webhook;

pub use drafts::{DraftStore, SharedWizard};
pub use intake::{IntakeError, RawUpload, intake_image};
pub use submission::submit_order;
pub use webhook::{WebhookClient, WebhookError};
