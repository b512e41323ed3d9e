//! Image intake: encode an upload and attach it to the draft.

use certificate_order_core::{ImageError, ImageUpload, OrderWizard};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur while taking in an image.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("image encoding task failed: {0}")]
    Encode(#[from] tokio::task::JoinError),
}

/// A file as received from the upload form.
#[derive(Debug)]
pub struct RawUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encode `upload` and store it in the draft.
///
/// The wizard is locked only to reserve a ticket and to store the result;
/// encoding runs on the blocking pool. Returns `Ok(false)` when a newer
/// upload for the same draft started in the meantime, in which case this
/// one is dropped.
///
/// # Errors
///
/// Returns [`IntakeError::Image`] for empty or non-image files.
pub async fn intake_image(
    wizard: &Mutex<OrderWizard>,
    upload: RawUpload,
) -> Result<bool, IntakeError> {
    let ticket = wizard.lock().await.begin_image_intake();

    let RawUpload {
        name,
        mime_type,
        bytes,
    } = upload;
    let image =
        tokio::task::spawn_blocking(move || ImageUpload::encode(name, mime_type, &bytes)).await??;

    let (name, size) = (image.name().to_string(), image.size());
    let stored = wizard.lock().await.complete_image_intake(ticket, image);
    if stored {
        tracing::info!(file = %name, bytes = size, "image attached to draft");
    } else {
        tracing::debug!(file = %name, "newer upload in progress, dropping image");
    }
    Ok(stored)
}
