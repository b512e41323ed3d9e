//! Uploaded image, encoded once as a data URL.
//!
//! The same encoded value backs the on-screen preview and the `image.data`
//! field of the submitted order.

use core::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};

/// Errors that can occur when accepting an upload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The file has no content.
    #[error("image file is empty")]
    Empty,
    /// The file is not an image.
    #[error("expected an image file, got {0}")]
    NotAnImage(String),
}

/// An uploaded image with its data URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    name: String,
    size: u64,
    mime_type: String,
    data_url: String,
}

impl ImageUpload {
    /// Encode raw file bytes into an upload.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Empty`] for zero-length files and
    /// [`ImageError::NotAnImage`] if `mime_type` is not `image/*`.
    pub fn encode(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self, ImageError> {
        let mime_type = mime_type.into().trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(mime_type));
        }
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        Ok(Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type,
            data_url,
        })
    }

    /// Original file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// MIME type, lowercased.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// `data:<mime>;base64,<body>` URL.
    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .field("data_url", &format_args!("<{} chars>", self.data_url.len()))
            .finish()
    }
}
