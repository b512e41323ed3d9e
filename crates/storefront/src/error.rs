//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use certificate_order_core::{ImageError, WizardError};
use thiserror::Error;

use crate::services::IntakeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A wizard operation was refused.
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// The uploaded image could not be taken in.
    #[error("Upload error: {0}")]
    Intake(#[from] IntakeError),

    /// The multipart body could not be read.
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Session(_) | Self::Intake(IntakeError::Encode(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Intake(IntakeError::Encode(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Wizard(err) => match err {
                WizardError::Gate(_) | WizardError::Field(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WizardError::UnknownSize(_) => StatusCode::BAD_REQUEST,
                WizardError::NotOnReview
                | WizardError::AlreadySubmitted
                | WizardError::SubmissionInFlight => StatusCode::CONFLICT,
            },
            Self::Intake(IntakeError::Image(ImageError::NotAnImage(_))) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Intake(IntakeError::Image(ImageError::Empty)) => StatusCode::BAD_REQUEST,
            Self::Multipart(err) => err.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request refused");
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Intake(IntakeError::Encode(_)) => {
                "Internal server error".to_string()
            }
            Self::Wizard(err) => err.to_string(),
            Self::Intake(IntakeError::Image(err)) => err.to_string(),
            Self::Multipart(err) => err.body_text(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("wizard", "Selected size", Some(&[("size", "6x6")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
