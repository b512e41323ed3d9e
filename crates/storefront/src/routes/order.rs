//! Order wizard route handlers.
//!
//! Each visitor's session points at one draft. Successful POSTs redirect back
//! to `GET /order`, which renders whichever step the wizard is on; refused
//! input re-renders the step directly with the reason.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use certificate_order_core::{
    Field, FieldError, GateError, ImageError, OrderWizard, Step, SubmissionState,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use super::views::{
    DetailsView, PreviewView, ProgressView, SizeOptionView, SummaryView, format_file_size,
    size_options,
};
use crate::error::{Result, add_breadcrumb};
use crate::models::session_keys;
use crate::services::{IntakeError, RawUpload, SharedWizard, intake_image, submit_order};
use crate::state::AppState;

/// Path of the wizard page.
pub const ORDER_PATH: &str = "/order";

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Shown on the review step after a failed attempt.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Error sending order. Please try again.";

/// Shown on the review step while the order is on its way.
pub const SUBMITTING_MESSAGE: &str = "Sending your order...";

// =============================================================================
// Templates
// =============================================================================

/// Step 1: image upload.
#[derive(Template, WebTemplate)]
#[template(path = "order/upload.html")]
pub struct UploadTemplate {
    pub progress: ProgressView,
    pub preview: Option<PreviewView>,
    pub max_upload: String,
    pub errors: Vec<String>,
}

/// Step 2: size selection.
#[derive(Template, WebTemplate)]
#[template(path = "order/size.html")]
pub struct SizeTemplate {
    pub progress: ProgressView,
    pub options: Vec<SizeOptionView>,
    pub errors: Vec<String>,
}

/// Step 3: personal and shipping details.
#[derive(Template, WebTemplate)]
#[template(path = "order/details.html")]
pub struct DetailsTemplate {
    pub progress: ProgressView,
    pub form: DetailsView,
    pub errors: Vec<String>,
}

/// Step 4: review and submit.
#[derive(Template, WebTemplate)]
#[template(path = "order/review.html")]
pub struct ReviewTemplate {
    pub progress: ProgressView,
    pub summary: SummaryView,
    pub submitting: bool,
    pub submitting_message: &'static str,
    pub errors: Vec<String>,
}

/// Shown once the endpoint accepted the order.
#[derive(Template, WebTemplate)]
#[template(path = "order/confirmation.html")]
pub struct ConfirmationTemplate {
    pub summary: SummaryView,
}

// =============================================================================
// Forms
// =============================================================================

/// Which button submitted a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Store the input and stay on the step.
    #[default]
    Save,
    /// Store the input and move on.
    Next,
}

/// Size selection form data.
#[derive(Debug, Deserialize)]
pub struct SizeForm {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub intent: Intent,
}

/// Details form data. Absent inputs count as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailsForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub intent: Intent,
}

impl DetailsForm {
    fn values(&self) -> [(Field, &str); 9] {
        [
            (Field::FirstName, &self.first_name),
            (Field::LastName, &self.last_name),
            (Field::Email, &self.email),
            (Field::Phone, &self.phone),
            (Field::Notes, &self.notes),
            (Field::Address, &self.address),
            (Field::City, &self.city),
            (Field::PostalCode, &self.postal_code),
            (Field::Country, &self.country),
        ]
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's draft and its id.
struct Draft {
    id: Uuid,
    wizard: SharedWizard,
}

/// Find the visitor's draft, starting a new one if there is none, it expired,
/// or it was already sent.
async fn load_draft(state: &AppState, session: &Session) -> Result<Draft> {
    if let Some(id) = session.get::<Uuid>(session_keys::DRAFT_ID).await? {
        if let Some(wizard) = state.drafts().get(&id).await {
            // Sent by a request whose response never reached the browser.
            let sent = wizard.lock().await.submission().is_succeeded();
            if !sent {
                return Ok(Draft { id, wizard });
            }
            state.drafts().discard(&id).await;
            tracing::debug!(draft_id = %id, "draft already sent, starting a new one");
        } else {
            tracing::debug!(draft_id = %id, "draft expired, starting a new one");
        }
    }

    let (id, wizard) = state.drafts().create().await;
    session.insert(session_keys::DRAFT_ID, id).await?;
    Ok(Draft { id, wizard })
}

// =============================================================================
// Rendering
// =============================================================================

fn redirect_to_order() -> Response {
    Redirect::to(ORDER_PATH).into_response()
}

/// Render the wizard's current step with optional error messages.
fn render_step(
    state: &AppState,
    wizard: &OrderWizard,
    mut errors: Vec<String>,
    missing: &[Field],
) -> Response {
    let progress = ProgressView::from(wizard.step());
    let draft = wizard.draft();

    match wizard.step() {
        Step::Upload => UploadTemplate {
            progress,
            preview: PreviewView::from_draft(draft),
            max_upload: format_file_size(
                u64::try_from(state.config().max_upload_bytes).unwrap_or(u64::MAX),
            ),
            errors,
        }
        .into_response(),
        Step::Size => SizeTemplate {
            progress,
            options: size_options(state.catalog(), draft.size),
            errors,
        }
        .into_response(),
        Step::Details => DetailsTemplate {
            progress,
            form: DetailsView::new(draft, missing),
            errors,
        }
        .into_response(),
        Step::Review => {
            let submission = wizard.submission();
            if submission.is_failed() {
                errors.push(SUBMISSION_FAILED_MESSAGE.to_string());
            }
            ReviewTemplate {
                progress,
                summary: SummaryView::new(draft, state.catalog()),
                submitting: submission.is_submitting(),
                submitting_message: SUBMITTING_MESSAGE,
                errors,
            }
            .into_response()
        }
    }
}

fn refused(state: &AppState, wizard: &OrderWizard, status: StatusCode, error: String) -> Response {
    (status, render_step(state, wizard, vec![error], &[])).into_response()
}

fn gate_message(error: &GateError) -> String {
    match error {
        GateError::MissingImage => "Please upload an image to continue.",
        GateError::MissingSize => "Please choose a print size to continue.",
        GateError::MissingFields(_) => "Please fill in all required fields.",
    }
    .to_string()
}

fn field_message(field: Field, error: &FieldError) -> String {
    match error {
        FieldError::Phone(_) => format!(
            "{} may only contain digits, spaces, parentheses, hyphens and plus signs.",
            field.label()
        ),
        FieldError::UnsupportedCountry(_) => "Please choose a country from the list.".to_string(),
    }
}

/// Advance the wizard, or re-render the step with what is missing.
fn advance_or_render(state: &AppState, wizard: &mut OrderWizard) -> Response {
    match wizard.advance() {
        Ok(step) => {
            tracing::debug!(step = step.number(), "wizard advanced");
            add_breadcrumb("wizard", "Advanced", Some(&[("step", step.title())]));
            redirect_to_order()
        }
        Err(err) => {
            let missing = match &err {
                GateError::MissingFields(fields) => fields.clone(),
                GateError::MissingImage | GateError::MissingSize => Vec::new(),
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_step(state, wizard, vec![gate_message(&err)], &missing),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Send visitors straight to the wizard.
///
/// GET /
pub async fn index() -> Redirect {
    Redirect::to(ORDER_PATH)
}

/// Render the current step.
///
/// GET /order
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let wizard = draft.wizard.lock().await;
    Ok(render_step(&state, &wizard, Vec::new(), &[]))
}

/// Read the image field from the upload form, if a file was chosen.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<RawUpload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        if name.is_empty() {
            return Ok(None);
        }
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(RawUpload {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Attach an image to the draft.
///
/// POST /order/image
#[instrument(skip(state, session, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;

    let Some(upload) = read_image_field(&mut multipart).await? else {
        let wizard = draft.wizard.lock().await;
        return Ok(refused(
            &state,
            &wizard,
            StatusCode::BAD_REQUEST,
            "Please choose an image file.".to_string(),
        ));
    };

    match intake_image(&draft.wizard, upload).await {
        Ok(_) => {
            add_breadcrumb("wizard", "Image uploaded", None);
            Ok(redirect_to_order())
        }
        Err(IntakeError::Image(err)) => {
            let status = match err {
                ImageError::Empty => StatusCode::BAD_REQUEST,
                ImageError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            };
            let wizard = draft.wizard.lock().await;
            Ok(refused(&state, &wizard, status, format!("Upload failed: {err}.")))
        }
        Err(err) => Err(err.into()),
    }
}

/// Choose a print size, optionally moving on.
///
/// POST /order/size
#[instrument(skip(state, session))]
pub async fn select_size(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SizeForm>,
) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let mut wizard = draft.wizard.lock().await;

    let Some(code) = form.size.filter(|code| !code.is_empty()) else {
        return Ok(refused(
            &state,
            &wizard,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Please choose a print size.".to_string(),
        ));
    };

    let size = wizard.select_size(&code)?;
    add_breadcrumb("wizard", "Selected size", Some(&[("size", size.as_str())]));

    if form.intent == Intent::Next {
        return Ok(advance_or_render(&state, &mut wizard));
    }
    Ok(redirect_to_order())
}

/// Store the details form, optionally moving on.
///
/// POST /order/details
///
/// Every field is applied independently; a refused field keeps its previous
/// value and is reported back.
#[instrument(skip(state, session, form), fields(intent = ?form.intent))]
pub async fn save_details(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DetailsForm>,
) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let mut wizard = draft.wizard.lock().await;

    let errors: Vec<String> = form
        .values()
        .into_iter()
        .filter_map(|(field, value)| {
            wizard
                .update_field(field, value)
                .err()
                .map(|err| field_message(field, &err))
        })
        .collect();

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "details refused");
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            render_step(&state, &wizard, errors, &[]),
        )
            .into_response());
    }

    if form.intent == Intent::Next {
        return Ok(advance_or_render(&state, &mut wizard));
    }
    Ok(redirect_to_order())
}

/// Move to the next step.
///
/// POST /order/next
#[instrument(skip(state, session))]
pub async fn next(State(state): State<AppState>, session: Session) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let mut wizard = draft.wizard.lock().await;
    Ok(advance_or_render(&state, &mut wizard))
}

/// Move to the previous step.
///
/// POST /order/back
#[instrument(skip(state, session))]
pub async fn back(State(state): State<AppState>, session: Session) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let step = draft.wizard.lock().await.retreat()?;
    tracing::debug!(step = step.number(), "wizard went back");
    Ok(redirect_to_order())
}

/// Send the order.
///
/// POST /order/submit
///
/// On success the draft is discarded and the confirmation page shown; the
/// next visit to `/order` starts over. A failed attempt renders the review
/// step again with the draft intact.
#[instrument(skip(state, session))]
pub async fn submit(State(state): State<AppState>, session: Session) -> Result<Response> {
    let draft = load_draft(&state, &session).await?;
    let outcome = submit_order(&draft.wizard, state.catalog(), state.webhook()).await?;

    match outcome {
        SubmissionState::Succeeded => {
            let summary = SummaryView::new(draft.wizard.lock().await.draft(), state.catalog());
            state.drafts().discard(&draft.id).await;
            session.remove_value(session_keys::DRAFT_ID).await?;
            add_breadcrumb("wizard", "Order submitted", None);
            Ok(ConfirmationTemplate { summary }.into_response())
        }
        SubmissionState::Submitting => {
            let wizard = draft.wizard.lock().await;
            Ok((
                StatusCode::ACCEPTED,
                render_step(&state, &wizard, Vec::new(), &[]),
            )
                .into_response())
        }
        SubmissionState::Failed { .. } => {
            let wizard = draft.wizard.lock().await;
            Ok((
                StatusCode::BAD_GATEWAY,
                render_step(&state, &wizard, Vec::new(), &[]),
            )
                .into_response())
        }
        SubmissionState::Idle => {
            let wizard = draft.wizard.lock().await;
            Ok(render_step(&state, &wizard, Vec::new(), &[]))
        }
    }
}
