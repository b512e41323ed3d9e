//! Order wizard state machine.
//!
//! The wizard owns the [`OrderDraft`], the current [`Step`] and the
//! [`SubmissionState`]. Navigation is linear:
//!
//! ```text
//! Upload -> Size -> Details -> Review
//!                                 |
//!                 Idle -> Submitting -> Succeeded | Failed
//! ```
//!
//! Forward moves are gated on the fields each step requires. Operations that
//! need I/O (encoding an upload, calling the endpoint) are split into a
//! `begin_*` and a `complete_*` half so the caller can perform the work
//! without holding the wizard.

use chrono::{DateTime, Utc};

use crate::catalog::{Catalog, SizeCode, UnknownSizeCode};
use crate::country::is_supported_country;
use crate::draft::{Field, OrderDraft};
use crate::image::ImageUpload;
use crate::payload::OrderPayload;
use crate::types::{PhoneError, Step, SubmissionState};

/// The gate for a step does not hold.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("an image must be uploaded first")]
    MissingImage,
    #[error("a print size must be selected")]
    MissingSize,
    #[error("required fields are empty: {0:?}")]
    MissingFields(Vec<Field>),
}

/// A details field update was refused; the previous value is kept.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error(transparent)]
    Phone(#[from] PhoneError),
    #[error("we do not ship to {0:?}")]
    UnsupportedCountry(String),
}

/// Errors returned by wizard operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    UnknownSize(#[from] UnknownSizeCode),
    #[error("orders can only be submitted from the review step")]
    NotOnReview,
    #[error("this order has already been sent")]
    AlreadySubmitted,
    #[error("cannot leave the review step while the order is being sent")]
    SubmissionInFlight,
}

/// Identifies one image intake; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IntakeTicket(u64);

/// A single customer's pass through the order form.
#[derive(Debug, Clone, Default)]
pub struct OrderWizard {
    draft: OrderDraft,
    step: Step,
    submission: SubmissionState,
    latest_intake: u64,
}

impl OrderWizard {
    /// Start with an empty draft on the upload step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Check the gate predicate of `step` against the current draft.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement of `step`. For the review step the
    /// requirements of all earlier steps are checked.
    pub fn check_gate(&self, step: Step) -> Result<(), GateError> {
        match step {
            Step::Upload => {
                if self.draft.image.is_none() {
                    return Err(GateError::MissingImage);
                }
            }
            Step::Size => {
                if self.draft.size.is_none() {
                    return Err(GateError::MissingSize);
                }
            }
            Step::Details => {
                let missing = self.draft.missing_details();
                if !missing.is_empty() {
                    return Err(GateError::MissingFields(missing));
                }
            }
            Step::Review => {
                self.check_gate(Step::Upload)?;
                self.check_gate(Step::Size)?;
                self.check_gate(Step::Details)?;
            }
        }
        Ok(())
    }

    /// Required details fields that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        self.draft.missing_details()
    }

    /// Whether the current step's gate holds.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.check_gate(self.step).is_ok()
    }

    /// Move forward one step.
    ///
    /// On the review step this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the gate error and leaves the wizard unchanged if the current
    /// step is incomplete.
    pub fn advance(&mut self) -> Result<Step, GateError> {
        let Some(next) = self.step.next() else {
            return Ok(self.step);
        };
        self.check_gate(self.step)?;
        self.step = next;
        Ok(next)
    }

    /// Move back one step, keeping everything entered so far.
    ///
    /// Leaving the review step clears a failed outcome.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::SubmissionInFlight`] while submitting.
    pub fn retreat(&mut self) -> Result<Step, WizardError> {
        if self.submission.is_submitting() {
            return Err(WizardError::SubmissionInFlight);
        }
        if let Some(previous) = self.step.previous() {
            if self.step == Step::Review && self.submission.is_failed() {
                self.submission = SubmissionState::Idle;
            }
            self.step = previous;
        }
        Ok(self.step)
    }

    // =========================================================================
    // Draft edits
    // =========================================================================

    /// Reserve a ticket for an image that is about to be encoded.
    pub const fn begin_image_intake(&mut self) -> IntakeTicket {
        self.latest_intake += 1;
        IntakeTicket(self.latest_intake)
    }

    /// Store an encoded image if `ticket` is still the newest one.
    ///
    /// Returns `false` when a later intake has started since; the stale
    /// result is dropped.
    pub fn complete_image_intake(&mut self, ticket: IntakeTicket, image: ImageUpload) -> bool {
        if ticket.0 != self.latest_intake {
            return false;
        }
        self.draft.image = Some(image);
        true
    }

    /// Choose a print size.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownSize`] if `code` is not a catalog code;
    /// the previous selection is kept.
    pub fn select_size(&mut self, code: &str) -> Result<SizeCode, WizardError> {
        let size = code.parse::<SizeCode>()?;
        self.draft.size = Some(size);
        Ok(size)
    }

    /// Write one details field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] for a phone value with disallowed characters or
    /// a country outside the shipping list; the previous value is kept.
    pub fn update_field(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        let draft = &mut self.draft;
        match field {
            Field::FirstName => value.clone_into(&mut draft.personal.first_name),
            Field::LastName => value.clone_into(&mut draft.personal.last_name),
            Field::Email => value.clone_into(&mut draft.personal.email),
            Field::Phone => draft.personal.phone.replace(value)?,
            Field::Notes => value.clone_into(&mut draft.notes),
            Field::Address => value.clone_into(&mut draft.shipping.address),
            Field::City => value.clone_into(&mut draft.shipping.city),
            Field::PostalCode => value.clone_into(&mut draft.shipping.postal_code),
            Field::Country => {
                if !value.is_empty() && !is_supported_country(value) {
                    return Err(FieldError::UnsupportedCountry(value.to_string()));
                }
                value.clone_into(&mut draft.shipping.country);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Start a submission attempt.
    ///
    /// Returns `Ok(None)` without any change while a previous attempt is still
    /// outstanding. Otherwise moves to [`SubmissionState::Submitting`] and
    /// returns the payload to send.
    ///
    /// # Errors
    ///
    /// - [`WizardError::NotOnReview`] outside the review step
    /// - [`WizardError::AlreadySubmitted`] after a successful attempt
    /// - [`WizardError::Gate`] if a step 1-3 requirement no longer holds
    pub fn begin_submission(
        &mut self,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Result<Option<OrderPayload>, WizardError> {
        match self.submission {
            SubmissionState::Submitting => return Ok(None),
            SubmissionState::Succeeded => return Err(WizardError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }
        if self.step != Step::Review {
            return Err(WizardError::NotOnReview);
        }
        self.check_gate(Step::Review)?;

        self.submission = SubmissionState::Submitting;
        Ok(Some(OrderPayload::build(&self.draft, catalog, now)))
    }

    /// Record the outcome of the attempt started by [`Self::begin_submission`].
    ///
    /// Ignored unless a submission is in flight.
    pub fn complete_submission(&mut self, outcome: Result<(), String>) {
        if !self.submission.is_submitting() {
            return;
        }
        self.submission = match outcome {
            Ok(()) => SubmissionState::Succeeded,
            Err(reason) => SubmissionState::Failed { reason },
        };
    }
}
