//! Wizard position and submission status enums.

use serde::{Deserialize, Serialize};

/// A screen of the order wizard, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Upload,
    Size,
    Details,
    Review,
}

impl Step {
    /// Every step, first to last.
    pub const ALL: [Self; 4] = [Self::Upload, Self::Size, Self::Details, Self::Review];

    /// One-based position of the step (1..=4).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Upload => 1,
            Self::Size => 2,
            Self::Details => 3,
            Self::Review => 4,
        }
    }

    /// Short label used in the progress bar.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Size => "Size",
            Self::Details => "Details & Shipping",
            Self::Review => "Review",
        }
    }

    /// One-line description shown under the screen heading.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Upload => "Choose the image you want to transform into a certificate",
            Self::Size => "Select the print size for your certificate",
            Self::Details => "Tell us who you are and where to ship",
            Self::Review => "Check everything before sending your order",
        }
    }

    /// The following step, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Upload => Some(Self::Size),
            Self::Size => Some(Self::Details),
            Self::Details => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The preceding step, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Upload => None,
            Self::Size => Some(Self::Upload),
            Self::Details => Some(Self::Size),
            Self::Review => Some(Self::Details),
        }
    }
}

/// Outcome of the outbound order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// `reason` is developer-facing; customers only see a generic notice.
    Failed { reason: String },
}

impl SubmissionState {
    /// Returns `true` while an outbound call is outstanding.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Returns `true` once the endpoint accepted the order.
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns `true` if the last attempt failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_sequential() {
        let numbers: Vec<u8> = Step::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_step_next_and_previous_are_inverse() {
        for step in Step::ALL {
            if let Some(next) = step.next() {
                assert_eq!(next.previous(), Some(step));
            }
        }
        assert_eq!(Step::Upload.previous(), None);
        assert_eq!(Step::Review.next(), None);
    }

    #[test]
    fn test_submission_state_predicates() {
        assert!(SubmissionState::Submitting.is_submitting());
        assert!(SubmissionState::Succeeded.is_succeeded());
        assert!(
            SubmissionState::Failed {
                reason: "boom".to_string()
            }
            .is_failed()
        );
        assert!(!SubmissionState::Idle.is_submitting());
    }
}
