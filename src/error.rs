//! Error handling for the quote engine

pub use crate::config::ConfigError;
pub use crate::pricing::PricingError;
pub use crate::quote::submission::SubmissionError;
pub use crate::storage::StorageError;

use crate::quote::validation::FieldErrors;
use crate::quote::wizard::WizardState;
use crate::quote::WizardStep;

/// Errors returned by wizard operations.
///
/// Catalog misses and storage failures never reach this type: they are
/// resolved with neutral defaults or swallowed with a log entry.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Please correct the highlighted fields: {0}")]
    Validation(FieldErrors),

    #[error("{step} is incomplete: {errors}")]
    StepIncomplete { step: WizardStep, errors: FieldErrors },

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: WizardState,
        action: &'static str,
    },

    #[error("A quote submission is already in progress")]
    SubmissionInFlight,

    #[error("This quote has already been submitted; start a new quote to make changes")]
    Locked,

    #[error("Quote submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl QuoteError {
    /// Per-field messages for validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            QuoteError::Validation(errors) | QuoteError::StepIncomplete { errors, .. } => {
                Some(errors)
            }
            _ => None,
        }
    }

    /// Only submission failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuoteError::Submission(e) if e.is_retryable())
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
