//! Resolution results that always carry a value.

use open_feature::provider::ResolutionDetails;
use open_feature::{EvaluationError, EvaluationReason, EvaluationResult};

/// Outcome of a flag evaluation with the caller's default already applied.
///
/// `details` is the wrapped provider's result when evaluation succeeded. When
/// it failed, `details.value` is the caller-supplied default, the reason is
/// [`EvaluationReason::Error`] and `error` says what went wrong.
#[derive(Debug)]
pub struct Resolution<T> {
    pub details: ResolutionDetails<T>,
    pub error: Option<EvaluationError>,
}

impl<T> Resolution<T> {
    pub(crate) fn from_result(result: EvaluationResult<ResolutionDetails<T>>, default: T) -> Self {
        match result {
            Ok(details) => Self {
                details,
                error: None,
            },
            Err(error) => Self {
                details: ResolutionDetails {
                    value: default,
                    variant: None,
                    reason: Some(EvaluationReason::Error),
                    flag_metadata: None,
                },
                error: Some(error),
            },
        }
    }

    /// The resolved (or default) value.
    pub fn value(&self) -> &T {
        &self.details.value
    }

    /// Consume the resolution and return its value.
    pub fn into_value(self) -> T {
        self.details.value
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
