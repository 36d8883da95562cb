//! Accumulated result of one delete propagation.

use serde::Serialize;

use vaultsync_core::error::E2eeError;

/// A failure attributed to the item it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    /// What went wrong.
    pub error: E2eeError,
    /// Journal-relative path of the affected item.
    pub path: String,
}

impl ErrorDetail {
    pub fn new(error: E2eeError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }
}

/// Outcome of one logical delete, however many server calls it took.
///
/// The first recorded error is kept and never overwritten; later errors
/// only clear the success flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct DeleteOutcome {
    first_error: Option<ErrorDetail>,
    success: bool,
}

impl Default for DeleteOutcome {
    fn default() -> Self {
        Self {
            first_error: None,
            success: true,
        }
    }
}

impl DeleteOutcome {
    /// A successful outcome with no recorded error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step result into the outcome.
    pub fn merge(self, step: Result<(), ErrorDetail>) -> Self {
        match step {
            Ok(()) => self,
            Err(detail) => Self {
                first_error: self.first_error.or(Some(detail)),
                success: false,
            },
        }
    }

    /// The earliest failure, if any.
    pub fn first_error(&self) -> Option<&ErrorDetail> {
        self.first_error.as_ref()
    }

    /// Whether the whole operation, cleanup included, succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// `Ok(())` on success, the first error otherwise.
    pub fn into_result(self) -> Result<(), ErrorDetail> {
        match self.first_error {
            Some(detail) => Err(detail),
            None => Ok(()),
        }
    }
}
