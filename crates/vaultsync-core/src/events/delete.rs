//! Delete propagation events.

use serde::{Deserialize, Serialize};

use crate::error::E2eeError;
use crate::types::id::JobId;

/// Terminal notification of one delete propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeleteEvent {
    /// The job finished, after its unlock (if any) completed.
    Finished {
        /// The propagation job.
        job_id: JobId,
        /// Journal-relative path of the deleted item.
        path: String,
        /// Whether the whole operation, cleanup included, succeeded.
        success: bool,
        /// The first error encountered, if any.
        error: Option<E2eeError>,
    },
}
