//! Task status values and validation helpers.
//!
//! Statuses are stored as their display strings (`"Not started"`, ...) so the
//! database `CHECK` constraint and the wire format share one spelling.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_NOT_STARTED: &str = "Not started";
pub const STATUS_IN_PROGRESS: &str = "In progress";
pub const STATUS_ON_HOLD: &str = "On hold";
pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// All valid task status strings. Matching is case-sensitive.
pub const VALID_TASK_STATUSES: &[&str] = &[
    STATUS_NOT_STARTED,
    STATUS_IN_PROGRESS,
    STATUS_ON_HOLD,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

// ---------------------------------------------------------------------------
// Status enum
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "On hold")]
    OnHold,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Return the stored string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::OnHold => STATUS_ON_HOLD,
            Self::Completed => STATUS_COMPLETED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Parse a status string. Rejects anything not spelled exactly as in
    /// [`VALID_TASK_STATUSES`].
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_NOT_STARTED => Ok(Self::NotStarted),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_ON_HOLD => Ok(Self::OnHold),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid task status '{s}'. Must be one of: {}",
                VALID_TASK_STATUSES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a status string is one of the accepted values.
pub fn validate_task_status(status: &str) -> Result<(), CoreError> {
    TaskStatus::parse(status).map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
