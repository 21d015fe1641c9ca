//! Error taxonomy for issue operations.
//!
//! Every client-input failure is an [`IssueError`] variant whose `Display`
//! string is the exact message returned to API clients. Backend failures
//! that are not part of the taxonomy travel as [`IssueError::Storage`].

use thiserror::Error;

/// Errors returned by [`crate::service::IssueService`].
#[derive(Error, Debug)]
pub enum IssueError {
    /// `issue_title`, `issue_text` or `created_by` was absent or blank.
    #[error("required field(s) missing")]
    MissingRequiredFields,

    /// The request did not carry an `_id`.
    #[error("missing _id")]
    MissingId,

    /// An update named an issue but no field to change.
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    /// The issue could not be updated: malformed id, unknown id, or a
    /// backend failure. The causes are deliberately not distinguished.
    #[error("could not update")]
    UpdateFailed { id: String },

    /// The issue could not be deleted: malformed id, unknown id, or a
    /// backend failure.
    #[error("could not delete")]
    DeleteFailed { id: String },

    /// Storage backend failure outside the client-input taxonomy.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl IssueError {
    /// The issue identifier the failed request was addressed to, if any.
    pub fn issue_id(&self) -> Option<&str> {
        match self {
            IssueError::NoUpdateFields { id }
            | IssueError::UpdateFailed { id }
            | IssueError::DeleteFailed { id } => Some(id),
            _ => None,
        }
    }

    /// Whether this error was caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IssueError::Storage(_))
    }
}
