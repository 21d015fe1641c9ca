//! Issue validation rules.
//!
//! Pure checks used by the service before anything reaches storage:
//! required creation fields, identifier format, and whether an update
//! actually carries something to change.

use crate::domain::{IssueUpdate, NewIssue};
use crate::errors::IssueError;
use uuid::Uuid;

/// True when a field is absent or contains only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Check that `issue_title`, `issue_text` and `created_by` are all present.
pub fn validate_new_issue(fields: &NewIssue) -> Result<(), IssueError> {
    let required = [
        fields.issue_title.as_deref(),
        fields.issue_text.as_deref(),
        fields.created_by.as_deref(),
    ];

    if required.iter().any(|field| is_blank(*field)) {
        return Err(IssueError::MissingRequiredFields);
    }
    Ok(())
}

/// Check that an identifier has the format the store assigns: a UUID in
/// lowercase hyphenated form.
///
/// The simple, braced, URN and uppercase spellings are rejected since they
/// can never equal a stored identifier.
pub fn is_valid_issue_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok_and(|uuid| uuid.hyphenated().to_string() == id)
}

/// True when the update sets at least one field besides `_id`.
///
/// Blank strings count as "not sent".
pub fn has_update_fields(update: &IssueUpdate) -> bool {
    let text_fields = [
        &update.issue_title,
        &update.issue_text,
        &update.created_by,
        &update.assigned_to,
        &update.status_text,
    ];

    update.open.is_some() || text_fields.iter().any(|f| !is_blank(f.as_deref()))
}
