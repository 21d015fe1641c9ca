//! Issue create/filter/update/delete

use super::*;
use crate::validation::{has_update_fields, is_blank, is_valid_issue_id, validate_new_issue};

impl<S: IssueStore> IssueService<S> {
    /// Create an issue under `project`.
    ///
    /// `issue_title`, `issue_text` and `created_by` are required; the optional
    /// fields default to the empty string. Returns the stored record.
    pub fn create_issue(&self, project: &str, fields: NewIssue) -> Result<Issue, IssueError> {
        validate_new_issue(&fields)?;

        let NewIssue {
            issue_title,
            issue_text,
            created_by,
            assigned_to,
            status_text,
        } = fields;

        let mut issue = Issue::new(
            issue_title.unwrap_or_default(),
            issue_text.unwrap_or_default(),
            created_by.unwrap_or_default(),
        );
        issue.assigned_to = assigned_to.unwrap_or_default();
        issue.status_text = status_text.unwrap_or_default();

        self.storage.save_issue(project, &issue)?;
        tracing::debug!(project, id = %issue.id, "Issue created");

        Ok(issue)
    }

    /// List the issues of `project` matching every constraint in `filter`,
    /// in insertion order. No match is an empty list, not an error.
    pub fn filter_issues(
        &self,
        project: &str,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>, IssueError> {
        let issues = self.storage.list_issues(project)?;

        if filter.is_empty() {
            return Ok(issues);
        }

        Ok(issues
            .into_iter()
            .filter(|issue| filter.matches(issue))
            .collect())
    }

    /// Apply a partial update to one issue of `project`.
    ///
    /// Blank fields are ignored. A malformed ID, an unknown ID and a storage
    /// failure all report [`IssueError::UpdateFailed`], as does an issue
    /// deleted between being loaded and written back.
    pub fn update_issue(
        &self,
        project: &str,
        update: &IssueUpdate,
    ) -> Result<Affected, IssueError> {
        let id = match update.id.as_deref() {
            Some(id) if !is_blank(Some(id)) => id.to_string(),
            _ => return Err(IssueError::MissingId),
        };

        if !has_update_fields(update) {
            return Err(IssueError::NoUpdateFields { id });
        }

        if !is_valid_issue_id(&id) {
            tracing::debug!(project, id = %id, "Update rejected: malformed ID");
            return Err(IssueError::UpdateFailed { id });
        }

        let mut issue = match self.storage.load_issue(project, &id) {
            Ok(issue) => issue,
            Err(e) => {
                tracing::debug!(project, id = %id, "Update target not loaded: {:#}", e);
                return Err(IssueError::UpdateFailed { id });
            }
        };

        issue.apply_update(update);

        if let Err(e) = self.storage.replace_issue(project, &issue) {
            tracing::warn!(project, id = %id, "Failed to save updated issue: {:#}", e);
            return Err(IssueError::UpdateFailed { id });
        }

        tracing::debug!(project, id = %id, "Issue updated");
        Ok(Affected { id })
    }

    /// Permanently remove one issue of `project`.
    ///
    /// A malformed ID, an unknown ID and a storage failure all report
    /// [`IssueError::DeleteFailed`].
    pub fn delete_issue(
        &self,
        project: &str,
        id: Option<&str>,
    ) -> Result<Affected, IssueError> {
        let id = match id {
            Some(id) if !is_blank(Some(id)) => id.to_string(),
            _ => return Err(IssueError::MissingId),
        };

        if !is_valid_issue_id(&id) {
            tracing::debug!(project, id = %id, "Delete rejected: malformed ID");
            return Err(IssueError::DeleteFailed { id });
        }

        if let Err(e) = self.storage.delete_issue(project, &id) {
            tracing::debug!(project, id = %id, "Delete failed: {:#}", e);
            return Err(IssueError::DeleteFailed { id });
        }

        tracing::debug!(project, id = %id, "Issue deleted");
        Ok(Affected { id })
    }
}
