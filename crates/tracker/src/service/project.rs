//! Project listing

use super::*;

impl<S: IssueStore> IssueService<S> {
    /// Names of all projects that currently hold issues, sorted.
    pub fn list_projects(&self) -> Result<Vec<String>, IssueError> {
        Ok(self.storage.list_projects()?)
    }
}
