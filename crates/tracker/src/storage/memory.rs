//! In-memory storage implementation.
//!
//! This backend keeps every project's issues in RAM. It backs the test suites
//! and the server's `--storage memory` mode. Each instance is isolated, making
//! it ideal for parallel test execution.

use crate::domain::Issue;
use crate::storage::IssueStore;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Projects = HashMap<String, Vec<Issue>>;

/// In-memory storage backend.
///
/// All data is stored in memory and lost when the last clone is dropped.
/// Uses `Arc<RwLock<>>` for shared interior mutability - clones share the same
/// data and can be handed to concurrent request handlers. Issues are kept in a
/// `Vec` per project so listing preserves insertion order.
///
/// # Examples
///
/// ```
/// use tracker::storage::{InMemoryStorage, IssueStore};
/// use tracker::domain::Issue;
///
/// let storage = InMemoryStorage::new();
/// storage.init().unwrap();
///
/// let issue = Issue::new("Test".to_string(), "Description".to_string(), "me".to_string());
/// storage.save_issue("apitest", &issue).unwrap();
///
/// let loaded = storage.load_issue("apitest", &issue.id).unwrap();
/// assert_eq!(loaded.issue_title, "Test");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    projects: Arc<RwLock<Projects>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Projects>> {
        self.projects
            .read()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Projects>> {
        self.projects
            .write()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }
}

impl IssueStore for InMemoryStorage {
    fn init(&self) -> Result<()> {
        // No initialization needed for in-memory storage
        Ok(())
    }

    fn save_issue(&self, project: &str, issue: &Issue) -> Result<()> {
        let mut projects = self.write()?;
        let issues = projects.entry(project.to_string()).or_default();

        match issues.iter_mut().find(|existing| existing.id == issue.id) {
            Some(existing) => *existing = issue.clone(),
            None => issues.push(issue.clone()),
        }
        Ok(())
    }

    fn replace_issue(&self, project: &str, issue: &Issue) -> Result<()> {
        let mut projects = self.write()?;
        let existing = projects
            .get_mut(project)
            .and_then(|issues| issues.iter_mut().find(|i| i.id == issue.id))
            .ok_or_else(|| anyhow!("Issue not found: {}", issue.id))?;

        *existing = issue.clone();
        Ok(())
    }

    fn load_issue(&self, project: &str, id: &str) -> Result<Issue> {
        self.read()?
            .get(project)
            .and_then(|issues| issues.iter().find(|i| i.id == id))
            .cloned()
            .ok_or_else(|| anyhow!("Issue not found: {}", id))
    }

    fn delete_issue(&self, project: &str, id: &str) -> Result<()> {
        let mut projects = self.write()?;
        let issues = projects
            .get_mut(project)
            .ok_or_else(|| anyhow!("Issue not found: {}", id))?;
        let position = issues
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| anyhow!("Issue not found: {}", id))?;

        issues.remove(position);
        if issues.is_empty() {
            projects.remove(project);
        }
        Ok(())
    }

    fn list_issues(&self, project: &str) -> Result<Vec<Issue>> {
        Ok(self.read()?.get(project).cloned().unwrap_or_default())
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(title: &str) -> Issue {
        Issue::new(title.to_string(), "Test".to_string(), "tester".to_string())
    }

    #[test]
    fn test_init_is_noop() {
        let storage = InMemoryStorage::new();
        storage.init().unwrap();
        storage.init().unwrap(); // Should be idempotent
    }

    #[test]
    fn test_save_updates_existing_issue() {
        let storage = InMemoryStorage::new();

        let mut issue = issue("Original");
        storage.save_issue("apitest", &issue).unwrap();

        issue.issue_title = "Updated".to_string();
        storage.save_issue("apitest", &issue).unwrap();

        let loaded = storage.load_issue("apitest", &issue.id).unwrap();
        assert_eq!(loaded.issue_title, "Updated");

        // Should only have one issue
        assert_eq!(storage.list_issues("apitest").unwrap().len(), 1);
    }

    #[test]
    fn test_load_nonexistent_issue_fails() {
        let storage = InMemoryStorage::new();

        let result = storage.load_issue("apitest", "nonexistent");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_delete_last_issue_forgets_project() {
        let storage = InMemoryStorage::new();

        let issue = issue("Only one");
        storage.save_issue("apitest", &issue).unwrap();
        assert_eq!(storage.list_projects().unwrap(), vec!["apitest"]);

        storage.delete_issue("apitest", &issue.id).unwrap();
        assert!(storage.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_clone_shares_storage() {
        let storage1 = InMemoryStorage::new();

        let issue1 = issue("Issue 1");
        storage1.save_issue("apitest", &issue1).unwrap();

        // Clone shares the same underlying storage
        let storage2 = storage1.clone();
        let loaded = storage2.load_issue("apitest", &issue1.id).unwrap();
        assert_eq!(loaded.issue_title, "Issue 1");

        let issue2 = issue("Issue 2");
        storage2.save_issue("apitest", &issue2).unwrap();

        assert_eq!(storage1.list_issues("apitest").unwrap().len(), 2);
        assert_eq!(storage2.list_issues("apitest").unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_saves_are_all_kept() {
        let storage = InMemoryStorage::new();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    storage
                        .save_issue("apitest", &issue(&format!("Issue {}", n)))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(storage.list_issues("apitest").unwrap().len(), 8);
    }
}
