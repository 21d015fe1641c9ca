//! Storage abstraction layer for persisting issues.
//!
//! This module defines the `IssueStore` trait that abstracts storage operations,
//! allowing different backends (JSON files, in-memory, etc.) to be used
//! interchangeably. Every operation is partitioned by project name.

use crate::domain::Issue;
use anyhow::Result;

pub mod json;
pub mod memory;

// Re-export for convenience
pub use json::JsonFileStorage;
pub use memory::InMemoryStorage;

/// Trait for storage backends that persist issues per project.
///
/// This trait allows the service logic to be decoupled from the specific
/// storage implementation. Implementations must be `Clone` (clones share the
/// same data) and thread-safe so one backend can serve concurrent requests.
///
/// # Examples
///
/// ```no_run
/// use tracker::domain::Issue;
/// use tracker::storage::{IssueStore, JsonFileStorage};
///
/// let storage = JsonFileStorage::new(".tracker");
/// storage.init().unwrap();
///
/// let issue = Issue::new("Fix bug".to_string(), "Details".to_string(), "alice".to_string());
/// storage.save_issue("apitest", &issue).unwrap();
///
/// let loaded = storage.load_issue("apitest", &issue.id).unwrap();
/// assert_eq!(loaded.issue_title, "Fix bug");
/// ```
pub trait IssueStore: Clone + Send + Sync {
    /// Initialize the storage backend (idempotent).
    ///
    /// Creates necessary directories and index files.
    fn init(&self) -> Result<()>;

    /// Save an issue (create or replace by identifier).
    ///
    /// A new identifier is appended to the project's insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be serialized or persisted.
    fn save_issue(&self, project: &str, issue: &Issue) -> Result<()>;

    /// Replace an issue that already exists in the project.
    ///
    /// Never creates a record: an issue deleted since it was loaded stays
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue is not in the project or cannot be
    /// persisted.
    fn replace_issue(&self, project: &str, issue: &Issue) -> Result<()>;

    /// Load an issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist in the project or cannot
    /// be deserialized.
    fn load_issue(&self, project: &str, id: &str) -> Result<Issue>;

    /// Delete an issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist or cannot be deleted.
    fn delete_issue(&self, project: &str, id: &str) -> Result<()>;

    /// List all issues of a project in insertion order.
    ///
    /// An unknown project has no issues.
    fn list_issues(&self, project: &str) -> Result<Vec<Issue>>;

    /// Names of all projects holding at least one issue, sorted.
    fn list_projects(&self) -> Result<Vec<String>>;
}
