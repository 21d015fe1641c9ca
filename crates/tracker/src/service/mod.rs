//! Issue service: the business logic behind the HTTP API.
//!
//! The `IssueService` validates requests and drives a storage backend.
//! It is organized into submodules by functional area:
//! - `issue`: issue create/filter/update/delete
//! - `project`: project listing

mod issue;
mod project;

use crate::domain::{Issue, IssueFilter, IssueUpdate, NewIssue};
use crate::errors::IssueError;
use crate::storage::IssueStore;
use anyhow::Result;

/// Outcome of a successful update or delete, carrying the affected ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affected {
    pub id: String,
}

/// Validates and executes issue operations.
///
/// Generic over storage backend to support different implementations
/// (JSON files, in-memory, etc.).
pub struct IssueService<S: IssueStore> {
    storage: S,
}

impl<S: IssueStore> IssueService<S> {
    /// Create a new service with the given storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get reference to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Prepare the storage backend for use
    pub fn init(&self) -> Result<()> {
        self.storage.init()?;
        tracing::debug!("Storage initialized");
        Ok(())
    }
}
