//! Project-Scoped Issue Tracker Library
//!
//! This library provides the core of the issue tracker: the issue record,
//! its validation rules, the storage backends, and the service that the
//! HTTP layer calls into.

pub mod config;
pub mod domain;
pub mod errors;
pub mod service;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use domain::{Issue, IssueFilter, IssueUpdate, NewIssue};
pub use errors::IssueError;
pub use service::IssueService;
pub use storage::{InMemoryStorage, IssueStore, JsonFileStorage};
