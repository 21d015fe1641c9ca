//! JSON file-based storage implementation.
//!
//! All data is stored as JSON files under `data/projects/` with atomic writes.
//! Each project gets its own directory holding an `index.json` (insertion
//! order of its issues) and one `issues/<id>.json` file per issue.

use crate::domain::Issue;
use crate::storage::IssueStore;
use crate::validation::is_valid_issue_id;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const PROJECTS_DIR: &str = "data/projects";
const INDEX_FILE: &str = "index.json";
const ISSUES_DIR: &str = "issues";

/// Index of all issues in one project
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Index {
    /// Schema version for future migrations
    schema_version: u32,
    /// Project name as supplied by clients (the directory name is escaped)
    name: String,
    /// Issue IDs in insertion order
    all_ids: Vec<String>,
}

impl Index {
    fn new(name: &str) -> Self {
        Self {
            schema_version: 1,
            name: name.to_string(),
            all_ids: Vec::new(),
        }
    }
}

/// Map a free-form project name to a single safe directory name.
///
/// Every byte outside `[A-Za-z0-9_-]` is written as `%XX`, so names such as
/// `..` or `a/b` can never leave the projects directory.
fn project_dir_name(project: &str) -> String {
    if project.is_empty() {
        return "%".to_string();
    }

    let mut name = String::with_capacity(project.len());
    for byte in project.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{:02X}", byte));
        }
    }
    name
}

/// JSON file-based storage for project-scoped issues.
///
/// All file writes are atomic (write to temp file, then rename). Index
/// updates are serialized by an in-process mutex shared between clones.
#[derive(Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
    index_lock: Arc<Mutex<()>>,
}

impl JsonFileStorage {
    /// Create a new JSON file storage instance at the given root path
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            index_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Root directory of this storage
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, project: &str) -> PathBuf {
        self.root
            .join(PROJECTS_DIR)
            .join(project_dir_name(project))
    }

    fn issue_path(&self, project: &str, id: &str) -> Result<PathBuf> {
        if !is_valid_issue_id(id) {
            bail!("Invalid issue ID: {}", id);
        }
        Ok(self
            .project_dir(project)
            .join(ISSUES_DIR)
            .join(format!("{}.json", id)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.index_lock
            .lock()
            .map_err(|_| anyhow!("Storage index lock poisoned"))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write temporary file")?;
        fs::rename(&temp_path, path).context("Failed to rename temporary file")?;

        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<T> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to deserialize data")
    }

    fn load_index(&self, project: &str) -> Result<Index> {
        let index_path = self.project_dir(project).join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(Index::new(project));
        }
        self.read_json(&index_path)
    }

    fn save_index(&self, project: &str, index: &Index) -> Result<()> {
        let index_path = self.project_dir(project).join(INDEX_FILE);
        self.write_json(&index_path, index)
    }
}

impl IssueStore for JsonFileStorage {
    fn init(&self) -> Result<()> {
        let projects_dir = self.root.join(PROJECTS_DIR);
        fs::create_dir_all(&projects_dir).context("Failed to create projects directory")?;
        Ok(())
    }

    fn save_issue(&self, project: &str, issue: &Issue) -> Result<()> {
        let issue_path = self.issue_path(project, &issue.id)?;
        let _guard = self.lock()?;

        let issues_dir = self.project_dir(project).join(ISSUES_DIR);
        fs::create_dir_all(&issues_dir).context("Failed to create issues directory")?;
        self.write_json(&issue_path, issue)?;

        // Update index
        let mut index = self.load_index(project)?;
        if !index.all_ids.contains(&issue.id) {
            index.all_ids.push(issue.id.clone());
            self.save_index(project, &index)?;
        }

        Ok(())
    }

    fn replace_issue(&self, project: &str, issue: &Issue) -> Result<()> {
        let issue_path = self.issue_path(project, &issue.id)?;
        // Existence check and write share one lock hold
        let _guard = self.lock()?;

        if !issue_path.exists() {
            bail!("Issue not found: {}", issue.id);
        }
        self.write_json(&issue_path, issue)
    }

    fn load_issue(&self, project: &str, id: &str) -> Result<Issue> {
        let issue_path = self.issue_path(project, id)?;
        if !issue_path.exists() {
            bail!("Issue not found: {}", id);
        }
        self.read_json(&issue_path)
    }

    fn delete_issue(&self, project: &str, id: &str) -> Result<()> {
        let issue_path = self.issue_path(project, id)?;
        let _guard = self.lock()?;

        if !issue_path.exists() {
            bail!("Issue not found: {}", id);
        }

        // Drop from the index first so a concurrent listing never sees a
        // dangling ID
        let mut index = self.load_index(project)?;
        index.all_ids.retain(|i| i != id);
        self.save_index(project, &index)?;

        fs::remove_file(&issue_path).context("Failed to delete issue file")?;
        Ok(())
    }

    fn list_issues(&self, project: &str) -> Result<Vec<Issue>> {
        let _guard = self.lock()?;
        let index = self.load_index(project)?;
        index
            .all_ids
            .iter()
            .map(|id| self.load_issue(project, id))
            .collect()
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let projects_dir = self.root.join(PROJECTS_DIR);
        if !projects_dir.exists() {
            return Ok(Vec::new());
        }

        let _guard = self.lock()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&projects_dir).context("Failed to read projects directory")? {
            let index_path = entry.context("Failed to read project entry")?.path().join(INDEX_FILE);
            if !index_path.exists() {
                continue;
            }
            let index: Index = self.read_json(&index_path)?;
            if !index.all_ids.is_empty() {
                names.push(index.name);
            }
        }

        names.sort();
        Ok(names)
    }
}
