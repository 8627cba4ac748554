//! Project persistence: one JSON document per project.
//!
//! The store is deliberately dumb: `load` reads the whole record, `save`
//! rewrites it. Mutating commands wrap the load-mutate-save cycle in an
//! advisory file lock (see [`JsonStore::lock`]) so two agents racing the
//! same project cannot lose an update; last writer wins was the historical
//! behavior and is no longer possible on one host.

use anyhow::{Context, anyhow};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::errors::CoordinationError;
use crate::model::Project;

/// Environment variable selecting the data directory.
pub const DATA_DIR_ENV: &str = "TEAM_TASKS_DIR";

/// Persistence contract for project records. The backing medium is
/// swappable; the engine only ever does whole-record reads and writes.
pub trait ProjectStore {
    fn load(&self, id: &str) -> Result<Project, CoordinationError>;
    fn save(&self, project: &Project) -> Result<(), CoordinationError>;
    fn exists(&self, id: &str) -> bool;
    fn list(&self) -> Result<Vec<String>, CoordinationError>;
}

/// File-backed store: `<data_dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory (flag, then environment, then the
    /// platform data dir) and make sure it exists.
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self, CoordinationError> {
        let dir = match data_dir {
            Some(dir) => dir,
            None => match std::env::var_os(DATA_DIR_ENV) {
                Some(dir) => PathBuf::from(dir),
                None => dirs::data_dir()
                    .ok_or_else(|| anyhow!("Could not determine a data directory; set {DATA_DIR_ENV}"))?
                    .join("team-tasks"),
            },
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self::new(dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn project_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }

    /// Take an advisory exclusive lock for a project id, held until the
    /// returned guard is dropped. Mutating commands take this around their
    /// load-mutate-save cycle; queries read without it.
    pub fn lock(&self, id: &str) -> Result<StoreLock, CoordinationError> {
        let path = self.data_dir.join(format!("{id}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|source| CoordinationError::StoreWrite {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| CoordinationError::StoreWrite { path, source })?;
        tracing::debug!(project = id, "acquired project lock");
        Ok(StoreLock { file })
    }
}

impl ProjectStore for JsonStore {
    fn load(&self, id: &str) -> Result<Project, CoordinationError> {
        let path = self.project_path(id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoordinationError::ProjectNotFound { id: id.to_string() });
            }
            Err(source) => return Err(CoordinationError::StoreRead { path, source }),
        };
        serde_json::from_str(&text).map_err(|source| CoordinationError::Malformed { path, source })
    }

    fn save(&self, project: &Project) -> Result<(), CoordinationError> {
        let path = self.project_path(&project.id);
        let text = serde_json::to_string_pretty(project)
            .map_err(|e| CoordinationError::Other(e.into()))?;
        fs::write(&path, text).map_err(|source| CoordinationError::StoreWrite { path, source })?;
        tracing::debug!(project = %project.id, "saved project record");
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.project_path(id).exists()
    }

    fn list(&self) -> Result<Vec<String>, CoordinationError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|source| {
            CoordinationError::StoreRead {
                path: self.data_dir.clone(),
                source,
            }
        })?;
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Guard for an advisory project lock, released on drop.
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
