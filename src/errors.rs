//! Typed error hierarchy for the coordination engine.
//!
//! Every validation failure is raised at the point of detection and carries
//! enough context to be matched on by callers. The CLI boundary converts
//! these into human-readable messages via `anyhow`.

use crate::model::Mode;
use thiserror::Error;

/// Errors from the coordination engine and project store.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    #[error("Project already exists: {id} (use --force to overwrite)")]
    ProjectAlreadyExists { id: String },

    #[error("Invalid mode: {value}. Must be one of: linear, dag, debate")]
    InvalidMode { value: String },

    #[error("Invalid status: {value}. Must be one of: pending, in-progress, done, failed, skipped")]
    InvalidStatus { value: String },

    #[error("'{operation}' requires a {required} project (found {actual})")]
    ModeMismatch {
        operation: &'static str,
        required: &'static str,
        actual: Mode,
    },

    #[error("Stage not found: {stage}")]
    StageNotFound { stage: String },

    #[error("Circular dependency: {task} -> {dep}")]
    CircularDependency { task: String, dep: String },

    #[error("Unknown round action: {action}")]
    UnknownAction { action: String },

    #[error("'{action}' requires {argument}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },

    #[error("Debater not found: {agent}")]
    DebaterNotFound { agent: String },

    #[error("Failed to read project record at {path}: {source}")]
    StoreRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write project record at {path}: {source}")]
    StoreWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project record at {path}: {source}")]
    Malformed {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_not_found_carries_id() {
        let err = CoordinationError::ProjectNotFound {
            id: "p1".to_string(),
        };
        match &err {
            CoordinationError::ProjectNotFound { id } => assert_eq!(id, "p1"),
            _ => panic!("Expected ProjectNotFound"),
        }
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn mode_mismatch_names_operation_and_modes() {
        let err = CoordinationError::ModeMismatch {
            operation: "ready",
            required: "dag",
            actual: Mode::Linear,
        };
        let msg = err.to_string();
        assert!(msg.contains("ready"));
        assert!(msg.contains("dag"));
        assert!(msg.contains("linear"));
    }

    #[test]
    fn circular_dependency_names_both_ends() {
        let err = CoordinationError::CircularDependency {
            task: "build".to_string(),
            dep: "test".to_string(),
        };
        assert!(err.to_string().contains("build -> test"));
    }

    #[test]
    fn store_read_carries_path() {
        use std::path::PathBuf;
        let path = PathBuf::from("/data/p1.json");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = CoordinationError::StoreRead {
            path: path.clone(),
            source: io_err,
        };
        match &err {
            CoordinationError::StoreRead { path: p, source: s } => {
                assert_eq!(p, &path);
                assert_eq!(s.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected StoreRead"),
        }
    }

    #[test]
    fn error_implements_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let err = CoordinationError::UnknownAction {
            action: "foo".to_string(),
        };
        assert_std_error(&err);
    }
}
