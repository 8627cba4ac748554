//! Linear coordinator: ordered single-path pipeline.

use serde::Serialize;

use crate::errors::CoordinationError;
use crate::model::{Project, ProjectBody, Status};

/// The next stage a caller should dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct NextStage {
    pub stage: String,
    pub agent: String,
    pub description: String,
}

/// First pending stage in pipeline order, or `None` when every stage is
/// done, failed, or skipped.
pub fn next(project: &Project) -> Result<Option<NextStage>, CoordinationError> {
    let ProjectBody::Linear { stages } = &project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "next",
            required: "linear",
            actual: project.mode(),
        });
    };
    Ok(stages
        .iter()
        .find(|s| s.status == Status::Pending)
        .map(|s| NextStage {
            stage: s.name.clone(),
            agent: s.agent.clone(),
            description: s.description.clone(),
        }))
}

/// Runs after a linear stage is marked done: scans pipeline order and resets
/// the first in-progress stage back to pending.
///
/// This reproduces the long-standing behavior of the original coordinator,
/// which returns the in-flight stage to the queue instead of promoting the
/// next pending stage. Pinned by `next_after_done_resets_in_progress_stage`.
// TODO: decide whether completing a stage should instead promote the next
// pending stage to in-progress, and migrate existing project files if so.
pub fn auto_advance(project: &mut Project) {
    if let ProjectBody::Linear { stages } = &mut project.body {
        if let Some(stage) = stages.iter_mut().find(|s| s.status == Status::InProgress) {
            tracing::debug!(stage = %stage.name, "auto-advance: returning in-progress stage to pending");
            stage.status = Status::Pending;
        }
    }
}
