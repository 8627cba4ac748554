//! Task insertion with cycle checking, and ready-frontier computation.

use serde::Serialize;
use std::collections::HashSet;

use crate::errors::CoordinationError;
use crate::model::{Project, ProjectBody, StageRecord, Status, TaskRecord};

/// Insert a task into a DAG project.
///
/// Fails with `CircularDependency` when a dependency names the task itself
/// or already (transitively) depends on it through the existing edges.
/// Re-adding an existing task id overwrites the record in place, subject to
/// the same cycle check against the rest of the graph.
pub fn add_task(
    project: &mut Project,
    task_id: &str,
    agent: &str,
    description: &str,
    deps: Vec<String>,
) -> Result<(), CoordinationError> {
    let actual = project.mode();
    let ProjectBody::Dag { tasks } = &mut project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "add",
            required: "dag",
            actual,
        });
    };

    for dep in &deps {
        if dep == task_id {
            return Err(CoordinationError::CircularDependency {
                task: task_id.to_string(),
                dep: dep.clone(),
            });
        }
        if depends_on(tasks, dep, task_id) {
            return Err(CoordinationError::CircularDependency {
                task: task_id.to_string(),
                dep: dep.clone(),
            });
        }
    }

    let mut stage = StageRecord::new(task_id, agent);
    stage.description = description.to_string();
    let record = TaskRecord { stage, deps };

    match tasks.iter_mut().find(|t| t.stage.name == task_id) {
        Some(existing) => {
            tracing::debug!(task = task_id, "overwriting existing task record");
            *existing = record;
        }
        None => tasks.push(record),
    }
    project.touch();
    Ok(())
}

/// Whether `from` can reach `target` by following prerequisite edges.
///
/// Iterative walk with an explicit stack so deep graphs cannot overflow
/// the call stack. Unknown task names terminate the walk.
fn depends_on(tasks: &[TaskRecord], from: &str, target: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![from];

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(task) = tasks.iter().find(|t| t.stage.name == current) {
            stack.extend(task.deps.iter().map(String::as_str));
        }
    }
    false
}

/// A task whose prerequisites are all satisfied.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyTask {
    pub task: String,
    pub agent: String,
    pub description: String,
    pub deps: Vec<String>,
}

/// Every pending task whose dependencies are all done.
///
/// Recomputed in full on each call; a dependency naming an unknown task
/// blocks its dependent until that task is added and completed.
pub fn ready(project: &Project) -> Result<Vec<ReadyTask>, CoordinationError> {
    let ProjectBody::Dag { tasks } = &project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "ready",
            required: "dag",
            actual: project.mode(),
        });
    };

    let status_of = |name: &str| {
        tasks
            .iter()
            .find(|t| t.stage.name == name)
            .map(|t| t.stage.status)
    };

    Ok(tasks
        .iter()
        .filter(|t| t.stage.status == Status::Pending)
        .filter(|t| {
            t.deps
                .iter()
                .all(|dep| status_of(dep) == Some(Status::Done))
        })
        .map(|t| ReadyTask {
            task: t.stage.name.clone(),
            agent: t.stage.agent.clone(),
            description: t.stage.description.clone(),
            deps: t.deps.clone(),
        })
        .collect())
}
