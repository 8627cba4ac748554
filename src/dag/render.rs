//! Human-readable tree rendering of a dependency graph.

use std::collections::HashSet;

use crate::errors::CoordinationError;
use crate::model::{Project, ProjectBody, Status, TaskRecord};
use crate::ui::icons;

/// Render the dependency graph as an indented tree.
///
/// Root tasks are those never listed as a dependency of any other task.
/// Each node expands its own dependency list as children. The walk is
/// iterative with an explicit stack, and a task already on the current
/// path is printed as a cycle marker instead of being expanded; insertion
/// checking is expected to keep cycles out of persisted records, so this
/// guard exists only to keep a corrupted record renderable.
pub fn graph(project: &Project) -> Result<String, CoordinationError> {
    let ProjectBody::Dag { tasks } = &project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "graph",
            required: "dag",
            actual: project.mode(),
        });
    };

    let mut lines = vec![format!("{}{} (dag)", icons::PROJECT, project.id), String::new()];

    let dependents: HashSet<&str> = tasks
        .iter()
        .flat_map(|t| t.deps.iter().map(String::as_str))
        .collect();
    let roots = tasks.iter().filter(|t| !dependents.contains(t.stage.name.as_str()));

    for root in roots {
        render_subtree(tasks, &root.stage.name, &mut lines);
    }

    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.stage.status == Status::Done).count();
    lines.push(String::new());
    lines.push(format!(
        "[{}{}] {done}/{total}",
        "\u{2588}".repeat(done),
        "\u{2591}".repeat(total.saturating_sub(done)),
    ));

    Ok(lines.join("\n"))
}

fn render_subtree(tasks: &[TaskRecord], root: &str, lines: &mut Vec<String>) {
    // Explicit stack of (task, depth); `path` mirrors the ancestors of the
    // frame being expanded so a revisit on the current path is detectable.
    let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
    let mut path: Vec<&str> = Vec::new();

    while let Some((name, depth)) = stack.pop() {
        path.truncate(depth);
        let prefix = "\u{2502} ".repeat(depth);

        if path.contains(&name) {
            lines.push(format!("{prefix}\u{251c}\u{2500} {name} (cycle)"));
            continue;
        }

        let Some(task) = tasks.iter().find(|t| t.stage.name == name) else {
            continue;
        };
        lines.push(format!(
            "{prefix}\u{251c}\u{2500} {}{name} [{}]",
            icons::status_icon(task.stage.status),
            task.stage.agent,
        ));
        path.push(name);
        for dep in task.deps.iter().rev() {
            stack.push((dep, depth + 1));
        }
    }
}
