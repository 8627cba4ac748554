//! Dependency-graph coordinator.
//!
//! Tasks form a directed acyclic graph over prerequisite edges. The two
//! halves of this module are:
//!
//! 1. **Resolver** - inserts tasks with an insertion-time cycle check and
//!    computes the ready frontier on demand
//! 2. **Render** - draws the graph as an indented tree with status icons
//!
//! The ready frontier is recomputed in full on every call because task
//! statuses can change between invocations from any collaborating process.

mod render;
mod resolver;

pub use render::graph;
pub use resolver::{ReadyTask, add_task, ready};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mode, Project, Status};

    fn diamond() -> Project {
        let mut p = Project::new("p1", "g", Mode::Dag, &[], &[], None);
        add_task(&mut p, "setup", "a1", "Initial setup", vec![]).unwrap();
        add_task(&mut p, "core-a", "a2", "Core work A", vec!["setup".into()]).unwrap();
        add_task(&mut p, "core-b", "a3", "Core work B", vec!["setup".into()]).unwrap();
        add_task(
            &mut p,
            "integrate",
            "a4",
            "Integration",
            vec!["core-a".into(), "core-b".into()],
        )
        .unwrap();
        p
    }

    #[test]
    fn frontier_advances_as_dependencies_complete() {
        let mut p = diamond();

        let names: Vec<_> = ready(&p).unwrap().into_iter().map(|t| t.task).collect();
        assert_eq!(names, vec!["setup"]);

        p.update_status("setup", Status::Done).unwrap();
        let names: Vec<_> = ready(&p).unwrap().into_iter().map(|t| t.task).collect();
        assert_eq!(names, vec!["core-a", "core-b"]);

        p.update_status("core-a", Status::Done).unwrap();
        p.update_status("core-b", Status::Done).unwrap();
        let names: Vec<_> = ready(&p).unwrap().into_iter().map(|t| t.task).collect();
        assert_eq!(names, vec!["integrate"]);
    }

    #[test]
    fn cycle_insertion_is_rejected() {
        let mut p = Project::new("p1", "g", Mode::Dag, &[], &[], None);
        add_task(&mut p, "a", "x", "", vec![]).unwrap();
        add_task(&mut p, "b", "x", "", vec!["a".into()]).unwrap();
        add_task(&mut p, "c", "x", "", vec!["b".into()]).unwrap();

        // a would now depend on c, which transitively depends on a.
        let err = add_task(&mut p, "a", "x", "", vec!["c".into()]).unwrap_err();
        assert!(matches!(
            err,
            crate::errors::CoordinationError::CircularDependency { .. }
        ));
    }

    #[test]
    fn graph_lists_every_task() {
        let p = diamond();
        let out = graph(&p).unwrap();
        for name in ["setup", "core-a", "core-b", "integrate"] {
            assert!(out.contains(name), "graph output missing {name}: {out}");
        }
    }
}
