//! Command handlers: one function per CLI subcommand.
//!
//! Every mutation takes the project's advisory lock, loads the full record,
//! applies one operation, and saves the full record back. Queries read
//! without the lock. Validation failures surface before any save, so a
//! failed command never leaves a half-applied record on disk.

use anyhow::Result;
use std::path::PathBuf;

use team_tasks::debate::{self, RoundOutcome};
use team_tasks::model::{Mode, Project, Status};
use team_tasks::store::{JsonStore, ProjectStore};
use team_tasks::ui::icons;
use team_tasks::{dag, linear};

fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_init(
    store: &JsonStore,
    project: &str,
    goal: &str,
    mode: &str,
    pipeline: Option<&str>,
    agents: Option<&str>,
    workspace: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let mode: Mode = mode.parse()?;
    let _lock = store.lock(project)?;
    if store.exists(project) && !force {
        return Err(team_tasks::errors::CoordinationError::ProjectAlreadyExists {
            id: project.to_string(),
        }
        .into());
    }

    let record = Project::new(
        project,
        goal,
        mode,
        &split_csv(pipeline),
        &split_csv(agents),
        workspace,
    );
    if let Some(dir) = &record.workspace {
        std::fs::create_dir_all(dir)?;
    }
    store.save(&record)?;

    println!("{}Project '{project}' initialized", icons::OK);
    println!("   Mode: {mode}");
    println!("   Goal: {goal}");
    Ok(())
}

pub fn cmd_add(
    store: &JsonStore,
    project: &str,
    task_id: &str,
    agent: &str,
    description: &str,
    deps: Option<&str>,
) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    dag::add_task(&mut record, task_id, agent, description, split_csv(deps))?;
    store.save(&record)?;
    println!("{}Task '{task_id}' added to '{project}'", icons::OK);
    Ok(())
}

pub fn cmd_add_debater(store: &JsonStore, project: &str, agent_id: &str, role: &str) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    debate::add_debater(&mut record, agent_id, role)?;
    store.save(&record)?;
    println!("{}Debater '{agent_id}' added to '{project}'", icons::OK);
    Ok(())
}

pub fn cmd_assign(store: &JsonStore, project: &str, stage: &str, description: &str) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    record.assign(stage, description)?;
    store.save(&record)?;
    println!("{}Stage '{stage}' description updated", icons::OK);
    Ok(())
}

pub fn cmd_update(store: &JsonStore, project: &str, stage: &str, status: &str) -> Result<()> {
    let status: Status = status.parse()?;
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    record.update_status(stage, status)?;
    store.save(&record)?;
    println!("{}Stage '{stage}' status: {status}", icons::OK);
    Ok(())
}

pub fn cmd_result(store: &JsonStore, project: &str, stage: &str, output: &str) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    record.set_result(stage, output)?;
    store.save(&record)?;
    println!("{}Result saved for '{stage}'", icons::OK);
    Ok(())
}

pub fn cmd_log(store: &JsonStore, project: &str, stage: &str, message: &str) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    let entry = record.append_log(stage, message)?;
    store.save(&record)?;
    println!("{}Log entry added at {}", icons::OK, entry.timestamp.to_rfc3339());
    Ok(())
}

pub fn cmd_next(store: &JsonStore, project: &str) -> Result<()> {
    let record = store.load(project)?;
    match linear::next(&record)? {
        Some(next) => {
            println!("{}Next stage: {}", icons::NEXT, next.stage);
            println!("   Agent: {}", next.agent);
            println!("   Description: {}", next.description);
        }
        None => println!("{}All stages completed!", icons::OK),
    }
    Ok(())
}

pub fn cmd_ready(store: &JsonStore, project: &str) -> Result<()> {
    let record = store.load(project)?;
    let tasks = dag::ready(&record)?;
    if tasks.is_empty() {
        println!("{}No tasks ready", icons::WAITING);
        return Ok(());
    }
    println!("{}Ready to dispatch ({} tasks):", icons::READY, tasks.len());
    for task in tasks {
        let deps = if task.deps.is_empty() {
            "none".to_string()
        } else {
            task.deps.join(", ")
        };
        println!(
            "   {}{} -> agent: {} (deps: {deps})",
            icons::PIN,
            task.task,
            task.agent
        );
    }
    Ok(())
}

pub fn cmd_status(store: &JsonStore, project: &str) -> Result<()> {
    let record = store.load(project)?;
    println!("{}Project: {}", icons::PROJECT, record.id);
    println!("{}Goal: {}", icons::GOAL, record.goal);
    println!(
        "   Status: {} | Mode: {}",
        match record.status {
            team_tasks::model::ProjectStatus::Active => "active",
            team_tasks::model::ProjectStatus::Completed => "completed",
        },
        record.mode()
    );
    println!();
    println!("Stages:");
    for (name, status) in record.stage_summaries() {
        println!("   {}{name}: {status}", icons::status_icon(status));
    }
    Ok(())
}

pub fn cmd_graph(store: &JsonStore, project: &str) -> Result<()> {
    let record = store.load(project)?;
    println!("{}", dag::graph(&record)?);
    Ok(())
}

pub fn cmd_round(
    store: &JsonStore,
    project: &str,
    action: &str,
    agent_id: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    let outcome = debate::round(&mut record, action, agent_id, output)?;
    store.save(&record)?;
    match outcome {
        RoundOutcome::Started => {
            println!("{}Debate round 1 (initial) started", icons::SPEECH);
        }
        RoundOutcome::Collected { agent, all_in } => {
            println!("{}Collected from {agent}", icons::SPEECH);
            if all_in {
                println!("   All positions in; cross-review is open");
            }
        }
        RoundOutcome::CrossReviewStarted { outputs } => {
            println!("{}Cross-review started", icons::SPEECH);
            for (agent, position) in outputs {
                println!("   {agent}: {position}");
            }
        }
        RoundOutcome::Synthesized(artifact) => {
            println!("{}Synthesis complete", icons::SPEECH);
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
    }
    Ok(())
}

pub fn cmd_list(store: &JsonStore) -> Result<()> {
    let projects = store.list()?;
    if projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }
    println!("Projects:");
    for id in projects {
        println!("   - {id}");
    }
    Ok(())
}

pub fn cmd_reset(store: &JsonStore, project: &str, stage: Option<&str>, all: bool) -> Result<()> {
    let _lock = store.lock(project)?;
    let mut record = store.load(project)?;
    if all {
        record.reset_all();
    } else if let Some(stage) = stage {
        record.reset_stage(stage)?;
    } else {
        return Err(team_tasks::errors::CoordinationError::MissingArgument {
            action: "reset",
            argument: "a stage name or --all",
        }
        .into());
    }
    store.save(&record)?;
    println!("{}Project '{project}' reset", icons::OK);
    Ok(())
}

pub fn cmd_history(store: &JsonStore, project: &str, stage: &str) -> Result<()> {
    let record = store.load(project)?;
    let entries = record.history(stage)?;
    if entries.is_empty() {
        println!("No history");
        return Ok(());
    }
    for entry in entries {
        println!("[{}] {}", entry.timestamp.to_rfc3339(), entry.message);
    }
    Ok(())
}
