use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "team-tasks")]
#[command(version, about = "Multi-agent pipeline coordination")]
pub struct Cli {
    /// Directory holding project records (defaults to $TEAM_TASKS_DIR, then
    /// the platform data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project
    Init {
        project: String,
        /// Project goal
        #[arg(short, long)]
        goal: String,
        /// Coordination mode: linear, dag, debate
        #[arg(short, long, default_value = "linear")]
        mode: String,
        /// Comma-separated pipeline stages (linear mode)
        #[arg(short, long)]
        pipeline: Option<String>,
        /// Comma-separated agents assigned to the pipeline stages
        #[arg(short, long)]
        agents: Option<String>,
        /// Workspace directory to create
        #[arg(short, long)]
        workspace: Option<PathBuf>,
        /// Overwrite an existing project
        #[arg(short, long)]
        force: bool,
    },
    /// Add a task to a DAG project
    Add {
        project: String,
        task_id: String,
        /// Agent to execute the task
        #[arg(short, long)]
        agent: String,
        /// Comma-separated prerequisite task ids
        #[arg(short, long)]
        deps: Option<String>,
        /// Task description
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// Add a debater to a debate project
    AddDebater {
        project: String,
        agent_id: String,
        /// Debater role or perspective
        #[arg(short, long, default_value = "")]
        role: String,
    },
    /// Set a stage description
    Assign {
        project: String,
        stage: String,
        description: String,
    },
    /// Update a stage status
    Update {
        project: String,
        stage: String,
        /// New status: pending, in-progress, done, failed, skipped
        status: String,
    },
    /// Save a stage's result output
    Result {
        project: String,
        stage: String,
        output: String,
    },
    /// Append a log entry to a stage
    Log {
        project: String,
        stage: String,
        message: String,
    },
    /// Show the next pending stage (linear mode)
    Next { project: String },
    /// Show ready-to-dispatch tasks (DAG mode)
    Ready { project: String },
    /// Show project status
    Status { project: String },
    /// Show the dependency graph (DAG mode)
    Graph { project: String },
    /// Drive a debate round: start, collect, cross-review, synthesize
    Round {
        project: String,
        action: String,
        agent_id: Option<String>,
        output: Option<String>,
    },
    /// List all projects
    List,
    /// Reset a stage, or the whole project with --all
    Reset {
        project: String,
        stage: Option<String>,
        /// Reset every stage and clear results
        #[arg(long)]
        all: bool,
    },
    /// Show a stage's log history
    History { project: String, stage: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = team_tasks::store::JsonStore::open(cli.data_dir.clone())?;

    match &cli.command {
        Commands::Init {
            project,
            goal,
            mode,
            pipeline,
            agents,
            workspace,
            force,
        } => cmd::cmd_init(
            &store,
            project,
            goal,
            mode,
            pipeline.as_deref(),
            agents.as_deref(),
            workspace.clone(),
            *force,
        )?,
        Commands::Add {
            project,
            task_id,
            agent,
            deps,
            desc,
        } => cmd::cmd_add(&store, project, task_id, agent, desc, deps.as_deref())?,
        Commands::AddDebater {
            project,
            agent_id,
            role,
        } => cmd::cmd_add_debater(&store, project, agent_id, role)?,
        Commands::Assign {
            project,
            stage,
            description,
        } => cmd::cmd_assign(&store, project, stage, description)?,
        Commands::Update {
            project,
            stage,
            status,
        } => cmd::cmd_update(&store, project, stage, status)?,
        Commands::Result {
            project,
            stage,
            output,
        } => cmd::cmd_result(&store, project, stage, output)?,
        Commands::Log {
            project,
            stage,
            message,
        } => cmd::cmd_log(&store, project, stage, message)?,
        Commands::Next { project } => cmd::cmd_next(&store, project)?,
        Commands::Ready { project } => cmd::cmd_ready(&store, project)?,
        Commands::Status { project } => cmd::cmd_status(&store, project)?,
        Commands::Graph { project } => cmd::cmd_graph(&store, project)?,
        Commands::Round {
            project,
            action,
            agent_id,
            output,
        } => cmd::cmd_round(
            &store,
            project,
            action,
            agent_id.as_deref(),
            output.as_deref(),
        )?,
        Commands::List => cmd::cmd_list(&store)?,
        Commands::Reset {
            project,
            stage,
            all,
        } => cmd::cmd_reset(&store, project, stage.as_deref(), *all)?,
        Commands::History { project, stage } => cmd::cmd_history(&store, project, stage)?,
    }

    Ok(())
}
