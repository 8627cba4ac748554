//! Project data model shared by all three coordination protocols.
//!
//! A project is one persisted record. The mode-specific shape lives in
//! [`ProjectBody`], an internally-tagged enum, so a linear project cannot
//! carry a dependency edge and a debate project cannot carry a free-form
//! stage list. Stage and task lists are `Vec`-backed because insertion
//! order is significant for linear pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::CoordinationError;

/// Coordination protocol, fixed at project creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Linear,
    Dag,
    Debate,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Linear => write!(f, "linear"),
            Mode::Dag => write!(f, "dag"),
            Mode::Debate => write!(f, "debate"),
        }
    }
}

impl FromStr for Mode {
    type Err = CoordinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Mode::Linear),
            "dag" => Ok(Mode::Dag),
            "debate" => Ok(Mode::Debate),
            other => Err(CoordinationError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Status of a stage, task, round, or debater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    Done,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Done => "done",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoordinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            "failed" => Ok(Status::Failed),
            "skipped" => Ok(Status::Skipped),
            other => Err(CoordinationError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Overall project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
}

/// Timestamped log entry attached to a stage. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One unit of assigned work in a linear or DAG project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    pub fn new(name: &str, agent: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            status: Status::Pending,
            description: String::new(),
            agent: agent.to_string(),
            result: String::new(),
            log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A DAG task: a stage record plus its prerequisite task names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub stage: StageRecord,
    #[serde(default)]
    pub deps: Vec<String>,
}

/// One debate round collecting per-debater outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub status: Status,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Round {
    fn new() -> Self {
        Self {
            status: Status::Pending,
            outputs: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// The final debate round holding the merged artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub status: Status,
    #[serde(default)]
    pub output: String,
    pub created_at: DateTime<Utc>,
}

impl Synthesis {
    fn new() -> Self {
        Self {
            status: Status::Pending,
            output: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// The fixed three-round debate progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRounds {
    pub initial: Round,
    pub cross_review: Round,
    pub synthesis: Synthesis,
}

impl DebateRounds {
    fn new() -> Self {
        Self {
            initial: Round::new(),
            cross_review: Round::new(),
            synthesis: Synthesis::new(),
        }
    }
}

/// A named participant in a debate project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debater {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub cross_review: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Debater {
    pub fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            position: String::new(),
            cross_review: String::new(),
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Mode-specific project shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ProjectBody {
    Linear {
        stages: Vec<StageRecord>,
    },
    Dag {
        tasks: Vec<TaskRecord>,
    },
    Debate {
        rounds: DebateRounds,
        debaters: BTreeMap<String, Debater>,
    },
}

/// A persisted coordination project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub goal: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: ProjectBody,
}

impl Project {
    /// Create a fresh project with the mode-specific initial skeleton.
    ///
    /// Linear: one pending stage per pipeline entry, agents assigned
    /// positionally. DAG: empty task list. Debate: the three fixed rounds.
    pub fn new(
        id: &str,
        goal: &str,
        mode: Mode,
        pipeline: &[String],
        agents: &[String],
        workspace: Option<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        let body = match mode {
            Mode::Linear => ProjectBody::Linear {
                stages: pipeline
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        StageRecord::new(name, agents.get(i).map(String::as_str).unwrap_or(""))
                    })
                    .collect(),
            },
            Mode::Dag => ProjectBody::Dag { tasks: Vec::new() },
            Mode::Debate => ProjectBody::Debate {
                rounds: DebateRounds::new(),
                debaters: BTreeMap::new(),
            },
        };
        Self {
            id: id.to_string(),
            goal: goal.to_string(),
            status: ProjectStatus::Active,
            workspace,
            created_at: now,
            updated_at: now,
            body,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.body {
            ProjectBody::Linear { .. } => Mode::Linear,
            ProjectBody::Dag { .. } => Mode::Dag,
            ProjectBody::Debate { .. } => Mode::Debate,
        }
    }

    /// Stamp the project-level modification time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Look up a stage record by name in a linear or DAG project.
    ///
    /// Debate rounds carry no description/result/log fields, so record-level
    /// operations against a debate project fail with `ModeMismatch`.
    pub fn stage_mut(
        &mut self,
        operation: &'static str,
        name: &str,
    ) -> Result<&mut StageRecord, CoordinationError> {
        let actual = self.mode();
        let found = match &mut self.body {
            ProjectBody::Linear { stages } => stages.iter_mut().find(|s| s.name == name),
            ProjectBody::Dag { tasks } => {
                tasks.iter_mut().map(|t| &mut t.stage).find(|s| s.name == name)
            }
            ProjectBody::Debate { .. } => {
                return Err(CoordinationError::ModeMismatch {
                    operation,
                    required: "linear or dag",
                    actual,
                });
            }
        };
        found.ok_or_else(|| CoordinationError::StageNotFound {
            stage: name.to_string(),
        })
    }

    /// Read-only stage lookup, same mode rules as [`Self::stage_mut`].
    pub fn stage(
        &self,
        operation: &'static str,
        name: &str,
    ) -> Result<&StageRecord, CoordinationError> {
        let actual = self.mode();
        let found = match &self.body {
            ProjectBody::Linear { stages } => stages.iter().find(|s| s.name == name),
            ProjectBody::Dag { tasks } => {
                tasks.iter().map(|t| &t.stage).find(|s| s.name == name)
            }
            ProjectBody::Debate { .. } => {
                return Err(CoordinationError::ModeMismatch {
                    operation,
                    required: "linear or dag",
                    actual,
                });
            }
        };
        found.ok_or_else(|| CoordinationError::StageNotFound {
            stage: name.to_string(),
        })
    }

    /// Set a stage description.
    pub fn assign(&mut self, stage: &str, description: &str) -> Result<(), CoordinationError> {
        let record = self.stage_mut("assign", stage)?;
        record.description = description.to_string();
        record.updated_at = Utc::now();
        self.touch();
        Ok(())
    }

    /// Set a stage status, stamping both stage and project timestamps.
    ///
    /// On a debate project the three fixed rounds are addressed by name.
    /// Completing a linear stage triggers the auto-advance pass.
    pub fn update_status(&mut self, stage: &str, status: Status) -> Result<(), CoordinationError> {
        if let ProjectBody::Debate { rounds, .. } = &mut self.body {
            match stage {
                "initial" => rounds.initial.status = status,
                "cross_review" => rounds.cross_review.status = status,
                "synthesis" => rounds.synthesis.status = status,
                other => {
                    return Err(CoordinationError::StageNotFound {
                        stage: other.to_string(),
                    });
                }
            }
        } else {
            let record = self.stage_mut("update", stage)?;
            record.status = status;
            record.updated_at = Utc::now();
        }
        self.touch();
        if self.mode() == Mode::Linear && status == Status::Done {
            crate::linear::auto_advance(self);
        }
        Ok(())
    }

    /// Overwrite a stage's result output.
    pub fn set_result(&mut self, stage: &str, output: &str) -> Result<(), CoordinationError> {
        let record = self.stage_mut("result", stage)?;
        record.result = output.to_string();
        record.updated_at = Utc::now();
        self.touch();
        Ok(())
    }

    /// Append a timestamped entry to a stage's log. Logs are never truncated
    /// or reordered.
    pub fn append_log(
        &mut self,
        stage: &str,
        message: &str,
    ) -> Result<LogEntry, CoordinationError> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message: message.to_string(),
        };
        let record = self.stage_mut("log", stage)?;
        record.log.push(entry.clone());
        self.touch();
        Ok(entry)
    }

    /// The log for a stage, in insertion order.
    pub fn history(&self, stage: &str) -> Result<&[LogEntry], CoordinationError> {
        Ok(&self.stage("history", stage)?.log)
    }

    /// Reset every stage back to pending and clear results, regardless of
    /// prior state. The project itself is reactivated, never deleted.
    pub fn reset_all(&mut self) {
        match &mut self.body {
            ProjectBody::Linear { stages } => {
                for stage in stages {
                    stage.status = Status::Pending;
                    stage.result.clear();
                }
            }
            ProjectBody::Dag { tasks } => {
                for task in tasks {
                    task.stage.status = Status::Pending;
                    task.stage.result.clear();
                }
            }
            ProjectBody::Debate { rounds, debaters } => {
                rounds.initial.status = Status::Pending;
                rounds.initial.outputs.clear();
                rounds.cross_review.status = Status::Pending;
                rounds.cross_review.outputs.clear();
                rounds.synthesis.status = Status::Pending;
                rounds.synthesis.output.clear();
                for debater in debaters.values_mut() {
                    debater.status = Status::Pending;
                    debater.position.clear();
                    debater.cross_review.clear();
                }
            }
        }
        self.status = ProjectStatus::Active;
        self.touch();
    }

    /// Reset a single stage back to pending.
    pub fn reset_stage(&mut self, stage: &str) -> Result<(), CoordinationError> {
        if let ProjectBody::Debate { rounds, .. } = &mut self.body {
            match stage {
                "initial" => rounds.initial.status = Status::Pending,
                "cross_review" => rounds.cross_review.status = Status::Pending,
                "synthesis" => rounds.synthesis.status = Status::Pending,
                other => {
                    return Err(CoordinationError::StageNotFound {
                        stage: other.to_string(),
                    });
                }
            }
        } else {
            self.stage_mut("reset", stage)?.status = Status::Pending;
        }
        self.touch();
        Ok(())
    }

    /// Name and status of every stage, for status displays. Works in all
    /// modes; debate projects report their three fixed rounds.
    pub fn stage_summaries(&self) -> Vec<(String, Status)> {
        match &self.body {
            ProjectBody::Linear { stages } => stages
                .iter()
                .map(|s| (s.name.clone(), s.status))
                .collect(),
            ProjectBody::Dag { tasks } => tasks
                .iter()
                .map(|t| (t.stage.name.clone(), t.stage.status))
                .collect(),
            ProjectBody::Debate { rounds, .. } => vec![
                ("initial".to_string(), rounds.initial.status),
                ("cross_review".to_string(), rounds.cross_review.status),
                ("synthesis".to_string(), rounds.synthesis.status),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_project() -> Project {
        Project::new(
            "p1",
            "ship it",
            Mode::Linear,
            &["design".into(), "build".into(), "test".into()],
            &["archie".into(), "bob".into()],
            None,
        )
    }

    #[test]
    fn status_parses_all_five_values() {
        for (text, expected) in [
            ("pending", Status::Pending),
            ("in-progress", Status::InProgress),
            ("done", Status::Done),
            ("failed", Status::Failed),
            ("skipped", Status::Skipped),
        ] {
            assert_eq!(text.parse::<Status>().unwrap(), expected);
            assert_eq!(expected.to_string(), text);
        }
    }

    #[test]
    fn status_rejects_unknown_value() {
        let err = "cancelled".parse::<Status>().unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidStatus { .. }));
    }

    #[test]
    fn mode_rejects_unknown_value() {
        let err = "parallel".parse::<Mode>().unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidMode { .. }));
    }

    #[test]
    fn linear_init_assigns_agents_positionally() {
        let project = linear_project();
        let ProjectBody::Linear { stages } = &project.body else {
            panic!("expected linear body");
        };
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].name, "design");
        assert_eq!(stages[0].agent, "archie");
        assert_eq!(stages[1].agent, "bob");
        assert_eq!(stages[2].agent, "");
        assert!(stages.iter().all(|s| s.status == Status::Pending));
    }

    #[test]
    fn project_serializes_with_mode_tag() {
        let project = linear_project();
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["mode"], "linear");
        assert_eq!(json["stages"][0]["name"], "design");
        assert_eq!(json["stages"][0]["status"], "pending");

        let back: Project = serde_json::from_value(json).unwrap();
        assert_eq!(back.mode(), Mode::Linear);
    }

    #[test]
    fn debate_project_serializes_fixed_rounds() {
        let project = Project::new("d1", "debate", Mode::Debate, &[], &[], None);
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["mode"], "debate");
        assert_eq!(json["rounds"]["initial"]["status"], "pending");
        assert_eq!(json["rounds"]["synthesis"]["status"], "pending");
    }

    #[test]
    fn update_sets_status_and_stamps_updated_at() {
        let mut project = linear_project();
        let before = project.stage("update", "build").unwrap().updated_at;
        project.update_status("build", Status::Failed).unwrap();
        let stage = project.stage("update", "build").unwrap();
        assert_eq!(stage.status, Status::Failed);
        assert!(stage.updated_at >= before);
    }

    #[test]
    fn update_unknown_stage_fails() {
        let mut project = linear_project();
        let err = project.update_status("deploy", Status::Done).unwrap_err();
        assert!(matches!(err, CoordinationError::StageNotFound { .. }));
    }

    #[test]
    fn update_addresses_debate_rounds_by_name() {
        let mut project = Project::new("d1", "g", Mode::Debate, &[], &[], None);
        project.update_status("cross_review", Status::InProgress).unwrap();
        let ProjectBody::Debate { rounds, .. } = &project.body else {
            panic!("expected debate body");
        };
        assert_eq!(rounds.cross_review.status, Status::InProgress);
    }

    #[test]
    fn assign_on_debate_project_is_mode_mismatch() {
        let mut project = Project::new("d1", "g", Mode::Debate, &[], &[], None);
        let err = project.assign("initial", "desc").unwrap_err();
        assert!(matches!(err, CoordinationError::ModeMismatch { .. }));
    }

    #[test]
    fn log_is_append_only_in_order() {
        let mut project = linear_project();
        project.append_log("design", "first").unwrap();
        project.append_log("design", "second").unwrap();
        let log = project.history("design").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "first");
        assert_eq!(log[1].message, "second");
    }

    #[test]
    fn reset_all_clears_results_from_any_status() {
        let mut project = linear_project();
        project.update_status("design", Status::Done).unwrap();
        project.update_status("build", Status::Failed).unwrap();
        project.update_status("test", Status::Skipped).unwrap();
        project.set_result("design", "output").unwrap();

        project.reset_all();

        for (_, status) in project.stage_summaries() {
            assert_eq!(status, Status::Pending);
        }
        assert_eq!(project.stage("result", "design").unwrap().result, "");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn reset_single_stage_leaves_others_alone() {
        let mut project = linear_project();
        project.update_status("design", Status::Done).unwrap();
        project.update_status("build", Status::Failed).unwrap();
        project.reset_stage("build").unwrap();
        assert_eq!(project.stage("x", "design").unwrap().status, Status::Done);
        assert_eq!(project.stage("x", "build").unwrap().status, Status::Pending);
    }
}
