//! Debate coordinator: a fixed three-round protocol.
//!
//! Rounds progress only forward: initial -> cross_review -> synthesis, after
//! which the project is completed. The only automatic transition is the flip
//! from initial to cross_review once every debater has submitted a position.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::CoordinationError;
use crate::model::{Debater, Project, ProjectBody, ProjectStatus, Status};

/// Actions accepted by the `round` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    Start,
    Collect,
    CrossReview,
    Synthesize,
}

impl FromStr for RoundAction {
    type Err = CoordinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(RoundAction::Start),
            "collect" => Ok(RoundAction::Collect),
            "cross-review" | "cross_review" => Ok(RoundAction::CrossReview),
            "synthesize" => Ok(RoundAction::Synthesize),
            other => Err(CoordinationError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// The merged debate artifact stored in the synthesis round.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisArtifact {
    pub initial_positions: BTreeMap<String, String>,
    pub cross_reviews: BTreeMap<String, String>,
    pub synthesized_at: DateTime<Utc>,
}

/// What a round action did, for the caller to report.
#[derive(Debug)]
pub enum RoundOutcome {
    Started,
    Collected { agent: String, all_in: bool },
    CrossReviewStarted { outputs: BTreeMap<String, String> },
    Synthesized(SynthesisArtifact),
}

/// Register a debater on a debate project.
pub fn add_debater(
    project: &mut Project,
    agent_id: &str,
    role: &str,
) -> Result<(), CoordinationError> {
    let actual = project.mode();
    let ProjectBody::Debate { debaters, .. } = &mut project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "add-debater",
            required: "debate",
            actual,
        });
    };
    debaters.insert(agent_id.to_string(), Debater::new(role));
    project.touch();
    Ok(())
}

/// Drive the debate state machine one action forward.
pub fn round(
    project: &mut Project,
    action: &str,
    agent_id: Option<&str>,
    output: Option<&str>,
) -> Result<RoundOutcome, CoordinationError> {
    let action: RoundAction = action.parse()?;
    let actual = project.mode();
    let ProjectBody::Debate { rounds, debaters } = &mut project.body else {
        return Err(CoordinationError::ModeMismatch {
            operation: "round",
            required: "debate",
            actual,
        });
    };

    let outcome = match action {
        RoundAction::Start => {
            rounds.initial.status = Status::InProgress;
            RoundOutcome::Started
        }
        RoundAction::Collect => {
            let agent = agent_id.ok_or(CoordinationError::MissingArgument {
                action: "collect",
                argument: "agent_id",
            })?;
            let output = output.ok_or(CoordinationError::MissingArgument {
                action: "collect",
                argument: "output",
            })?;
            let debater =
                debaters
                    .get_mut(agent)
                    .ok_or_else(|| CoordinationError::DebaterNotFound {
                        agent: agent.to_string(),
                    })?;
            debater.position = output.to_string();
            debater.status = Status::Done;
            rounds
                .initial
                .outputs
                .insert(agent.to_string(), output.to_string());

            let all_in = debaters.values().all(|d| d.status == Status::Done);
            if all_in {
                rounds.initial.status = Status::Done;
                rounds.cross_review.status = Status::InProgress;
                tracing::debug!(project = %project.id, "all positions collected, cross-review open");
            }
            RoundOutcome::Collected {
                agent: agent.to_string(),
                all_in,
            }
        }
        RoundAction::CrossReview => {
            rounds.cross_review.outputs = rounds.initial.outputs.clone();
            rounds.cross_review.status = Status::InProgress;
            rounds.initial.status = Status::Done;
            RoundOutcome::CrossReviewStarted {
                outputs: rounds.cross_review.outputs.clone(),
            }
        }
        RoundAction::Synthesize => {
            let artifact = SynthesisArtifact {
                initial_positions: rounds.initial.outputs.clone(),
                cross_reviews: rounds.cross_review.outputs.clone(),
                synthesized_at: Utc::now(),
            };
            rounds.synthesis.output = serde_json::to_string(&artifact)
                .map_err(|e| CoordinationError::Other(e.into()))?;
            rounds.synthesis.status = Status::Done;
            project.status = ProjectStatus::Completed;
            RoundOutcome::Synthesized(artifact)
        }
    };
    project.touch();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mode;

    fn two_debaters() -> Project {
        let mut p = Project::new("d1", "pick a database", Mode::Debate, &[], &[], None);
        add_debater(&mut p, "optimist", "for").unwrap();
        add_debater(&mut p, "skeptic", "against").unwrap();
        p
    }

    fn rounds(p: &Project) -> &crate::model::DebateRounds {
        let ProjectBody::Debate { rounds, .. } = &p.body else {
            panic!("expected debate body");
        };
        rounds
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut p = two_debaters();
        let err = round(&mut p, "escalate", None, None).unwrap_err();
        assert!(matches!(err, CoordinationError::UnknownAction { .. }));
    }

    #[test]
    fn start_marks_initial_in_progress() {
        let mut p = two_debaters();
        round(&mut p, "start", None, None).unwrap();
        assert_eq!(rounds(&p).initial.status, Status::InProgress);
    }

    #[test]
    fn collect_requires_agent_and_output() {
        let mut p = two_debaters();
        let err = round(&mut p, "collect", Some("optimist"), None).unwrap_err();
        assert!(matches!(err, CoordinationError::MissingArgument { .. }));
        let err = round(&mut p, "collect", None, Some("text")).unwrap_err();
        assert!(matches!(err, CoordinationError::MissingArgument { .. }));
    }

    #[test]
    fn collect_unknown_debater_fails() {
        let mut p = two_debaters();
        let err = round(&mut p, "collect", Some("ghost"), Some("text")).unwrap_err();
        assert!(matches!(err, CoordinationError::DebaterNotFound { .. }));
    }

    #[test]
    fn initial_flips_only_after_every_debater_submits() {
        let mut p = two_debaters();
        round(&mut p, "start", None, None).unwrap();

        round(&mut p, "collect", Some("optimist"), Some("use postgres")).unwrap();
        assert_eq!(rounds(&p).initial.status, Status::InProgress);
        assert_eq!(rounds(&p).cross_review.status, Status::Pending);

        round(&mut p, "collect", Some("skeptic"), Some("use sqlite")).unwrap();
        assert_eq!(rounds(&p).initial.status, Status::Done);
        assert_eq!(rounds(&p).cross_review.status, Status::InProgress);
    }

    #[test]
    fn cross_review_copies_initial_outputs() {
        let mut p = two_debaters();
        round(&mut p, "start", None, None).unwrap();
        round(&mut p, "collect", Some("optimist"), Some("use postgres")).unwrap();
        round(&mut p, "cross-review", None, None).unwrap();

        let r = rounds(&p);
        assert_eq!(r.cross_review.outputs, r.initial.outputs);
        assert_eq!(r.initial.status, Status::Done);
        assert_eq!(r.cross_review.status, Status::InProgress);
    }

    #[test]
    fn synthesize_merges_positions_and_reviews_verbatim() {
        let mut p = two_debaters();
        round(&mut p, "start", None, None).unwrap();
        round(&mut p, "collect", Some("optimist"), Some("use postgres")).unwrap();
        round(&mut p, "collect", Some("skeptic"), Some("use sqlite")).unwrap();
        round(&mut p, "cross-review", None, None).unwrap();

        let outcome = round(&mut p, "synthesize", None, None).unwrap();
        let RoundOutcome::Synthesized(artifact) = outcome else {
            panic!("expected synthesis outcome");
        };
        assert_eq!(artifact.initial_positions["optimist"], "use postgres");
        assert_eq!(artifact.cross_reviews["skeptic"], "use sqlite");

        let r = rounds(&p);
        assert_eq!(r.synthesis.status, Status::Done);
        assert!(r.synthesis.output.contains("use postgres"));
        assert!(r.synthesis.output.contains("use sqlite"));
        assert_eq!(p.status, ProjectStatus::Completed);
    }

    #[test]
    fn synthesize_twice_is_content_idempotent_but_restamps() {
        let mut p = two_debaters();
        round(&mut p, "start", None, None).unwrap();
        round(&mut p, "collect", Some("optimist"), Some("a")).unwrap();
        round(&mut p, "collect", Some("skeptic"), Some("b")).unwrap();
        round(&mut p, "cross-review", None, None).unwrap();

        let first = match round(&mut p, "synthesize", None, None).unwrap() {
            RoundOutcome::Synthesized(a) => a,
            _ => panic!(),
        };
        let second = match round(&mut p, "synthesize", None, None).unwrap() {
            RoundOutcome::Synthesized(a) => a,
            _ => panic!(),
        };
        assert_eq!(first.initial_positions, second.initial_positions);
        assert_eq!(first.cross_reviews, second.cross_reviews);
        assert!(second.synthesized_at >= first.synthesized_at);
    }

    #[test]
    fn round_on_linear_project_is_mode_mismatch() {
        let mut p = Project::new("p1", "g", Mode::Linear, &["s".into()], &[], None);
        let err = round(&mut p, "start", None, None).unwrap_err();
        assert!(matches!(err, CoordinationError::ModeMismatch { .. }));
    }

    #[test]
    fn add_debater_on_dag_project_is_mode_mismatch() {
        let mut p = Project::new("p1", "g", Mode::Dag, &[], &[], None);
        let err = add_debater(&mut p, "a", "r").unwrap_err();
        assert!(matches!(err, CoordinationError::ModeMismatch { .. }));
    }
}
