use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::route::RouteDefinition,
    session::{
        error::{SessionError, SessionErrorKind, TransmissionFailure},
        facade::TestSession,
        types::{ItemOccurrence, NavigationMode},
    },
    variables::{Variable, VariableSet},
};

/// Scripted candidate run: a route plus the steps to drive through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub navigation_mode: Option<NavigationMode>,
    pub route: RouteDefinition,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        json5::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayStep {
    EndAttempt {
        #[serde(default)]
        responses: Vec<Variable>,
    },
    MoveNext,
    MoveBack,
    JumpTo {
        position: usize,
    },
    Suspend,
    Resume,
    Terminate,
    /// Resend whatever the most recent failed transmission left undelivered.
    Retransmit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub recorded_attempts: usize,
    pub delivered_variables: usize,
    pub rejected_steps: Vec<(usize, SessionErrorKind)>,
}

/// Runs every step, collecting rejections instead of stopping at the first
/// one, the way a candidate would keep going after an error message.
pub fn run_steps(session: &mut TestSession, steps: Vec<ReplayStep>) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    let mut last_failure: Option<(ItemOccurrence, TransmissionFailure)> = None;

    for (index, step) in steps.into_iter().enumerate() {
        let carried = match (&step, &last_failure) {
            (ReplayStep::Retransmit, Some((_, failure))) => failure.delivered.len(),
            _ => 0,
        };
        let mut retransmitted = false;
        let outcome = match step {
            ReplayStep::EndAttempt { responses } => session
                .end_attempt(responses.into_iter().collect::<VariableSet>())
                .map(|report| {
                    summary.recorded_attempts += 1;
                    summary.delivered_variables += report.delivered.len();
                }),
            ReplayStep::MoveNext => session.move_next(),
            ReplayStep::MoveBack => session.move_back(),
            ReplayStep::JumpTo { position } => session.jump_to(position),
            ReplayStep::Suspend => session.suspend(),
            ReplayStep::Resume => session.resume(),
            ReplayStep::Terminate => session.terminate(),
            ReplayStep::Retransmit => match &last_failure {
                Some((item, failure)) => session.retransmit(item, failure).map(|report| {
                    summary.recorded_attempts += 1;
                    summary.delivered_variables += report.delivered.len() - carried;
                    retransmitted = true;
                }),
                None => {
                    tracing::warn!(target: "replay", step = index, "nothing_to_retransmit");
                    Ok(())
                }
            },
        };
        // A pending failure is settled only by a successful retransmit or
        // replaced by a newer transmission failure.
        if retransmitted {
            last_failure = None;
        }

        if let Err(err) = outcome {
            tracing::warn!(
                target: "replay",
                step = index,
                error_kind = ?err.kind(),
                answer_committed = err.is_answer_committed(),
                error = %err,
                "replay_step_rejected"
            );
            summary.rejected_steps.push((index, err.kind()));
            if let SessionError::ResultTransmission { item, failure } = err {
                summary.delivered_variables += failure.delivered.len() - carried;
                last_failure = Some((item, failure));
            }
        }
    }

    summary
}
