//! Analysis session state machine.
//!
//! One classification attempt moves `Idle -> Running -> Succeeded | Failed`.
//! [`transition`] is the pure state function; [`AnalysisSession`] wraps it with
//! the attempt bookkeeping that keeps at most one request in flight.

use crate::error::AnalysisError;
use crate::model::{AnalysisResult, ImageFile};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Running,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisState::Running)
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Succeeded(_) | AnalysisState::Failed(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisState::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            AnalysisState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn label(&self) -> StateLabel {
        match self {
            AnalysisState::Idle => StateLabel::Idle,
            AnalysisState::Running => StateLabel::Running,
            AnalysisState::Succeeded(_) => StateLabel::Succeeded,
            AnalysisState::Failed(_) => StateLabel::Failed,
        }
    }
}

/// Payload-free name of a state, for logs and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateLabel {
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    Start { has_file: bool },
    Finished(Result<AnalysisResult, AnalysisError>),
    Reset,
}

/// Pure transition function: `(state, event) -> next state`.
///
/// `Start` while `Running` keeps `Running`; a `Finished` outside `Running`
/// leaves the state untouched.
pub fn transition(state: &AnalysisState, event: SessionEvent) -> AnalysisState {
    match (state, event) {
        (AnalysisState::Running, SessionEvent::Start { .. }) => AnalysisState::Running,
        (_, SessionEvent::Start { has_file: false }) => {
            AnalysisState::Failed(AnalysisError::NoFileSelected)
        }
        (_, SessionEvent::Start { has_file: true }) => AnalysisState::Running,
        (AnalysisState::Running, SessionEvent::Finished(Ok(result))) => {
            AnalysisState::Succeeded(result)
        }
        (AnalysisState::Running, SessionEvent::Finished(Err(err))) => AnalysisState::Failed(err),
        (other, SessionEvent::Finished(_)) => other.clone(),
        (_, SessionEvent::Reset) => AnalysisState::Idle,
    }
}

/// What the caller must do after [`AnalysisSession::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Issue exactly one request, tagged with this attempt id.
    Dispatch(u64),
    /// No file: the session is already `Failed`, nothing to send.
    Rejected,
    /// A request is already in flight; nothing changed.
    Ignored,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: AnalysisState,
    attempt: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn start(&mut self, file: Option<&ImageFile>) -> StartOutcome {
        if self.is_running() {
            tracing::debug!(attempt = self.attempt, "analysis already running, ignoring start");
            return StartOutcome::Ignored;
        }

        self.state = transition(
            &self.state,
            SessionEvent::Start {
                has_file: file.is_some(),
            },
        );

        match self.state {
            AnalysisState::Running => {
                self.attempt += 1;
                tracing::info!(attempt = self.attempt, "analysis started");
                StartOutcome::Dispatch(self.attempt)
            }
            _ => {
                tracing::info!("analysis requested without a selected image");
                StartOutcome::Rejected
            }
        }
    }

    /// Apply the outcome of the request tagged `attempt`.
    ///
    /// Returns `false` when the outcome belongs to an attempt that was reset or
    /// superseded; the session is left unchanged in that case.
    pub fn complete(
        &mut self,
        attempt: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if !self.is_running() || attempt != self.attempt {
            tracing::warn!(
                attempt,
                current = self.attempt,
                state = ?self.state.label(),
                "discarding stale analysis outcome"
            );
            return false;
        }

        if let Err(err) = &outcome {
            tracing::warn!(attempt, error = %err, "analysis failed");
        } else {
            tracing::info!(attempt, "analysis succeeded");
        }
        self.state = transition(&self.state, SessionEvent::Finished(outcome));
        true
    }

    pub fn reset(&mut self) {
        self.state = transition(&self.state, SessionEvent::Reset);
    }
}
