//! Analysis lifecycle controller.
//!
//! Owns the selection manager and analysis session, dispatches at most one
//! `/predict` request at a time, and emits snapshots for presentation layers.

use crate::engine::DetectorClient;
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, AppEvent, FileSummary, ImageFile, InfoEvent, SessionSnapshot};
use crate::selection::SelectionManager;
use crate::session::{AnalysisSession, StartOutcome};
use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Select(PathBuf),
    Analyze,
    Reset,
    Quit,
}

/// The request currently on the wire.
struct InFlight {
    attempt: u64,
    handle: JoinHandle<Result<AnalysisResult, AnalysisError>>,
}

impl InFlight {
    fn abort(self) {
        tracing::info!(attempt = self.attempt, "aborting in-flight analysis request");
        self.handle.abort();
    }
}

fn snapshot(selection: &SelectionManager, session: &AnalysisSession) -> SessionSnapshot {
    SessionSnapshot {
        file: selection.file().map(FileSummary::from),
        preview: selection.preview().cloned(),
        state: session.state().clone(),
    }
}

fn publish(
    event_tx: &UnboundedSender<AppEvent>,
    selection: &SelectionManager,
    session: &AnalysisSession,
) {
    let _ = event_tx.send(AppEvent::Snapshot(Box::new(snapshot(selection, session))));
}

fn cancel_in_flight(in_flight: &mut Option<InFlight>, event_tx: &UnboundedSender<AppEvent>) {
    if let Some(f) = in_flight.take() {
        f.abort();
        let _ = event_tx.send(AppEvent::Info(InfoEvent::Message(
            "Previous analysis cancelled".into(),
        )));
    }
}

fn dispatch(client: &DetectorClient, attempt: u64, file: ImageFile) -> InFlight {
    let client = client.clone();
    let handle = tokio::spawn(async move { client.predict(&file).await });
    InFlight { attempt, handle }
}

/// Drive the session from UI commands until `Quit` or the command channel closes.
///
/// Reset, re-selection and quit abort the in-flight request, so a late answer
/// can never land on a newer selection.
pub(crate) async fn run_controller(
    client: DetectorClient,
    probe_health: bool,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut selection = SelectionManager::new();
    let mut session = AnalysisSession::new();
    let mut in_flight: Option<InFlight> = None;

    if probe_health {
        let client = client.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let info = match client.health().await {
                Ok(h) => InfoEvent::Health {
                    healthy: h.is_healthy(),
                    detail: h.message.unwrap_or(h.status),
                },
                Err(e) => InfoEvent::Health {
                    healthy: false,
                    detail: format!("{e:#}"),
                },
            };
            let _ = tx.send(AppEvent::Info(info));
        });
    }

    publish(&event_tx, &selection, &session);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Select(path)) => match ImageFile::load(&path) {
                        Ok(file) => {
                            cancel_in_flight(&mut in_flight, &event_tx);
                            selection.select_file(file, &mut session);
                            publish(&event_tx, &selection, &session);
                        }
                        Err(e) => {
                            tracing::info!(path = %path.display(), error = %e, "file rejected");
                            let _ = event_tx.send(AppEvent::Info(InfoEvent::FileRejected(e.to_string())));
                        }
                    },
                    Some(UiCommand::Analyze) => match session.start(selection.file()) {
                        StartOutcome::Dispatch(attempt) => {
                            if let Some(file) = selection.file().cloned() {
                                in_flight = Some(dispatch(&client, attempt, file));
                            }
                            publish(&event_tx, &selection, &session);
                        }
                        StartOutcome::Rejected => publish(&event_tx, &selection, &session),
                        StartOutcome::Ignored => {
                            let _ = event_tx.send(AppEvent::Info(InfoEvent::RequestIgnored));
                        }
                    },
                    Some(UiCommand::Reset) => {
                        cancel_in_flight(&mut in_flight, &event_tx);
                        selection.reset(&mut session);
                        publish(&event_tx, &selection, &session);
                    }
                    Some(UiCommand::Quit) | None => {
                        cancel_in_flight(&mut in_flight, &event_tx);
                        break;
                    }
                }
            }
            // Keep the JoinHandle in place until this branch wins; taking it early
            // would drop it whenever the command branch is chosen instead.
            done = async {
                if let Some(f) = in_flight.as_mut() {
                    return Some((f.attempt, (&mut f.handle).await));
                }
                futures::future::pending().await
            } => {
                if let Some((attempt, join_res)) = done {
                    in_flight = None;
                    let outcome = join_res.unwrap_or_else(|e| {
                        Err(AnalysisError::Transport(format!("request task failed: {e}")))
                    });
                    if session.complete(attempt, outcome) {
                        publish(&event_tx, &selection, &session);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Select `file` (if any) and run a single analysis to its terminal state.
pub(crate) async fn analyze_once(
    client: &DetectorClient,
    file: Option<ImageFile>,
) -> SessionSnapshot {
    let mut selection = SelectionManager::new();
    let mut session = AnalysisSession::new();
    if let Some(file) = file {
        selection.select_file(file, &mut session);
    }

    if let StartOutcome::Dispatch(attempt) = session.start(selection.file()) {
        let outcome = match selection.file() {
            Some(file) => client.predict(file).await,
            None => Err(AnalysisError::NoFileSelected),
        };
        session.complete(attempt, outcome);
    }

    snapshot(&selection, &session)
}
