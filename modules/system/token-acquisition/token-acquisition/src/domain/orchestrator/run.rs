//! Per-run state owned by a single acquisition task.

use parking_lot::Mutex;
use token_acquisition_sdk::{
    AcquisitionResult, CompletionCallback, RunHandle, RunState, TokenAcquisitionError,
};
use tokio::sync::watch;
use uuid::Uuid;

/// Owns the run's state channel and its completion callback.
///
/// The callback is delivered at most once, by [`Run::complete`]. A run that
/// is dropped without completing, e.g. when its task is aborted, delivers an
/// `Internal` failure from `Drop`.
///
/// The callback sits behind a mutex so `&Run` stays `Send` across awaits;
/// it is only ever taken through `get_mut`.
pub(super) struct Run {
    id: Uuid,
    state: watch::Sender<RunState>,
    on_complete: Mutex<Option<CompletionCallback>>,
}

impl Run {
    pub(super) fn start(on_complete: CompletionCallback) -> (Self, RunHandle) {
        let id = Uuid::new_v4();
        let (state, receiver) = watch::channel(RunState::Created);
        let run = Self {
            id,
            state,
            on_complete: Mutex::new(Some(on_complete)),
        };
        (run, RunHandle::new(id, receiver))
    }

    pub(super) fn id(&self) -> Uuid {
        self.id
    }

    pub(super) fn advance(&self, next: RunState) {
        tracing::trace!(run_id = %self.id, state = ?next, "Run state changed");
        self.state.send_replace(next);
    }

    pub(super) fn complete(mut self, result: AcquisitionResult) {
        self.deliver(result);
    }

    fn deliver(&mut self, result: AcquisitionResult) {
        let Some(on_complete) = self.on_complete.get_mut().take() else {
            return;
        };
        let kind = result.kind();
        on_complete(result);
        // Published after the callback so observers of `Completed` can rely
        // on the callback having run.
        self.state.send_replace(RunState::Completed(kind));
        tracing::debug!(run_id = %self.id, kind = ?kind, "Run completed");
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        if self.on_complete.get_mut().is_some() {
            tracing::error!(run_id = %self.id, "Run dropped before completion");
            self.deliver(AcquisitionResult::Failed(TokenAcquisitionError::Internal(
                "run dropped before completion".to_owned(),
            )));
        }
    }
}
