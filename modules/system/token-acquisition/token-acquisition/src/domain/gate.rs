//! Completion gate.
//!
//! Turns the callback-based orchestrator into something a synchronous
//! caller can block on. The signal side can be cloned and handed around;
//! only the first `signal` is kept.
//!
//! ```ignore
//! let (signal, gate) = completion_gate();
//! client.acquire_silent(request, signal.completion_callback())?;
//! let result = gate.wait_timeout(Duration::from_secs(30));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use token_acquisition_sdk::{AcquisitionResult, CompletionCallback, TokenAcquisitionError};

struct Slot<T> {
    signalled: bool,
    value: Option<T>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Creates a connected signal/gate pair.
#[must_use]
pub fn completion_gate<T>() -> (CompletionSignal<T>, CompletionGate<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            signalled: false,
            value: None,
        }),
        ready: Condvar::new(),
    });
    (
        CompletionSignal {
            shared: Arc::clone(&shared),
        },
        CompletionGate { shared },
    )
}

/// Producer side of the gate.
pub struct CompletionSignal<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for CompletionSignal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> CompletionSignal<T> {
    /// Stores `value` and wakes the waiter.
    ///
    /// A signal that arrives after the waiter timed out is still accepted;
    /// the value is simply never observed.
    ///
    /// # Errors
    ///
    /// Returns `DoubleSignal` if the gate was already signalled. The stored
    /// value is left untouched.
    pub fn signal(&self, value: T) -> Result<(), TokenAcquisitionError> {
        let mut slot = self.shared.slot.lock();
        if slot.signalled {
            return Err(TokenAcquisitionError::DoubleSignal);
        }
        slot.signalled = true;
        slot.value = Some(value);
        drop(slot);
        self.shared.ready.notify_all();
        Ok(())
    }

    #[must_use]
    pub fn is_signalled(&self) -> bool {
        self.shared.slot.lock().signalled
    }
}

impl CompletionSignal<AcquisitionResult> {
    /// Adapts the signal into an orchestrator completion callback.
    #[must_use]
    pub fn completion_callback(&self) -> CompletionCallback {
        let signal = self.clone();
        Box::new(move |result| {
            if let Err(e) = signal.signal(result) {
                tracing::error!(error = %e, "Completion delivered to an already signalled gate");
            }
        })
    }
}

/// Outcome of a bounded wait.
#[derive(Debug)]
pub enum GateOutcome<T> {
    Signalled(T),
    TimedOut,
}

/// Consumer side of the gate. Waiting consumes it.
pub struct CompletionGate<T> {
    shared: Arc<Shared<T>>,
}

impl<T> CompletionGate<T> {
    /// Blocks the calling thread until the gate is signalled.
    ///
    /// Must not be called from an async context driving the run it waits
    /// for.
    pub fn wait(self) -> T {
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return value;
            }
            self.shared.ready.wait(&mut slot);
        }
    }

    /// Blocks until the gate is signalled or `timeout` elapses.
    pub fn wait_timeout(self, timeout: Duration) -> GateOutcome<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return GateOutcome::Signalled(self.wait());
        };

        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return GateOutcome::Signalled(value);
            }
            if self.shared.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot
                    .value
                    .take()
                    .map_or(GateOutcome::TimedOut, GateOutcome::Signalled);
            }
        }
    }
}
