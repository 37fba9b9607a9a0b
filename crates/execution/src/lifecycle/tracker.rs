//! Append-only event log and lifecycle state holder for one run.

use super::events::{LifecycleEvent, Stage};
use super::state::LifecycleState;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info};

/// Records progress events in order and fans them out to subscribers.
///
/// One tracker covers one invocation; the state machine starts at
/// [`LifecycleState::Idle`] and is never reset. Use [`Self::fork`] to start
/// the next invocation with the same subscribers.
pub struct LifecycleTracker {
    /// Events in emission order.
    events: Arc<RwLock<Vec<LifecycleEvent>>>,
    /// Current lifecycle state.
    state: Arc<RwLock<LifecycleState>>,
    /// Live listeners; closed receivers are pruned on the next send.
    subscribers: Arc<RwLock<Vec<mpsc::UnboundedSender<LifecycleEvent>>>>,
}

impl LifecycleTracker {
    /// Creates a new lifecycle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            state: Arc::new(RwLock::new(LifecycleState::Idle)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fresh log in `IDLE` that reports to this tracker's subscribers,
    /// including ones added later.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            state: Arc::new(RwLock::new(LifecycleState::Idle)),
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Receives every event recorded from now on.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<LifecycleEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.write().await.push(tx);
        rx
    }

    /// Appends an event without touching the state machine.
    pub async fn record(&self, stage: Stage, detail: impl Into<String>) {
        let event = LifecycleEvent::new(stage, detail);
        debug!(stage = %event.stage, detail = %event.detail, "progress");
        self.add_event(event).await;
    }

    /// Moves the state machine to `next` and records the step.
    ///
    /// Illegal transitions are logged and ignored; the state is unchanged.
    pub async fn transition(&self, next: LifecycleState, detail: impl Into<String>) -> bool {
        let mut state = self.state.write().await;
        match state.advance(next) {
            Ok(new_state) => {
                *state = new_state;
                drop(state);
                let event = LifecycleEvent::new(Stage::Lifecycle(new_state), detail);
                info!(state = %new_state, detail = %event.detail, "lifecycle transition");
                self.add_event(event).await;
                true
            }
            Err(e) => {
                error!(error = %e, "rejected lifecycle transition");
                false
            }
        }
    }

    /// Enters `FAILED` unless the run has already finished.
    pub async fn fail(&self, detail: impl Into<String>) {
        let terminal = self.state.read().await.is_terminal();
        if !terminal {
            self.transition(LifecycleState::Failed, detail).await;
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// True once the run has left `IDLE`, i.e. chain mutation began.
    pub async fn mutation_started(&self) -> bool {
        !matches!(*self.state.read().await, LifecycleState::Idle)
    }

    /// Snapshot of all events so far.
    pub async fn events(&self) -> Vec<LifecycleEvent> {
        self.events.read().await.clone()
    }

    async fn add_event(&self, event: LifecycleEvent) {
        self.subscribers
            .write()
            .await
            .retain(|tx| tx.send(event.clone()).is_ok());
        self.events.write().await.push(event);
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}
