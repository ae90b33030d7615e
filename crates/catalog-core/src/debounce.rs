// ── Filter debounce pipeline ──
//
// Raw filter edits are normalized into `FilterSnapshot`s. Only semantic
// changes arm the quiet-period timer, and a settled change produces one
// fetch of page 1. `DebounceMachine` is the pure state machine; the
// `FilterDebounce` task drives it from a channel and a timer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CatalogEntity, FilterEdit, FilterInput, FilterSnapshot};
use crate::store::{DomainCache, FetchOutcome};

const INPUT_CHANNEL_SIZE: usize = 64;

// ── FilterTarget ────────────────────────────────────────────────────

/// Something that can be re-queried with a new filter set.
#[async_trait]
pub trait FilterTarget: Send + Sync {
    /// Fetch page 1 with `filters`.
    async fn apply_filters(&self, filters: &FilterSnapshot) -> Result<FetchOutcome, CoreError>;
}

#[async_trait]
impl<T: CatalogEntity> FilterTarget for DomainCache<T> {
    async fn apply_filters(&self, filters: &FilterSnapshot) -> Result<FetchOutcome, CoreError> {
        self.fetch(1, filters).await
    }
}

// ── DebounceMachine ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    Idle,
    Pending { deadline: Instant },
}

/// What an edit did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEffect {
    /// No semantic change; any running timer keeps its deadline.
    Unchanged,
    /// The quiet-period timer was started or restarted.
    Armed { deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct DebounceMachine {
    quiet: Duration,
    input: FilterInput,
    current: FilterSnapshot,
    applied: FilterSnapshot,
    phase: DebouncePhase,
}

impl DebounceMachine {
    pub fn new(quiet: Duration) -> Self {
        Self::with_input(quiet, FilterInput::default())
    }

    /// Start from `input`, treating it as already applied.
    pub fn with_input(quiet: Duration, input: FilterInput) -> Self {
        let snapshot = input.snapshot();
        Self {
            quiet,
            input,
            current: snapshot.clone(),
            applied: snapshot,
            phase: DebouncePhase::Idle,
        }
    }

    pub fn phase(&self) -> DebouncePhase {
        self.phase
    }

    pub fn current(&self) -> &FilterSnapshot {
        &self.current
    }

    pub fn applied(&self) -> &FilterSnapshot {
        &self.applied
    }

    pub fn input(&self) -> &FilterInput {
        &self.input
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            DebouncePhase::Idle => None,
            DebouncePhase::Pending { deadline } => Some(deadline),
        }
    }

    pub fn edit(&mut self, edit: FilterEdit, now: Instant) -> EditEffect {
        self.input.apply(edit);
        let next = self.input.snapshot();
        if next == self.current {
            return EditEffect::Unchanged;
        }
        self.current = next;

        // Landing back on the applied snapshot is not a change either; a
        // running timer keeps its deadline and expires without fetching.
        if self.current == self.applied {
            return EditEffect::Unchanged;
        }
        let deadline = now + self.quiet;
        self.phase = DebouncePhase::Pending { deadline };
        EditEffect::Armed { deadline }
    }

    /// Timer fired. Returns the snapshot to fetch, or `None` if the edits
    /// settled back on the applied snapshot.
    pub fn expire(&mut self) -> Option<FilterSnapshot> {
        self.phase = DebouncePhase::Idle;
        if self.current == self.applied {
            return None;
        }
        self.applied = self.current.clone();
        Some(self.current.clone())
    }

    /// Explicit search: cancel the timer and fetch the current snapshot.
    pub fn search_now(&mut self) -> FilterSnapshot {
        self.phase = DebouncePhase::Idle;
        self.applied = self.current.clone();
        self.current.clone()
    }
}

// ── FilterDebounce task ─────────────────────────────────────────────

enum DebounceInput {
    Edit(FilterEdit),
    Search,
}

/// Handle to a running debounce pipeline bound to one [`FilterTarget`].
///
/// Fetches are awaited inside the pipeline task, so at most one fetch
/// issued by the pipeline is in flight at a time.
pub struct FilterDebounce {
    tx: mpsc::Sender<DebounceInput>,
    applied: watch::Receiver<FilterSnapshot>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl FilterDebounce {
    pub fn spawn(target: Arc<dyn FilterTarget>, quiet: Duration) -> Self {
        Self::spawn_with(target, DebounceMachine::new(quiet), CancellationToken::new())
    }

    /// Spawn with an explicit machine and a cancellation token (usually a
    /// child of the owning facade's token).
    pub fn spawn_with(
        target: Arc<dyn FilterTarget>,
        machine: DebounceMachine,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_SIZE);
        let (applied_tx, applied) = watch::channel(machine.applied().clone());
        let handle = tokio::spawn(run_pipeline(
            target,
            machine,
            rx,
            applied_tx,
            cancel.clone(),
        ));
        Self {
            tx,
            applied,
            cancel,
            handle,
        }
    }

    pub async fn edit(&self, edit: FilterEdit) -> Result<(), CoreError> {
        self.send(DebounceInput::Edit(edit)).await
    }

    /// Bypass the quiet period and fetch immediately.
    pub async fn search(&self) -> Result<(), CoreError> {
        self.send(DebounceInput::Search).await
    }

    /// Last snapshot handed to the target.
    pub fn applied(&self) -> FilterSnapshot {
        self.applied.borrow().clone()
    }

    pub fn subscribe_applied(&self) -> watch::Receiver<FilterSnapshot> {
        self.applied.clone()
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "filter debounce task ended abnormally");
        }
    }

    async fn send(&self, input: DebounceInput) -> Result<(), CoreError> {
        self.tx
            .send(input)
            .await
            .map_err(|_| CoreError::Internal("filter debounce pipeline has stopped".into()))
    }
}

async fn run_pipeline(
    target: Arc<dyn FilterTarget>,
    mut machine: DebounceMachine,
    mut rx: mpsc::Receiver<DebounceInput>,
    applied_tx: watch::Sender<FilterSnapshot>,
    cancel: CancellationToken,
) {
    loop {
        let deadline = machine.deadline();
        let to_fetch = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            input = rx.recv() => match input {
                Some(DebounceInput::Edit(edit)) => {
                    if let EditEffect::Armed { .. } = machine.edit(edit, Instant::now()) {
                        debug!(changed = ?machine.current().changed_fields(machine.applied()), "filter change, timer armed");
                    }
                    None
                }
                Some(DebounceInput::Search) => Some(machine.search_now()),
                None => break,
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let snapshot = machine.expire();
                if snapshot.is_none() {
                    debug!("filters settled on the applied snapshot, nothing to fetch");
                }
                snapshot
            }
        };

        let Some(snapshot) = to_fetch else {
            continue;
        };
        applied_tx.send_replace(snapshot.clone());
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = target.apply_filters(&snapshot) => {
                if let Err(err) = result {
                    warn!(error = %err, "filtered fetch failed");
                }
            }
        }
    }
    debug!("filter debounce pipeline stopped");
}
