//! Debounced autosave coordinator.
//!
//! Coalesces bursts of "document changed" signals into a single call to a
//! [`SaveSink`] once the document has been quiet for the configured period,
//! and exposes save status for UI feedback.
//!
//! Lifecycle of one request:
//!
//! ```text
//! Idle ──trigger──▶ Pending ──quiet period──▶ Saving ──grace period──▶ Idle
//!                    ▲    │
//!                    └────┘ trigger (previous request dropped)
//! ```
//!
//! Only a request still in `Pending` can be dropped. Once a request has been
//! handed to the sink its task is released from the coordinator, so a later
//! trigger cannot stop it from recording `last_saved_at`.
//!
//! In [`CompletionMode::GracePeriod`] the save is launched as a detached task
//! and never joined: `is_saving` flips back after a fixed estimate
//! (quiet period + [`GRACE_PERIOD`]), not after the save actually finishes.
//! A slow save can therefore still be in flight while the status reads idle.
//! [`CompletionMode::AwaitSave`] ties the status to the real outcome instead.
#![allow(dead_code)]

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Default quiet period before a pending save fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// Extra delay after a save fires before the status is reset (grace-period mode).
pub const GRACE_PERIOD: Duration = Duration::from_millis(100);

// ────────────────────────────────────────────────────────────────────────────
// Sink trait
// ────────────────────────────────────────────────────────────────────────────

/// Persistence target for coalesced save requests.
///
/// The coordinator never inspects the request; it hands over whatever the
/// caller passed to the last `trigger` of a quiet window.
#[async_trait]
pub trait SaveSink<T: Send + 'static>: Send + Sync {
    async fn save(&self, request: T) -> Result<(), AppError>;
}

/// Adapts an async closure into a [`SaveSink`].
pub struct FnSink<F, T> {
    f: F,
    _request: PhantomData<fn(T)>,
}

#[async_trait]
impl<F, Fut, T> SaveSink<T> for FnSink<F, T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    async fn save(&self, request: T) -> Result<(), AppError> {
        (self.f)(request).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Status
// ────────────────────────────────────────────────────────────────────────────

/// How the coordinator decides that a save is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Fire-and-forget; status resets [`GRACE_PERIOD`] after the save fires.
    #[default]
    GracePeriod,
    /// Status resets when the save future resolves; failures are recorded.
    AwaitSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutosavePhase {
    Idle,
    Pending,
    Saving,
}

/// Snapshot of a coordinator's state, shaped for the editor's save indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveStatus {
    pub phase: AutosavePhase,
    pub is_saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub quiet_period_ms: u64,
}

impl AutosaveStatus {
    pub fn idle(quiet_period: Duration) -> Self {
        Self {
            phase: AutosavePhase::Idle,
            is_saving: false,
            last_saved_at: None,
            last_error: None,
            quiet_period_ms: duration_ms(quiet_period),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Coordinator
// ────────────────────────────────────────────────────────────────────────────

struct CoordinatorState {
    /// The scheduled save still waiting out its quiet period, if any.
    pending: Option<JoinHandle<()>>,
    /// Bumped on every trigger; scheduled tasks only touch status while current.
    generation: u64,
    phase: AutosavePhase,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Debounces save requests of type `T` into at most one save per quiet window.
///
/// `trigger` spawns onto the ambient Tokio runtime and must be called from
/// within one.
pub struct AutosaveCoordinator<T: Send + 'static> {
    sink: Arc<dyn SaveSink<T>>,
    quiet_period: Duration,
    mode: CompletionMode,
    state: Arc<Mutex<CoordinatorState>>,
}

impl<T: Send + 'static> AutosaveCoordinator<T> {
    pub fn new(sink: Arc<dyn SaveSink<T>>, quiet_period: Duration) -> Self {
        Self {
            sink,
            quiet_period,
            mode: CompletionMode::default(),
            state: Arc::new(Mutex::new(CoordinatorState {
                pending: None,
                generation: 0,
                phase: AutosavePhase::Idle,
                last_saved_at: None,
                last_error: None,
            })),
        }
    }

    /// Builds a coordinator around a plain async closure.
    pub fn from_fn<F, Fut>(f: F, quiet_period: Duration) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let sink = FnSink {
            f,
            _request: PhantomData,
        };
        Self::new(Arc::new(sink), quiet_period)
    }

    pub fn with_mode(mut self, mode: CompletionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedules `request` to be saved once no further trigger arrives for a
    /// full quiet period. Any request still waiting is dropped unsaved.
    pub fn trigger(&self, request: T) {
        let mut state = lock(&self.state);

        state.generation += 1;
        let generation = state.generation;
        state.phase = AutosavePhase::Pending;

        if let Some(previous) = state.pending.take() {
            // Still inside its quiet period, so nothing has reached the sink yet.
            previous.abort();
            debug!("Autosave coalesced, generation {generation} supersedes pending request");
        }

        let scheduled = ScheduledSave {
            sink: Arc::clone(&self.sink),
            state: Arc::clone(&self.state),
            generation,
            quiet_period: self.quiet_period,
            mode: self.mode,
        };
        state.pending = Some(tokio::spawn(scheduled.run(request)));
    }

    pub fn last_save_time(&self) -> Option<DateTime<Utc>> {
        lock(&self.state).last_saved_at
    }

    pub fn is_auto_saving(&self) -> bool {
        lock(&self.state).phase != AutosavePhase::Idle
    }

    pub fn status(&self) -> AutosaveStatus {
        let state = lock(&self.state);
        AutosaveStatus {
            phase: state.phase,
            is_saving: state.phase != AutosavePhase::Idle,
            last_saved_at: state.last_saved_at,
            last_error: state.last_error.clone(),
            quiet_period_ms: duration_ms(self.quiet_period()),
        }
    }
}

/// One scheduled invocation of the sink. Aborted by the next trigger while it
/// is still waiting out the quiet period.
struct ScheduledSave<T: Send + 'static> {
    sink: Arc<dyn SaveSink<T>>,
    state: Arc<Mutex<CoordinatorState>>,
    generation: u64,
    quiet_period: Duration,
    mode: CompletionMode,
}

impl<T: Send + 'static> ScheduledSave<T> {
    async fn run(self, request: T) {
        tokio::time::sleep(self.quiet_period).await;

        {
            let mut state = lock(&self.state);
            if state.generation != self.generation {
                return;
            }
            state.phase = AutosavePhase::Saving;
            // Past this point the next trigger must not abort this task.
            state.pending = None;
        }
        debug!("Autosave firing for generation {}", self.generation);

        let sink = Arc::clone(&self.sink);
        match self.mode {
            CompletionMode::GracePeriod => {
                // Detached and never joined.
                tokio::spawn(async move {
                    if let Err(e) = sink.save(request).await {
                        warn!("Autosave failed: {e}");
                    }
                });
                tokio::time::sleep(GRACE_PERIOD).await;
                self.finish(Ok(()));
            }
            CompletionMode::AwaitSave => {
                let outcome = sink.save(request).await.map_err(|e| e.to_string());
                if let Err(e) = &outcome {
                    warn!("Autosave failed: {e}");
                }
                self.finish(outcome);
            }
        }
    }

    /// Records the outcome of a fired save. A superseded generation still
    /// records its timestamp or error, but the phase belongs to the newest one.
    fn finish(&self, outcome: Result<(), String>) {
        let mut state = lock(&self.state);
        match outcome {
            Ok(()) => {
                state.last_saved_at = Some(Utc::now());
                state.last_error = None;
            }
            Err(e) => state.last_error = Some(e),
        }
        if state.generation == self.generation {
            state.phase = AutosavePhase::Idle;
        }
    }
}

/// The state holds no invariant a panicking holder could break halfway, so a
/// poisoned lock is still usable.
fn lock(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
