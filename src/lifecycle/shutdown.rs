//! Shutdown coordination for the gateway.
//!
//! # State Machine
//! ```text
//! Running ──[terminate]──▶ Draining ──[in-flight == 0]──────▶ Stopped (clean)
//!                              └──────[deadline elapsed]────▶ Stopped (forced)
//! ```
//!
//! # Responsibilities
//! - Own the lifecycle state and the in-flight request counter
//! - Admit requests only while `Running`
//! - Cancel the accept loop when draining starts (sole writer of the token)
//! - Wait for the counter to reach zero, bounded by the drain deadline
//!
//! # Design Decisions
//! - Admission increments first and checks the state second, and draining
//!   flips the state first and reads the counter second (all `SeqCst`), so a
//!   request is either counted before the zero-check or refused
//! - Release is tied to a guard, so every exit path decrements exactly once
//! - States only move forward; a second drain waits for the first one's outcome

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::observability::metrics;

/// Process-wide lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Accepting connections and admitting requests.
    Running = 0,
    /// No new work; in-flight requests are finishing.
    Draining = 1,
    /// Terminal.
    Stopped = 2,
}

impl From<u8> for LifecycleState {
    fn from(val: u8) -> Self {
        match val {
            0 => LifecycleState::Running,
            1 => LifecycleState::Draining,
            _ => LifecycleState::Stopped,
        }
    }
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished before the deadline.
    Clean,
    /// The deadline elapsed with requests still running.
    Forced { abandoned: usize },
}

impl DrainOutcome {
    pub fn is_forced(&self) -> bool {
        matches!(self, DrainOutcome::Forced { .. })
    }

    /// Process exit status: success only for a clean drain.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_forced() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DrainOutcome::Clean => "clean",
            DrainOutcome::Forced { .. } => "forced",
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: AtomicU8,
    in_flight: AtomicUsize,
    /// Woken when the counter drops to zero.
    idle: Notify,
    /// Cancelled when draining starts.
    accept: CancellationToken,
    /// Cancelled once `Stopped` is reached.
    stopped: CancellationToken,
    /// Set by whichever caller runs the drain.
    drainer_elected: AtomicBool,
    outcome: OnceLock<DrainOutcome>,
    drain_timeout: Duration,
}

/// Coordinator for graceful shutdown.
///
/// Cheap to clone; all clones share one state machine.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    /// Create a coordinator in the `Running` state.
    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU8::new(LifecycleState::Running as u8),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                accept: CancellationToken::new(),
                stopped: CancellationToken::new(),
                drainer_elected: AtomicBool::new(false),
                outcome: OnceLock::new(),
                drain_timeout,
            }),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.load(Ordering::SeqCst).into()
    }

    /// Number of admitted requests that have not finished.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn drain_timeout(&self) -> Duration {
        self.inner.drain_timeout
    }

    /// Token cancelled when draining starts.
    ///
    /// Holders receive a child token: cancelling it does not start a drain.
    pub fn accept_token(&self) -> CancellationToken {
        self.inner.accept.child_token()
    }

    /// Register a request. Returns `None` once draining has started.
    pub fn try_admit(&self) -> Option<InFlightGuard> {
        let count = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
        };

        if self.state() == LifecycleState::Running {
            metrics::set_in_flight(count);
            Some(guard)
        } else {
            // Dropping the guard undoes the increment.
            None
        }
    }

    /// Move `Running → Draining` and stop the accept loop.
    ///
    /// Returns false if draining had already started.
    pub fn begin_drain(&self) -> bool {
        let began = self
            .inner
            .state
            .compare_exchange(
                LifecycleState::Running as u8,
                LifecycleState::Draining as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();

        if began {
            self.inner.accept.cancel();
            tracing::info!(
                in_flight = self.in_flight(),
                drain_timeout_secs = self.inner.drain_timeout.as_secs_f64(),
                "Shutdown started, no longer accepting requests"
            );
        }
        began
    }

    /// Drain in-flight requests and stop.
    ///
    /// Starts draining if needed, then waits until the counter reaches zero
    /// or the drain deadline elapses, whichever is first. Concurrent and
    /// repeated calls all return the outcome of the single drain.
    pub async fn drain(&self) -> DrainOutcome {
        self.begin_drain();

        if self.inner.drainer_elected.swap(true, Ordering::SeqCst) {
            return self.stopped().await;
        }

        let deadline = self.inner.drain_timeout;
        let outcome = match tokio::time::timeout(deadline, self.wait_idle()).await {
            Ok(()) => DrainOutcome::Clean,
            Err(_) => DrainOutcome::Forced {
                abandoned: self.in_flight(),
            },
        };

        self.finish(outcome);
        outcome
    }

    /// Wait until `Stopped` is reached and return how the drain ended.
    pub async fn stopped(&self) -> DrainOutcome {
        self.inner.stopped.cancelled().await;
        self.inner.outcome.get().copied().unwrap_or(DrainOutcome::Clean)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a decrement in between is not lost.
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self, outcome: DrainOutcome) {
        let _ = self.inner.outcome.set(outcome);
        self.inner
            .state
            .store(LifecycleState::Stopped as u8, Ordering::SeqCst);

        match outcome {
            DrainOutcome::Clean => {
                tracing::info!("All in-flight requests completed");
            }
            DrainOutcome::Forced { abandoned } => {
                tracing::warn!(
                    abandoned,
                    drain_timeout_secs = self.inner.drain_timeout.as_secs_f64(),
                    "Drain deadline elapsed, forcing shutdown"
                );
            }
        }
        metrics::record_shutdown(outcome.label());
        self.inner.stopped.cancel();
    }
}

/// Marks one admitted request. Decrements the counter when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let previous = self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        metrics::set_in_flight(previous.saturating_sub(1));
        if previous == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
