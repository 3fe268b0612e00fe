//! Debounced, coalescing rebuild requests.
//!
//! Parameter changes (K, method) arrive in bursts from the UI. The
//! controller runs at most one rebuild at a time and keeps at most one
//! value waiting:
//!
//! ```text
//!            request                      request
//!   Idle ───────────────▶ Rebuilding ───────────────▶ RebuildingWithPending(v)
//!    ▲                     │      ▲                       │
//!    └──── done ───────────┘      └──── done, run v ──────┘
//! ```
//!
//! A request that arrives while idle but within the debounce window of the
//! last applied change is deferred until the window closes. Later requests
//! in the window replace the deferred value.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use utoipa::ToSchema;

/// Externally visible controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RebuildState {
    Idle,
    Rebuilding,
    RebuildingWithPending,
}

/// What happened to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A rebuild started right away
    Started,
    /// Queued behind the running rebuild, replacing any earlier pending value
    Pending,
    /// Held until the debounce window closes
    Deferred,
}

enum State<T> {
    Idle,
    Rebuilding,
    RebuildingWithPending(T),
}

struct Inner<T> {
    state: State<T>,
    last_applied: Option<Instant>,
    deferred: Option<T>,
    timer_armed: bool,
    latest: Option<T>,
}

type ApplyFn<T> = dyn Fn(T) + Send + Sync;

/// Runs `apply` for requested values, one at a time, with debounce
pub struct ReconfigurationController<T> {
    inner: Arc<Mutex<Inner<T>>>,
    apply: Arc<ApplyFn<T>>,
    window: Duration,
}

impl<T> Clone for ReconfigurationController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            apply: self.apply.clone(),
            window: self.window,
        }
    }
}

impl<T: Clone + Send + 'static> ReconfigurationController<T> {
    /// `apply` is blocking and runs on the blocking thread pool.
    pub fn new(window: Duration, apply: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: State::Idle,
                last_applied: None,
                deferred: None,
                timer_armed: false,
                latest: None,
            })),
            apply: Arc::new(apply),
            window,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Submit a value. Must be called from within a Tokio runtime.
    pub fn request(&self, value: T) -> RequestOutcome {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.latest = Some(value.clone());

        if !matches!(inner.state, State::Idle) {
            inner.state = State::RebuildingWithPending(value);
            tracing::debug!("Rebuild in progress, request queued as pending");
            return RequestOutcome::Pending;
        }

        let deadline = inner
            .last_applied
            .map(|t| t + self.window)
            .filter(|d| *d > Instant::now());
        if let Some(deadline) = deadline {
            inner.deferred = Some(value);
            if !inner.timer_armed {
                inner.timer_armed = true;
                self.arm_timer(deadline);
            }
            tracing::debug!("Request inside debounce window, deferred");
            return RequestOutcome::Deferred;
        }

        inner.deferred = None;
        inner.state = State::Rebuilding;
        drop(guard);
        self.spawn_run(value);
        RequestOutcome::Started
    }

    /// Current state as seen from outside
    pub fn state(&self) -> RebuildState {
        match self.lock().state {
            State::Idle => RebuildState::Idle,
            State::Rebuilding => RebuildState::Rebuilding,
            State::RebuildingWithPending(_) => RebuildState::RebuildingWithPending,
        }
    }

    /// True when nothing is running, pending or deferred
    pub fn is_settled(&self) -> bool {
        let inner = self.lock();
        matches!(inner.state, State::Idle) && inner.deferred.is_none()
    }

    /// Most recently requested value, applied or not
    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    fn spawn_run(&self, first: T) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut next = first;
            loop {
                let apply = this.apply.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || apply(next)).await {
                    tracing::error!(%e, "Rebuild task failed");
                }

                let mut inner = this.lock();
                inner.last_applied = Some(Instant::now());
                match std::mem::replace(&mut inner.state, State::Idle) {
                    State::RebuildingWithPending(value) => {
                        inner.state = State::Rebuilding;
                        next = value;
                    }
                    State::Rebuilding | State::Idle => break,
                }
            }
        });
    }

    fn arm_timer(&self, deadline: Instant) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut deadline = deadline;
            loop {
                tokio::time::sleep_until(deadline.into()).await;

                let mut guard = this.lock();
                let inner = &mut *guard;
                // A rebuild finished while we slept; the window moved.
                if let Some(later) = inner
                    .last_applied
                    .map(|t| t + this.window)
                    .filter(|d| *d > Instant::now())
                {
                    deadline = later;
                    continue;
                }

                inner.timer_armed = false;
                let Some(value) = inner.deferred.take() else {
                    break;
                };
                if matches!(inner.state, State::Idle) {
                    inner.state = State::Rebuilding;
                    drop(guard);
                    tracing::debug!("Debounce window closed, applying deferred request");
                    this.spawn_run(value);
                } else {
                    inner.state = State::RebuildingWithPending(value);
                }
                break;
            }
        });
    }
}
