//! Single-flight scheduling of analysis runs.
//!
//! At most one run executes at a time. While a run is in flight, an
//! explicit request is rejected and an automatic request takes the single
//! pending slot, replacing whatever was waiting there. When the run ends,
//! the pending request (if any) starts with its context.
//!
//! Must be used from within a tokio runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::{CancelFlag, SchedulerError};

/// Origin of an analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Invoked by the user; rejected while busy.
    Explicit,
    /// Fired by an edit or save; coalesced while busy.
    Automatic,
}

/// What happened to an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A run started.
    Started,
    /// The request waits for the in-flight run to finish.
    Queued,
}

type Job<C> = dyn Fn(C, CancelFlag) + Send + Sync;

struct State<C> {
    running: Option<CancelFlag>,
    pending: Option<C>,
    timers: usize,
}

impl<C> State<C> {
    fn is_idle(&self) -> bool {
        self.running.is_none() && self.pending.is_none() && self.timers == 0
    }
}

struct Inner<C> {
    job: Arc<Job<C>>,
    state: Mutex<State<C>>,
    idle: Notify,
    generation: AtomicU64,
    debounce: Duration,
}

/// Runs a blocking analysis job, one at a time.
pub struct AnalysisScheduler<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for AnalysisScheduler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + 'static> AnalysisScheduler<C> {
    /// Creates a scheduler for `job`.
    pub fn new(debounce: Duration, job: impl Fn(C, CancelFlag) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                job: Arc::new(job),
                state: Mutex::new(State {
                    running: None,
                    pending: None,
                    timers: 0,
                }),
                idle: Notify::new(),
                generation: AtomicU64::new(0),
                debounce,
            }),
        }
    }

    /// Requests a run with `ctx`.
    pub fn request(&self, trigger: Trigger, ctx: C) -> Result<RequestOutcome, SchedulerError> {
        let cancel = {
            let mut state = self.inner.state.lock();
            if state.running.is_some() {
                return match trigger {
                    Trigger::Explicit => {
                        info!("Analysis already running, request rejected");
                        Err(SchedulerError::Busy)
                    }
                    Trigger::Automatic => {
                        if state.pending.replace(ctx).is_some() {
                            debug!("Replaced pending analysis request");
                        }
                        Ok(RequestOutcome::Queued)
                    }
                };
            }
            let cancel = CancelFlag::new();
            state.running = Some(cancel.clone());
            cancel
        };

        self.spawn(ctx, cancel);
        Ok(RequestOutcome::Started)
    }

    /// Issues an automatic request once no trigger arrived for the debounce
    /// delay.
    pub fn trigger_debounced(&self, ctx: C) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.lock().timers += 1;

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.inner.debounce).await;

            if this.inner.generation.load(Ordering::SeqCst) == generation {
                // Automatic requests are never rejected.
                let _ = this.request(Trigger::Automatic, ctx);
            } else {
                debug!("Debounced trigger superseded");
            }

            let idle = {
                let mut state = this.inner.state.lock();
                state.timers -= 1;
                state.is_idle()
            };
            if idle {
                this.inner.idle.notify_waiters();
            }
        });
    }

    /// Cancels the in-flight run, if any. The job observes it at its next
    /// cancellation check.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.inner.state.lock().running {
            info!("Cancelling analysis");
            cancel.cancel();
        }
    }

    /// Returns true if a run is in flight.
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running.is_some()
    }

    /// Returns true if nothing is running, pending or waiting on a timer.
    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Resolves once the scheduler is idle.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn spawn(&self, ctx: C, cancel: CancelFlag) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut next = Some((ctx, cancel));

            while let Some((ctx, cancel)) = next.take() {
                let job = Arc::clone(&inner.job);
                if let Err(e) = tokio::task::spawn_blocking(move || job(ctx, cancel)).await {
                    error!("Analysis job failed: {}", e);
                }

                next = {
                    let mut state = inner.state.lock();
                    match state.pending.take() {
                        Some(ctx) => {
                            debug!("Starting coalesced analysis");
                            let cancel = CancelFlag::new();
                            state.running = Some(cancel.clone());
                            Some((ctx, cancel))
                        }
                        None => {
                            state.running = None;
                            None
                        }
                    }
                };
            }

            inner.idle.notify_waiters();
        });
    }
}
