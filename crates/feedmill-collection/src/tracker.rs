//! Shared collection-progress state and the poll task that drives it.
//!
//! `CollectionTracker` is the one handle UI code needs: it owns the current
//! [`CollectionState`], publishes every change over a watch channel, and runs
//! at most one background poll task against the job-status endpoint. Handles
//! are cheap clones of the same tracker; independent trackers stay independent
//! (no process-wide singleton), so tests can construct as many as they like.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::CollectionClient;
use crate::error::CollectionError;
use crate::normalize::normalize;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::types::{CollectionState, CollectionStatus, JobProgress};

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

struct ActiveJob {
    job_id: String,
    token: CancellationToken,
}

struct Inner {
    client: CollectionClient,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    state_tx: watch::Sender<CollectionState>,
    // Serializes start/resume/cancel/finish transitions; at most one job.
    active: Mutex<Option<ActiveJob>>,
}

/// Tracks a single background collection job: start/cancel controls plus
/// live progress for any subscriber.
#[derive(Clone)]
pub struct CollectionTracker {
    inner: Arc<Inner>,
}

impl CollectionTracker {
    /// Create a tracker that logs its notifications and polls at the default
    /// interval.
    pub fn new(client: CollectionClient) -> Self {
        Self::with_options(client, Arc::new(LogNotifier), DEFAULT_POLL_INTERVAL)
    }

    /// Create a tracker with an explicit notifier and poll interval.
    pub fn with_options(
        client: CollectionClient,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(CollectionState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                notifier,
                poll_interval,
                state_tx,
                active: Mutex::new(None),
            }),
        }
    }

    /// Snapshot of the current collection state.
    pub fn state(&self) -> CollectionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes; every published snapshot is complete.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Whether a collection job is currently tracked.
    pub fn is_collecting(&self) -> bool {
        self.inner.state_tx.borrow().is_collecting
    }

    /// Id of the job currently being polled, if any.
    pub fn active_job_id(&self) -> Option<String> {
        self.inner.active.lock().as_ref().map(|job| job.job_id.clone())
    }

    /// Trigger a collection run and begin polling its status.
    ///
    /// A no-op while a job is already tracked: no second trigger request is
    /// issued. On trigger failure the tracker resets to idle, notifies the
    /// user, and returns the error.
    pub async fn start(&self) -> Result<(), CollectionError> {
        if !self.begin(JobProgress::pending_placeholder()) {
            debug!("collection already in progress, ignoring start");
            return Ok(());
        }

        match self.inner.client.trigger().await {
            Ok(resp) => {
                info!(job_id = %resp.job_id, "collection triggered");
                self.register_and_spawn(resp.job_id);
                Ok(())
            }
            Err(err) => {
                error!("failed to trigger collection: {}", err);
                // Back to idle; last_result is left alone.
                self.inner.state_tx.send_modify(|state| {
                    state.is_collecting = false;
                    state.job_progress = None;
                });
                self.inner.notifier.notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Resume polling a previously triggered job without a new trigger
    /// request. No-op while a job is already tracked. In-memory only; does
    /// not survive a process restart.
    pub fn resume(&self, job_id: &str) {
        if !self.begin(JobProgress::processing_placeholder(job_id)) {
            debug!("collection already in progress, ignoring resume");
            return;
        }
        info!(job_id, "resuming collection polling");
        self.register_and_spawn(job_id.to_string());
    }

    /// Stop polling and reset to idle.
    ///
    /// The backend is not informed; its job keeps running unobserved. A poll
    /// response already in flight is discarded.
    pub fn cancel(&self) {
        // Token cancel and state reset happen under the slot lock, the same
        // lock every publish takes, so no poll response can land in between.
        let mut active = self.inner.active.lock();
        if let Some(job) = active.take() {
            job.token.cancel();
            info!(job_id = %job.job_id, "collection polling cancelled");
        }
        self.inner.state_tx.send_modify(|state| *state = CollectionState::default());
    }

    /// Claim the single collection slot, publishing `placeholder` as the
    /// current progress. Returns false if a job is already tracked.
    fn begin(&self, placeholder: JobProgress) -> bool {
        let _guard = self.inner.active.lock();
        if self.inner.state_tx.borrow().is_collecting {
            return false;
        }
        self.inner.state_tx.send_modify(|state| {
            state.is_collecting = true;
            state.job_progress = Some(placeholder);
        });
        true
    }

    /// Record the active job and spawn its poll task.
    fn register_and_spawn(&self, job_id: String) {
        let token = CancellationToken::new();
        *self.inner.active.lock() =
            Some(ActiveJob { job_id: job_id.clone(), token: token.clone() });
        self.inner.state_tx.send_modify(|state| {
            state.is_collecting = true;
            state.job_progress = Some(JobProgress::processing_placeholder(&job_id));
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            poll_job(inner, job_id, token).await;
        });
    }
}

/// Body of the poll task: one status request per tick until the job reaches
/// a terminal state or the token is cancelled.
async fn poll_job(inner: Arc<Inner>, job_id: String, token: CancellationToken) {
    // First poll one interval after the trigger, not immediately.
    let mut ticker =
        time::interval_at(time::Instant::now() + inner.poll_interval, inner.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!(job_id, "poll task stopped by cancellation");
                return;
            }
            _ = ticker.tick() => {}
        }

        match inner.client.job_status(&job_id).await {
            Err(err) => {
                // Transient failure: keep polling, the next tick retries.
                warn!(job_id, "status poll failed: {}", err);
            }
            Ok(raw) => {
                let mut progress = normalize(&raw);
                if progress.job_id.is_empty() {
                    progress.job_id = job_id.clone();
                }

                if progress.status.is_terminal() {
                    finish(&inner, progress);
                    return;
                }

                // Publish under the slot lock. cancel() cancels the token
                // while holding the same lock, so a response that raced a
                // cancel is discarded here instead of resurrecting the
                // already-reset state.
                {
                    let _guard = inner.active.lock();
                    if token.is_cancelled() {
                        debug!(job_id, "discarding poll response after cancel");
                        return;
                    }
                    inner.state_tx.send_modify(|state| {
                        state.job_progress = Some(progress);
                    });
                }
            }
        }
    }
}

/// Settle a terminal poll result: freeze it into `last_result`, clear the
/// tracked job, notify the user.
fn finish(inner: &Arc<Inner>, progress: JobProgress) {
    // The lock is held through the publish so a concurrent cancel either
    // beats this (slot empty, publish nothing) or waits and then finds the
    // slot empty. The notifier runs outside the lock.
    let notification = {
        let mut active = inner.active.lock();
        if active.take().is_none() {
            return;
        }
        info!(job_id = %progress.job_id, status = ?progress.status, "collection finished");
        let notification = terminal_notification(&progress);
        inner.state_tx.send_modify(|state| {
            state.is_collecting = false;
            state.job_progress = Some(progress.clone());
            state.last_result = Some(progress);
        });
        notification
    };
    inner.notifier.notify(notification);
}

fn terminal_notification(progress: &JobProgress) -> Notification {
    match progress.status {
        CollectionStatus::Failed => {
            if progress.message.is_empty() {
                Notification::error("Feed collection failed")
            } else {
                Notification::error(format!("Feed collection failed: {}", progress.message))
            }
        }
        _ => {
            let total_new = progress.result.as_ref().map_or(0, |r| r.total_new);
            if total_new > 0 {
                Notification::success(format!("Collected {} new articles", total_new))
            } else {
                Notification::success("Collection finished, no new articles")
            }
        }
    }
}
