//! Ingestion job polling.
//!
//! After a submission comes back `queued` or `processing`, the job is checked
//! once after `initial_delay`, then every `interval`, until it turns terminal
//! or `max_attempts` checks have been made. Each successful check replaces the
//! previous snapshot wholesale. A failed check is logged and skipped; whether
//! it uses up an attempt is governed by [`PollConfig::count_failed_polls`].

use crate::config::PollConfig;
use crate::envelope::ApiResponse;
use crate::types::{IngestionJob, JobStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Anything that can report the current state of a job.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &str) -> ApiResponse<IngestionJob>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(IngestionJob),
    Failed(IngestionJob),
    /// The attempt budget ran out before a terminal status was seen.
    Exhausted {
        attempts: u32,
        last: Option<IngestionJob>,
    },
    /// Nobody was listening any more, or the tracker was aborted.
    Abandoned { last: Option<IngestionJob> },
}

impl PollOutcome {
    pub fn job(&self) -> Option<&IngestionJob> {
        match self {
            PollOutcome::Completed(job) | PollOutcome::Failed(job) => Some(job),
            PollOutcome::Exhausted { last, .. } | PollOutcome::Abandoned { last } => last.as_ref(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollOutcome::Completed(_) | PollOutcome::Failed(_))
    }

    fn from_terminal(job: IngestionJob) -> Self {
        match job.status {
            JobStatus::Failed => PollOutcome::Failed(job),
            _ => PollOutcome::Completed(job),
        }
    }
}

/// Run the polling protocol for `job_id`.
///
/// `is_watched` is asked before every status check and `on_update` sees every
/// fresh snapshot; either returning `false` stops polling with
/// [`PollOutcome::Abandoned`].
pub async fn poll_job<S, W, F>(
    source: &S,
    job_id: &str,
    config: &PollConfig,
    is_watched: W,
    mut on_update: F,
) -> PollOutcome
where
    S: JobStatusSource + ?Sized,
    W: Fn() -> bool,
    F: FnMut(&IngestionJob) -> bool,
{
    if config.max_attempts == 0 {
        return PollOutcome::Exhausted {
            attempts: 0,
            last: None,
        };
    }

    tokio::time::sleep(config.initial_delay()).await;

    let mut attempts: u32 = 0;
    let mut last: Option<IngestionJob> = None;
    loop {
        if !is_watched() {
            debug!(job_id, "no listeners left, stopping job polling");
            return PollOutcome::Abandoned { last };
        }
        match source.job_status(job_id).await {
            ApiResponse::Success { data: job, .. } => {
                attempts += 1;
                debug!(job_id, attempt = attempts, status = %job.status, "job status checked");
                let keep_going = on_update(&job);
                if job.is_terminal() {
                    info!(
                        job_id,
                        status = %job.status,
                        records_processed = job.records_processed,
                        "job finished"
                    );
                    return PollOutcome::from_terminal(job);
                }
                last = Some(job);
                if !keep_going {
                    debug!(job_id, "no listeners left, stopping job polling");
                    return PollOutcome::Abandoned { last };
                }
            }
            ApiResponse::Failure { error, .. } => {
                if config.count_failed_polls {
                    attempts += 1;
                }
                warn!(job_id, attempt = attempts, code = %error.code, message = %error.message, "job status check failed");
            }
        }

        if attempts >= config.max_attempts {
            warn!(job_id, attempts, "job polling gave up before a terminal status");
            return PollOutcome::Exhausted { attempts, last };
        }

        tokio::time::sleep(config.interval()).await;
    }
}

/// Handle on a job being polled in the background.
///
/// Snapshots are published on a watch channel. Dropping the tracker and every
/// receiver from [`JobTracker::subscribe`] ends polling at the next check.
#[derive(Debug)]
pub struct JobTracker {
    job_id: String,
    snapshots: watch::Receiver<IngestionJob>,
    handle: JoinHandle<PollOutcome>,
}

impl JobTracker {
    pub fn spawn<S>(source: Arc<S>, initial: IngestionJob, config: PollConfig) -> Self
    where
        S: JobStatusSource + ?Sized + 'static,
    {
        let job_id = initial.job_id.clone();
        let (tx, rx) = watch::channel(initial.clone());
        let task_job_id = job_id.clone();
        let handle = tokio::spawn(async move {
            if initial.is_terminal() {
                return PollOutcome::from_terminal(initial);
            }
            poll_job(
                source.as_ref(),
                &task_job_id,
                &config,
                || !tx.is_closed(),
                |job| tx.send(job.clone()).is_ok(),
            )
            .await
        });
        Self {
            job_id,
            snapshots: rx,
            handle,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> IngestionJob {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<IngestionJob> {
        self.snapshots.clone()
    }

    /// Wait for the next snapshot. `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<IngestionJob> {
        match self.snapshots.changed().await {
            Ok(()) => Some(self.snapshots.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for polling to end.
    pub async fn wait(self) -> PollOutcome {
        let JobTracker {
            snapshots, handle, ..
        } = self;
        let outcome = handle.await;
        match outcome {
            Ok(outcome) => outcome,
            Err(_) => PollOutcome::Abandoned {
                last: Some(snapshots.borrow().clone()),
            },
        }
    }
}
