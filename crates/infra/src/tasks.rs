//! Notification task queue with bounded, fixed-delay retry.
//!
//! The contract is best-effort, non-blocking, bounded-retry,
//! drop-on-exhaustion: enqueueing never blocks or fails the request that
//! triggered it, a transport failure reschedules the task after a fixed
//! delay, and once the attempts are spent the task is dropped (kept on the
//! queue as `Dropped` for inspection, nothing more).

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::mailer::Mailer;
use crate::notify;

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the notification email needs, snapshotted at enqueue time so
/// the worker never reads the stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationNotice {
    pub employer_email: String,
    pub job_title: String,
    pub candidate_email: String,
}

/// Delivery status of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued, waiting to be picked up.
    Pending,
    /// Currently being delivered.
    Running,
    /// Delivered.
    Sent,
    /// Transport failed; scheduled for another attempt.
    Failed { error: String, attempt: u32 },
    /// Attempts exhausted; delivery abandoned.
    Dropped { error: String, attempts: u32 },
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Sent | TaskStatus::Dropped { .. })
    }
}

/// Retry policy: a fixed delay between a bounded number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts allowed, the first one included.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Notification default: 3 attempts total, 5 minutes apart.
    pub fn notification_default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(300),
        }
    }

    fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTask {
    pub id: TaskId,
    pub notice: ApplicationNotice,
    pub status: TaskStatus,
    pub retry_policy: RetryPolicy,
    /// Attempt counter, incremented when the task starts running.
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Earliest time the task may run again (retry backoff).
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NotificationTask {
    pub fn new(notice: ApplicationNotice, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            notice,
            status: TaskStatus::Pending,
            retry_policy: RetryPolicy::notification_default(),
            attempt: 0,
            created_at: now,
            updated_at: now,
            scheduled_at: None,
        }
    }

    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_at {
            Some(at) => now >= at,
            None => true,
        }
    }

    pub fn mark_running(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Running;
        self.attempt += 1;
        self.updated_at = now;
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Sent;
        self.updated_at = now;
    }

    /// Record a failed attempt: schedule the retry, or drop the task once
    /// the policy is exhausted.
    pub fn mark_failed(&mut self, error: String, now: DateTime<Utc>) {
        self.updated_at = now;
        if self.retry_policy.should_retry(self.attempt) {
            self.scheduled_at = Some(
                now + chrono::Duration::from_std(self.retry_policy.delay).unwrap_or_default(),
            );
            self.status = TaskStatus::Failed {
                error,
                attempt: self.attempt,
            };
        } else {
            self.status = TaskStatus::Dropped {
                error,
                attempts: self.attempt,
            };
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskQueueError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),
}

/// Task queue abstraction.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&self, task: NotificationTask) -> Result<TaskId, TaskQueueError>;

    /// Claim the oldest ready task and mark it running.
    fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<NotificationTask>, TaskQueueError>;

    fn update(&self, task: &NotificationTask) -> Result<(), TaskQueueError>;

    /// Tasks whose delivery was abandoned, oldest first.
    fn list_dropped(&self) -> Result<Vec<NotificationTask>, TaskQueueError>;
}

/// In-memory queue for dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    tasks: RwLock<HashMap<TaskId, NotificationTask>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskQueue for InMemoryTaskQueue {
    fn enqueue(&self, task: NotificationTask) -> Result<TaskId, TaskQueueError> {
        let mut tasks = self.tasks.write().unwrap();
        if tasks.contains_key(&task.id) {
            return Err(TaskQueueError::AlreadyExists(task.id));
        }
        let id = task.id;
        tasks.insert(id, task);
        Ok(id)
    }

    fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<NotificationTask>, TaskQueueError> {
        let mut tasks = self.tasks.write().unwrap();

        let mut ready: Vec<_> = tasks
            .values()
            .filter(|t| {
                matches!(t.status, TaskStatus::Pending | TaskStatus::Failed { .. })
                    && t.is_ready(now)
            })
            .collect();
        ready.sort_by_key(|t| t.created_at);

        if let Some(task) = ready.first() {
            let id = task.id;
            if let Some(task) = tasks.get_mut(&id) {
                task.mark_running(now);
                return Ok(Some(task.clone()));
            }
        }
        Ok(None)
    }

    fn update(&self, task: &NotificationTask) -> Result<(), TaskQueueError> {
        let mut tasks = self.tasks.write().unwrap();
        if !tasks.contains_key(&task.id) {
            return Err(TaskQueueError::NotFound(task.id));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    fn list_dropped(&self) -> Result<Vec<NotificationTask>, TaskQueueError> {
        let tasks = self.tasks.read().unwrap();
        let mut dropped: Vec<_> = tasks
            .values()
            .filter(|t| matches!(t.status, TaskStatus::Dropped { .. }))
            .cloned()
            .collect();
        dropped.sort_by_key(|t| t.created_at);
        Ok(dropped)
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            name: "notification-worker".to_string(),
        }
    }
}

/// Handle to a running notification worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().unwrap().clone()
    }
}

/// Worker delivery counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerStats {
    pub processed: u64,
    pub sent: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Spawn the notification worker thread.
///
/// The worker claims ready tasks, renders the notification email and pushes
/// it through the mailer; mail transport I/O stays off the request path.
pub fn spawn_notification_worker(
    queue: Arc<dyn TaskQueue>,
    mailer: Arc<dyn Mailer>,
    config: WorkerConfig,
) -> WorkerHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let stats = Arc::new(Mutex::new(WorkerStats::default()));
    let stats_clone = stats.clone();

    let name = config.name.clone();
    let join = thread::Builder::new()
        .name(name)
        .spawn(move || worker_loop(queue, mailer, config, shutdown_rx, stats_clone))
        .expect("failed to spawn notification worker thread");

    WorkerHandle {
        shutdown: shutdown_tx,
        join: Some(join),
        stats,
    }
}

fn worker_loop(
    queue: Arc<dyn TaskQueue>,
    mailer: Arc<dyn Mailer>,
    config: WorkerConfig,
    shutdown_rx: mpsc::Receiver<()>,
    stats: Arc<Mutex<WorkerStats>>,
) {
    info!(worker = %config.name, "notification worker started");

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match queue.claim_next(Utc::now()) {
            Ok(Some(mut task)) => {
                let outcome = deliver_one(queue.as_ref(), mailer.as_ref(), &mut task);

                let mut s = stats.lock().unwrap();
                s.processed += 1;
                match task.status {
                    TaskStatus::Sent => s.sent += 1,
                    TaskStatus::Dropped { .. } => s.dropped += 1,
                    _ => s.failed += 1,
                }
                drop(s);

                if let Err(error) = outcome {
                    debug!(
                        worker = %config.name,
                        task_id = %task.id,
                        %error,
                        status = ?task.status,
                        "notification delivery failed"
                    );
                }
            }
            Ok(None) => thread::sleep(config.poll_interval),
            Err(error) => {
                warn!(worker = %config.name, %error, "failed to claim notification task");
                thread::sleep(config.poll_interval);
            }
        }
    }

    info!(worker = %config.name, "notification worker stopped");
}

/// Deliver a single claimed task. Exposed for tests and synchronous use.
pub fn deliver_one(
    queue: &dyn TaskQueue,
    mailer: &dyn Mailer,
    task: &mut NotificationTask,
) -> Result<(), String> {
    let email = notify::application_received_email(&task.notice);

    match mailer.send(&email) {
        Ok(()) => {
            task.mark_sent(Utc::now());
            queue.update(task).map_err(|e| e.to_string())?;
            debug!(task_id = %task.id, "application notification sent");
            Ok(())
        }
        Err(error) => {
            let error = error.to_string();
            task.mark_failed(error.clone(), Utc::now());
            queue.update(task).map_err(|e| e.to_string())?;

            if let TaskStatus::Dropped { attempts, .. } = &task.status {
                warn!(task_id = %task.id, attempts, %error, "notification dropped after retries");
            }
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::RecordingMailer;

    fn notice() -> ApplicationNotice {
        ApplicationNotice {
            employer_email: "employer@acme.com".to_string(),
            job_title: "Backend Engineer".to_string(),
            candidate_email: "candidate@example.com".to_string(),
        }
    }

    #[test]
    fn successful_delivery_marks_sent() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mailer = RecordingMailer::new();

        queue
            .enqueue(NotificationTask::new(notice(), Utc::now()))
            .unwrap();
        let mut claimed = queue.claim_next(Utc::now()).unwrap().unwrap();

        deliver_one(&*queue, &mailer, &mut claimed).unwrap();

        assert_eq!(claimed.status, TaskStatus::Sent);
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, "employer@acme.com");
    }

    #[test]
    fn failure_schedules_fixed_delay_retry() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mailer = RecordingMailer::with_failures(u32::MAX);

        queue
            .enqueue(NotificationTask::new(notice(), Utc::now()))
            .unwrap();
        let mut claimed = queue.claim_next(Utc::now()).unwrap().unwrap();

        deliver_one(&*queue, &mailer, &mut claimed).unwrap_err();

        assert!(matches!(claimed.status, TaskStatus::Failed { attempt: 1, .. }));
        let delay = claimed.scheduled_at.unwrap() - claimed.updated_at;
        assert_eq!(delay.num_seconds(), 300);

        // not ready again until the delay has passed
        assert!(queue.claim_next(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn third_failure_drops_the_task() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mailer = RecordingMailer::with_failures(u32::MAX);

        queue
            .enqueue(NotificationTask::new(notice(), Utc::now()))
            .unwrap();

        for attempt in 1..=3u32 {
            let mut claimed = queue.claim_next(Utc::now()).unwrap().unwrap();
            assert_eq!(claimed.attempt, attempt);
            deliver_one(&*queue, &mailer, &mut claimed).unwrap_err();

            // skip the backoff instead of waiting five minutes
            claimed.scheduled_at = None;
            queue.update(&claimed).unwrap();
        }

        let dropped = queue.list_dropped().unwrap();
        assert_eq!(dropped.len(), 1);
        assert!(matches!(
            dropped[0].status,
            TaskStatus::Dropped { attempts: 3, .. }
        ));

        // nothing left to claim
        assert!(queue.claim_next(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn recovery_after_one_failure_sends() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mailer = RecordingMailer::with_failures(1);

        queue
            .enqueue(NotificationTask::new(notice(), Utc::now()))
            .unwrap();

        let mut claimed = queue.claim_next(Utc::now()).unwrap().unwrap();
        deliver_one(&*queue, &mailer, &mut claimed).unwrap_err();
        claimed.scheduled_at = None;
        queue.update(&claimed).unwrap();

        let mut claimed = queue.claim_next(Utc::now()).unwrap().unwrap();
        deliver_one(&*queue, &mailer, &mut claimed).unwrap();

        assert_eq!(claimed.status, TaskStatus::Sent);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn worker_thread_drains_the_queue() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mailer = Arc::new(RecordingMailer::new());

        queue
            .enqueue(NotificationTask::new(notice(), Utc::now()))
            .unwrap();

        let handle = spawn_notification_worker(
            queue.clone() as Arc<dyn TaskQueue>,
            mailer.clone(),
            WorkerConfig {
                poll_interval: Duration::from_millis(5),
                ..Default::default()
            },
        );

        for _ in 0..100 {
            if !mailer.sent().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        handle.shutdown();

        assert_eq!(mailer.sent().len(), 1);
    }
}
