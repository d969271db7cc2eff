//! # Serialized Automation Queue
//!
//! Owns the single automation resource and runs jobs against it strictly one
//! at a time, in submission order.
//!
//! ## States
//!
//! ```text
//! Idle (no resource) ──create──► Ready ◄──► Busy
//!        ▲                                   │
//!        └──── crash / creation failure / shutdown
//! ```
//!
//! The worker task starts on the first submit and after every shutdown.
//! Callers wait on a per-job oneshot channel; giving up on a job does not
//! cancel it.
//!
//! # Examples
//!
//! ```ignore
//! let queue = AutomationQueue::new(factory, QueueConfig::default());
//! let output = queue.run("rma_offers", params).await?;
//! queue.shutdown().await;
//! ```

use crate::domain::value_objects::ids::JobId;
use crate::infrastructure::automation::error::{QueueError, QueueResult};
use crate::infrastructure::automation::traits::{
    AutomationResource, ResourceFactory, WorkflowError,
};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle state of the queue's resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    /// No resource exists.
    Idle,
    /// A resource is live and waiting for work.
    Ready,
    /// A job is running.
    Busy,
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Ready => write!(f, "READY"),
            Self::Busy => write!(f, "BUSY"),
        }
    }
}

/// Queue configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// How long [`AutomationQueue::run`] waits for a job.
    pub job_timeout: Duration,
    /// How long shutdown waits for the worker before aborting it.
    pub shutdown_wait: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(120),
            shutdown_wait: Duration::from_secs(5),
        }
    }
}

impl QueueConfig {
    /// Sets the job wait budget.
    #[must_use]
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Sets the shutdown wait.
    #[must_use]
    pub fn with_shutdown_wait(mut self, wait: Duration) -> Self {
        self.shutdown_wait = wait;
        self
    }
}

/// Point-in-time counters of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Resource state.
    pub state: QueueState,
    /// Jobs waiting to run.
    pub depth: usize,
    /// Jobs run to completion, successful or not.
    pub jobs_processed: u64,
    /// Resources created since start.
    pub resources_created: u64,
}

/// A queued unit of work.
#[derive(Debug)]
pub struct AutomationJob {
    id: JobId,
    workflow: String,
    params: Value,
    reply: oneshot::Sender<QueueResult<Value>>,
}

/// Caller side of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    receiver: oneshot::Receiver<QueueResult<Value>>,
}

impl JobHandle {
    /// Returns the job id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }
}

#[derive(Debug)]
enum Message {
    Run(AutomationJob),
    Stop,
}

#[derive(Debug)]
struct Worker {
    sender: mpsc::UnboundedSender<Message>,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Shared {
    factory: Arc<dyn ResourceFactory>,
    resource: tokio::sync::Mutex<Option<Box<dyn AutomationResource>>>,
    state: Mutex<QueueState>,
    depth: AtomicUsize,
    processed: AtomicU64,
    created: AtomicU64,
}

impl Shared {
    fn set_state(&self, state: QueueState) {
        *self.state.lock() = state;
    }

    async fn execute(&self, id: JobId, workflow: &str, params: &Value) -> QueueResult<Value> {
        let mut slot = self.resource.lock().await;

        if slot.is_none() {
            match self.factory.create().await {
                Ok(resource) => {
                    self.created.fetch_add(1, Ordering::SeqCst);
                    *slot = Some(resource);
                    self.set_state(QueueState::Ready);
                    info!(job_id = %id, "automation resource created");
                }
                Err(error) => {
                    error!(job_id = %id, error = %error, "failed to create automation resource");
                    self.set_state(QueueState::Idle);
                    return Err(QueueError::Creation(error));
                }
            }
        }

        let Some(resource) = slot.as_mut() else {
            return Err(QueueError::Resource("automation resource unavailable".into()));
        };

        self.set_state(QueueState::Busy);
        debug!(job_id = %id, workflow, "running automation job");

        let outcome = AssertUnwindSafe(resource.run(workflow, params))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(WorkflowError::crashed("workflow panicked")));

        match outcome {
            Ok(value) => {
                self.set_state(QueueState::Ready);
                Ok(value)
            }
            Err(error) if error.is_fatal() => {
                warn!(job_id = %id, error = %error, "discarding automation resource");
                if let Some(mut resource) = slot.take() {
                    resource.close().await;
                }
                self.set_state(QueueState::Idle);
                Err(QueueError::Resource(error.to_string()))
            }
            Err(error) => {
                self.set_state(QueueState::Ready);
                Err(QueueError::Workflow(error.to_string()))
            }
        }
    }
}

async fn worker_loop(shared: Arc<Shared>, mut receiver: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = receiver.recv().await {
        let AutomationJob {
            id,
            workflow,
            params,
            reply,
        } = match message {
            Message::Run(job) => job,
            Message::Stop => break,
        };
        // Ignore the error: shutdown may have reset the depth already.
        let _ = shared
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));

        let result = shared.execute(id, &workflow, &params).await;
        shared.processed.fetch_add(1, Ordering::SeqCst);

        if reply.send(result).is_err() {
            debug!(job_id = %id, "caller stopped waiting; result dropped");
        }
    }
    debug!("automation worker stopped");
}

/// FIFO queue serializing access to one automation resource.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone)]
pub struct AutomationQueue {
    shared: Arc<Shared>,
    worker: Arc<Mutex<Option<Worker>>>,
    config: QueueConfig,
}

impl AutomationQueue {
    /// Creates an idle queue. No resource or worker exists until the first submit.
    #[must_use]
    pub fn new(factory: Arc<dyn ResourceFactory>, config: QueueConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory,
                resource: tokio::sync::Mutex::new(None),
                state: Mutex::new(QueueState::Idle),
                depth: AtomicUsize::new(0),
                processed: AtomicU64::new(0),
                created: AtomicU64::new(0),
            }),
            worker: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Returns the resource state.
    #[must_use]
    pub fn state(&self) -> QueueState {
        *self.shared.state.lock()
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            state: self.state(),
            depth: self.shared.depth.load(Ordering::SeqCst),
            jobs_processed: self.shared.processed.load(Ordering::SeqCst),
            resources_created: self.shared.created.load(Ordering::SeqCst),
        }
    }

    /// Returns true if a worker task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.sender.is_closed())
    }

    /// Enqueues a job, starting the worker if needed.
    ///
    /// # Errors
    ///
    /// - `QueueError::Unavailable` if called outside a tokio runtime
    /// - `QueueError::WorkerStopped` if the worker exited while enqueuing
    pub fn submit(&self, workflow: impl Into<String>, params: Value) -> QueueResult<JobHandle> {
        let (reply, receiver) = oneshot::channel();
        let id = JobId::new_v4();
        let job = AutomationJob {
            id,
            workflow: workflow.into(),
            params,
            reply,
        };

        let sender = {
            let mut worker = self.worker.lock();
            match worker.as_ref() {
                Some(w) if !w.sender.is_closed() => w.sender.clone(),
                _ => {
                    let spawned = self.spawn_worker()?;
                    let sender = spawned.sender.clone();
                    *worker = Some(spawned);
                    sender
                }
            }
        };

        self.shared.depth.fetch_add(1, Ordering::SeqCst);
        if sender.send(Message::Run(job)).is_err() {
            let _ = self
                .shared
                .depth
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
            return Err(QueueError::WorkerStopped);
        }
        debug!(job_id = %id, "automation job queued");

        Ok(JobHandle { id, receiver })
    }

    /// Waits up to `timeout` for a submitted job.
    ///
    /// Timing out only stops waiting; the job still runs.
    ///
    /// # Errors
    ///
    /// - `QueueError::Timeout` if the budget elapses
    /// - `QueueError::WorkerStopped` if the worker went away
    /// - The job's own error otherwise
    pub async fn wait(&self, handle: JobHandle, timeout: Duration) -> QueueResult<Value> {
        let JobHandle { id, receiver } = handle;
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(QueueError::WorkerStopped),
            Err(_) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(job_id = %id, timeout_ms, "stopped waiting for automation job");
                Err(QueueError::Timeout { timeout_ms })
            }
        }
    }

    /// Submits a job and waits for it with the configured job timeout.
    ///
    /// # Errors
    ///
    /// See [`AutomationQueue::submit`] and [`AutomationQueue::wait`].
    pub async fn run(&self, workflow: impl Into<String>, params: Value) -> QueueResult<Value> {
        let handle = self.submit(workflow, params)?;
        self.wait(handle, self.config.job_timeout).await
    }

    /// Stops the worker and tears the resource down.
    ///
    /// Jobs queued before the call still run if the worker drains them within
    /// the shutdown wait; otherwise the worker is aborted and their callers see
    /// `QueueError::WorkerStopped`. A later submit starts a fresh worker.
    pub async fn shutdown(&self) {
        let worker = self.worker.lock().take();

        if let Some(Worker { sender, handle }) = worker {
            let _ = sender.send(Message::Stop);
            let abort = handle.abort_handle();
            if tokio::time::timeout(self.config.shutdown_wait, handle)
                .await
                .is_err()
            {
                warn!(
                    wait_ms =
                        u64::try_from(self.config.shutdown_wait.as_millis()).unwrap_or(u64::MAX),
                    "automation worker did not stop in time; aborting"
                );
                abort.abort();
            }
        }

        let resource = self.shared.resource.lock().await.take();
        if let Some(mut resource) = resource {
            resource.close().await;
            info!("automation resource torn down");
        }
        self.shared.depth.store(0, Ordering::SeqCst);
        self.shared.set_state(QueueState::Idle);
    }

    fn spawn_worker(&self) -> QueueResult<Worker> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = runtime.spawn(worker_loop(Arc::clone(&self.shared), receiver));
        info!("automation worker started");
        Ok(Worker { sender, handle })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::automation::traits::ResourceError;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Tracker {
        active: AtomicUsize,
        max_active: AtomicUsize,
        closed: AtomicUsize,
        order: Mutex<Vec<i64>>,
    }

    #[derive(Debug)]
    struct FakeResource {
        tracker: Arc<Tracker>,
    }

    #[async_trait]
    impl AutomationResource for FakeResource {
        async fn run(&mut self, _workflow: &str, params: &Value) -> Result<Value, WorkflowError> {
            let now = self.tracker.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.tracker.max_active.fetch_max(now, Ordering::SeqCst);
            if let Some(seq) = params["seq"].as_i64() {
                self.tracker.order.lock().push(seq);
            }
            let sleep_ms = params["sleep_ms"].as_u64().unwrap_or(5);
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            self.tracker.active.fetch_sub(1, Ordering::SeqCst);

            if params["crash"] == true {
                return Err(WorkflowError::crashed("page closed"));
            }
            if params["fail"] == true {
                return Err(WorkflowError::step("submit", "button missing"));
            }
            Ok(json!({ "echo": params.clone() }))
        }

        async fn close(&mut self) {
            self.tracker.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Debug, Default)]
    struct FakeFactory {
        tracker: Arc<Tracker>,
        fail: bool,
    }

    #[async_trait]
    impl ResourceFactory for FakeFactory {
        async fn create(&self) -> Result<Box<dyn AutomationResource>, ResourceError> {
            if self.fail {
                return Err(ResourceError::refused("no display"));
            }
            Ok(Box::new(FakeResource {
                tracker: Arc::clone(&self.tracker),
            }))
        }
    }

    fn queue_with(tracker: &Arc<Tracker>, config: QueueConfig) -> AutomationQueue {
        let factory = FakeFactory {
            tracker: Arc::clone(tracker),
            fail: false,
        };
        AutomationQueue::new(Arc::new(factory), config)
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn starts_idle() {
            let queue = queue_with(&Arc::default(), QueueConfig::default());
            let stats = queue.stats();
            assert_eq!(stats.state, QueueState::Idle);
            assert_eq!(stats.depth, 0);
            assert_eq!(stats.jobs_processed, 0);
            assert!(!queue.is_running());
        }

        #[test]
        fn submit_outside_runtime_is_unavailable() {
            let queue = queue_with(&Arc::default(), QueueConfig::default());
            assert!(matches!(
                queue.submit("w", json!({})),
                Err(QueueError::Unavailable(_))
            ));
        }

        #[tokio::test]
        async fn first_job_creates_resource() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let output = queue.run("rma_offers", json!({"a": 1})).await.unwrap();
            assert_eq!(output["echo"]["a"], 1);

            let stats = queue.stats();
            assert_eq!(stats.state, QueueState::Ready);
            assert_eq!(stats.resources_created, 1);
            assert_eq!(stats.jobs_processed, 1);
            assert!(queue.is_running());
        }

        #[tokio::test]
        async fn shutdown_tears_down_and_submit_restarts() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            queue.run("w", json!({})).await.unwrap();
            queue.shutdown().await;
            assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);
            assert_eq!(queue.state(), QueueState::Idle);
            assert!(!queue.is_running());

            queue.run("w", json!({})).await.unwrap();
            assert_eq!(queue.stats().resources_created, 2);
        }

        #[tokio::test]
        async fn shutdown_aborts_a_stuck_worker() {
            let tracker = Arc::new(Tracker::default());
            let config = QueueConfig::default().with_shutdown_wait(Duration::from_millis(50));
            let queue = queue_with(&tracker, config);

            let handle = queue.submit("w", json!({"sleep_ms": 10_000})).unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;

            let started = std::time::Instant::now();
            queue.shutdown().await;
            assert!(started.elapsed() < Duration::from_secs(2));

            let result = queue.wait(handle, Duration::from_secs(1)).await;
            assert!(matches!(result, Err(QueueError::WorkerStopped)));
            assert_eq!(queue.state(), QueueState::Idle);
        }
    }

    mod serialization {
        use super::*;

        #[tokio::test]
        async fn concurrent_jobs_never_overlap() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let mut tasks = Vec::new();
            for i in 0..5 {
                let queue = queue.clone();
                tasks.push(tokio::spawn(async move {
                    queue.run("w", json!({"sleep_ms": 20, "i": i})).await
                }));
            }
            for task in tasks {
                assert!(task.await.unwrap().is_ok());
            }

            assert_eq!(tracker.max_active.load(Ordering::SeqCst), 1);
            let stats = queue.stats();
            assert_eq!(stats.jobs_processed, 5);
            assert_eq!(stats.resources_created, 1);
            assert_eq!(stats.depth, 0);
        }

        #[tokio::test]
        async fn jobs_run_in_submission_order() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let handles: Vec<_> = (0..4)
                .map(|seq| queue.submit("w", json!({"seq": seq})).unwrap())
                .collect();
            for handle in handles {
                queue.wait(handle, Duration::from_secs(5)).await.unwrap();
            }

            assert_eq!(*tracker.order.lock(), vec![0, 1, 2, 3]);
        }

        #[tokio::test]
        async fn caller_timeout_does_not_block_later_jobs() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let slow = queue.submit("w", json!({"sleep_ms": 200})).unwrap();
            let result = queue.wait(slow, Duration::from_millis(20)).await;
            assert!(matches!(result, Err(QueueError::Timeout { timeout_ms: 20 })));

            let next = queue.submit("w", json!({"seq": 7})).unwrap();
            let output = queue.wait(next, Duration::from_secs(5)).await.unwrap();
            assert_eq!(output["echo"]["seq"], 7);
            assert_eq!(queue.stats().jobs_processed, 2);
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn crash_discards_the_resource() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let result = queue.run("w", json!({"crash": true})).await;
            assert!(matches!(result, Err(QueueError::Resource(_))));
            assert_eq!(queue.state(), QueueState::Idle);
            assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);

            queue.run("w", json!({})).await.unwrap();
            assert_eq!(queue.stats().resources_created, 2);
        }

        #[tokio::test]
        async fn step_failure_keeps_the_resource() {
            let tracker = Arc::new(Tracker::default());
            let queue = queue_with(&tracker, QueueConfig::default());

            let result = queue.run("w", json!({"fail": true})).await;
            assert!(matches!(result, Err(QueueError::Workflow(_))));
            assert_eq!(queue.state(), QueueState::Ready);

            queue.run("w", json!({})).await.unwrap();
            assert_eq!(queue.stats().resources_created, 1);
        }

        #[tokio::test]
        async fn creation_failure_only_fails_that_job() {
            let factory = FakeFactory {
                tracker: Arc::default(),
                fail: true,
            };
            let queue = AutomationQueue::new(Arc::new(factory), QueueConfig::default());

            let result = queue.run("w", json!({})).await;
            assert!(matches!(
                result,
                Err(QueueError::Creation(ResourceError::Refused { ref message }))
                    if message == "no display"
            ));
            assert_eq!(queue.state(), QueueState::Idle);
            assert!(queue.is_running());
        }
    }
}
