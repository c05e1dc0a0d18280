//! Fixed-size pool of worker threads running the view pipeline.
//!
//! Tasks travel over an unbounded crossbeam channel; each worker takes one
//! task at a time. A task's timeout starts when a worker picks it up, so time
//! spent queued behind other tasks never counts against it.
//!
//! A running task cannot be interrupted. When a caller's wait times out, the
//! worker running that task is retired and a fresh worker takes its slot; the
//! retired thread exits once its task returns and its late result is
//! discarded.

use super::task::{TaskFailure, TaskRequest, TaskResponse};
use crate::query::{process, ProcessedView};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Function a worker runs for each request.
pub(crate) type Executor = Arc<dyn Fn(&TaskRequest) -> ProcessedView + Send + Sync>;

/// Snapshot of pool load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Worker slots currently filled.
    pub workers: usize,
    /// Tasks waiting for a worker.
    pub queued: usize,
    /// Tasks being executed, including ones whose caller already timed out.
    pub active: usize,
}

struct Job {
    request: TaskRequest,
    reply: Sender<WorkerReply>,
}

/// Messages from a worker to the caller waiting on one task.
enum WorkerReply {
    /// A worker picked the task up; the caller waits until `deadline`.
    Started { worker: usize, deadline: Instant },
    Finished(TaskResponse),
}

struct WorkerSlot {
    id: usize,
    retired: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// State shared by the pool, its workers and outstanding task handles.
struct Shared {
    rx: Receiver<Job>,
    executor: Executor,
    timeout: Duration,
    queued: AtomicUsize,
    active: AtomicUsize,
    next_worker: AtomicUsize,
    slots: Mutex<Vec<WorkerSlot>>,
    shutting_down: AtomicBool,
}

impl Shared {
    fn slots(&self) -> MutexGuard<'_, Vec<WorkerSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns a worker into a new slot.
    fn spawn_worker(self: &Arc<Self>, slots: &mut Vec<WorkerSlot>) -> io::Result<()> {
        let id = self.next_worker.fetch_add(1, Ordering::SeqCst);
        let retired = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(self);
        let flag = Arc::clone(&retired);
        let handle = thread::Builder::new()
            .name(format!("calgrid-worker-{id}"))
            .spawn(move || run_worker_loop(id, &shared, &flag))?;
        slots.push(WorkerSlot {
            id,
            retired,
            handle,
        });
        Ok(())
    }

    /// Frees the slot held by `worker` and fills it with a fresh thread.
    fn replace_worker(self: &Arc<Self>, worker: usize) {
        let mut slots = self.slots();
        if self.shutting_down.load(Ordering::SeqCst) {
            return;
        }
        let Some(position) = slots.iter().position(|slot| slot.id == worker) else {
            return;
        };
        // Detached: the thread exits on its own once its task returns.
        let stuck = slots.swap_remove(position);
        stuck.retired.store(true, Ordering::SeqCst);
        drop(stuck.handle);

        match self.spawn_worker(&mut slots) {
            Ok(()) => tracing::info!(retired = worker, "replaced timed-out worker"),
            Err(err) => tracing::warn!(error = %err, "failed to replace timed-out worker"),
        }
    }
}

/// Pending result of a submitted task.
pub struct TaskHandle {
    request: TaskRequest,
    reply: Receiver<WorkerReply>,
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// Blocks until the task finishes or has run for longer than the pool's
    /// timeout.
    pub fn wait(self) -> TaskResponse {
        let task_id = self.request.task_id;
        let mut running: Option<(usize, Instant)> = None;

        loop {
            let received = match running {
                Some((_, deadline)) => self.reply.recv_deadline(deadline),
                None => self
                    .reply
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(WorkerReply::Started { worker, deadline }) => {
                    running = Some((worker, deadline));
                }
                Ok(WorkerReply::Finished(response)) => return response,
                Err(RecvTimeoutError::Timeout) => {
                    let timeout = self.shared.timeout;
                    tracing::warn!(task = %task_id, ?timeout, "task timed out");
                    if let Some((worker, _)) = running {
                        self.shared.replace_worker(worker);
                    }
                    return TaskResponse {
                        task_id,
                        result: Err(TaskFailure::Timeout {
                            request: self.request,
                            timeout,
                        }),
                    };
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return TaskResponse {
                        task_id,
                        result: Err(TaskFailure::Disconnected {
                            request: self.request,
                        }),
                    };
                }
            }
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.request.task_id)
            .finish()
    }
}

/// Worker threads plus the queue feeding them. Dropping the pool lets the
/// workers finish queued tasks, then joins them.
pub struct WorkerPool {
    tx: Option<Sender<Job>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one) running the view pipeline.
    pub fn new(size: usize, timeout: Duration) -> io::Result<Self> {
        Self::with_executor(
            size,
            timeout,
            Arc::new(|request: &TaskRequest| {
                process(&request.events, &request.window, &request.options)
            }),
        )
    }

    pub(crate) fn with_executor(size: usize, timeout: Duration, executor: Executor) -> io::Result<Self> {
        let (tx, rx) = crossbeam::channel::unbounded();
        let pool = Self {
            tx: Some(tx),
            shared: Arc::new(Shared {
                rx,
                executor,
                timeout,
                queued: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                next_worker: AtomicUsize::new(0),
                slots: Mutex::new(Vec::new()),
                shutting_down: AtomicBool::new(false),
            }),
        };

        {
            let mut slots = pool.shared.slots();
            for _ in 0..size.max(1) {
                // On error the partially built pool is dropped, which shuts
                // down the workers spawned so far.
                pool.shared.spawn_worker(&mut slots)?;
            }
        }

        tracing::debug!(workers = size.max(1), ?timeout, "worker pool started");
        Ok(pool)
    }

    /// Queues a task. Its timeout starts once a worker picks it up.
    pub fn submit(&self, request: TaskRequest) -> TaskHandle {
        let (reply_tx, reply_rx) = crossbeam::channel::bounded(2);
        let handle = TaskHandle {
            request: request.clone(),
            reply: reply_rx,
            shared: Arc::clone(&self.shared),
        };

        self.shared.queued.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            request,
            reply: reply_tx,
        };
        let sent = self.tx.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            // The reply sender went down with the job, so `wait` reports
            // Disconnected.
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
        }
        handle
    }

    /// Submit and wait.
    pub fn run(&self, request: TaskRequest) -> TaskResponse {
        self.submit(request).wait()
    }

    /// Submits every request before waiting on any, so they run in parallel.
    /// Responses come back in request order.
    pub fn run_batch(&self, requests: Vec<TaskRequest>) -> Vec<TaskResponse> {
        let handles: Vec<TaskHandle> = requests.into_iter().map(|r| self.submit(r)).collect();
        handles.into_iter().map(TaskHandle::wait).collect()
    }

    /// Current load.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            workers: self.shared.slots().len(),
            queued: self.shared.queued.load(Ordering::SeqCst),
            active: self.shared.active.load(Ordering::SeqCst),
        }
    }

    /// Longest a task may run once a worker has picked it up.
    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let slots = {
            let mut slots = self.shared.slots();
            self.shared.shutting_down.store(true, Ordering::SeqCst);
            std::mem::take(&mut *slots)
        };
        // Closing the queue ends every worker loop once the queue is drained.
        drop(self.tx.take());
        for slot in slots {
            if slot.handle.join().is_err() {
                tracing::warn!(worker = slot.id, "worker thread exited with a panic");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("status", &self.status())
            .field("timeout", &self.shared.timeout)
            .finish()
    }
}

fn run_worker_loop(id: usize, shared: &Shared, retired: &AtomicBool) {
    while let Ok(job) = shared.rx.recv() {
        shared.queued.fetch_sub(1, Ordering::SeqCst);
        let task_id = job.request.task_id;

        // The caller may already be gone; the task still runs so the queue
        // keeps its order.
        let _ = job.reply.send(WorkerReply::Started {
            worker: id,
            deadline: deadline_after(shared.timeout),
        });

        shared.active.fetch_add(1, Ordering::SeqCst);
        let result = execute(&*shared.executor, job.request);
        shared.active.fetch_sub(1, Ordering::SeqCst);

        let _ = job
            .reply
            .send(WorkerReply::Finished(TaskResponse { task_id, result }));

        if retired.load(Ordering::SeqCst) {
            tracing::debug!(worker = id, "retired worker exiting");
            break;
        }
    }
}

/// `now + timeout`, saturating at a year for absurd timeouts.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 3600))
}

/// Runs `executor`, turning a panic into a task failure.
pub(crate) fn execute(
    executor: &(dyn Fn(&TaskRequest) -> ProcessedView + Send + Sync),
    request: TaskRequest,
) -> Result<ProcessedView, TaskFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| executor(&request))) {
        Ok(view) => Ok(view),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(task = %request.task_id, %message, "task panicked");
            Err(TaskFailure::Panicked { request, message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
