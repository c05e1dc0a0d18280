//! Execution strategies for the view pipeline.
//!
//! A [`Processor`] is chosen once at startup: a pool of worker threads when
//! parallelism is available and enabled, otherwise inline execution on the
//! caller's thread. Both run the same deterministic pipeline, so a view never
//! depends on which one produced it.

mod pool;
mod task;

pub use pool::{PoolStatus, TaskHandle, WorkerPool};
pub use task::{TaskFailure, TaskId, TaskRequest, TaskResponse};

use crate::query::process;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

/// Inputs to [`Processor::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// `false` always selects inline processing.
    pub workers_enabled: bool,
    /// Worker threads to spawn; below 2 selects inline processing.
    pub pool_size: usize,
    /// Longest a task may run once a worker picks it up.
    pub task_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers_enabled: true,
            pool_size: available_workers(),
            task_timeout: Duration::from_secs(30),
        }
    }
}

/// Hardware threads available to this process, at least 1.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Which strategy a processor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Worker threads.
    Pool,
    /// Caller's thread.
    Inline,
}

/// Status of a processor, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessorStatus {
    /// Strategy in use.
    pub strategy: Strategy,
    /// Pool load; all zero when inline.
    #[serde(flatten)]
    pub pool: PoolStatus,
}

/// The selected execution strategy.
#[derive(Debug)]
pub enum Processor {
    /// Tasks run on a worker pool.
    Pool(WorkerPool),
    /// Tasks run on the calling thread.
    Inline,
}

impl Processor {
    /// Picks the strategy once. Falls back to inline when workers are
    /// disabled, only one hardware thread exists, or spawning fails.
    pub fn select(config: &ProcessorConfig) -> Self {
        if !config.workers_enabled {
            tracing::info!("worker pool disabled, processing inline");
            return Processor::Inline;
        }
        if available_workers() < 2 || config.pool_size < 2 {
            tracing::info!(
                pool_size = config.pool_size,
                "no parallelism available, processing inline"
            );
            return Processor::Inline;
        }
        match WorkerPool::new(config.pool_size, config.task_timeout) {
            Ok(pool) => Processor::Pool(pool),
            Err(err) => {
                tracing::warn!(error = %err, "failed to start worker pool, processing inline");
                Processor::Inline
            }
        }
    }

    /// Which strategy was selected.
    pub fn strategy(&self) -> Strategy {
        match self {
            Processor::Pool(_) => Strategy::Pool,
            Processor::Inline => Strategy::Inline,
        }
    }

    /// Runs one task to completion.
    pub fn run(&self, request: TaskRequest) -> TaskResponse {
        match self {
            Processor::Pool(pool) => pool.run(request),
            Processor::Inline => run_inline(request),
        }
    }

    /// Runs many tasks; responses are in request order.
    pub fn run_batch(&self, requests: Vec<TaskRequest>) -> Vec<TaskResponse> {
        match self {
            Processor::Pool(pool) => pool.run_batch(requests),
            Processor::Inline => requests.into_iter().map(run_inline).collect(),
        }
    }

    /// Strategy plus pool load.
    pub fn status(&self) -> ProcessorStatus {
        ProcessorStatus {
            strategy: self.strategy(),
            pool: match self {
                Processor::Pool(pool) => pool.status(),
                Processor::Inline => PoolStatus::default(),
            },
        }
    }
}

/// Runs a task on the calling thread. Panics still become failures; there is
/// no timeout.
pub fn run_inline(request: TaskRequest) -> TaskResponse {
    let task_id = request.task_id;
    let result = pool::execute(
        &|request: &TaskRequest| process(&request.events, &request.window, &request.options),
        request,
    );
    TaskResponse { task_id, result }
}
