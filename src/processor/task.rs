//! Task envelopes exchanged with a processor.

use crate::model::MasterEvent;
use crate::query::{ProcessOptions, ProcessedView, QueryWindow};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Caller-chosen task identifier, echoed in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a caller-chosen number.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The wrapped number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// One unit of work: run the pipeline over `events` for `window`.
///
/// Events are shared so a failed request can be echoed back cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    /// Echoed in the response.
    pub task_id: TaskId,
    /// Master events to process.
    pub events: Arc<[MasterEvent]>,
    /// Query window.
    pub window: QueryWindow,
    /// Which pipeline steps run.
    pub options: ProcessOptions,
}

impl TaskRequest {
    /// Builds a request, sharing `events` if already in an `Arc`.
    pub fn new(
        task_id: TaskId,
        events: impl Into<Arc<[MasterEvent]>>,
        window: QueryWindow,
        options: ProcessOptions,
    ) -> Self {
        Self {
            task_id,
            events: events.into(),
            window,
            options,
        }
    }
}

/// Outcome of one task.
#[derive(Debug)]
pub struct TaskResponse {
    /// Id of the request this answers.
    pub task_id: TaskId,
    /// The view, or why there is none.
    pub result: Result<ProcessedView, TaskFailure>,
}

/// Why a task produced no view. Every variant carries the original request
/// so the caller can retry it inline.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The task ran longer than the pool's timeout.
    #[error("{} did not finish within {timeout:?}", .request.task_id)]
    Timeout {
        /// The request as submitted.
        request: TaskRequest,
        /// Timeout in force.
        timeout: Duration,
    },

    /// The pipeline panicked.
    #[error("{} panicked: {message}", .request.task_id)]
    Panicked {
        /// The request as submitted.
        request: TaskRequest,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// The pool went away before answering.
    #[error("{} was dropped: worker pool is shut down", .request.task_id)]
    Disconnected {
        /// The request as submitted.
        request: TaskRequest,
    },
}

impl TaskFailure {
    /// The echoed request.
    pub fn request(&self) -> &TaskRequest {
        match self {
            TaskFailure::Timeout { request, .. }
            | TaskFailure::Panicked { request, .. }
            | TaskFailure::Disconnected { request } => request,
        }
    }

    /// Takes the echoed request back, e.g. to retry it inline.
    pub fn into_request(self) -> TaskRequest {
        match self {
            TaskFailure::Timeout { request, .. }
            | TaskFailure::Panicked { request, .. }
            | TaskFailure::Disconnected { request } => request,
        }
    }
}
