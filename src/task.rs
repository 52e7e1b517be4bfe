//! # Analysis Task Module
//!
//! ## Purpose
//! The observable asynchronous result primitive used throughout the engine in
//! place of ad hoc callbacks. An `AnalysisTask` wraps one computation, runs
//! it on a worker task, and exposes its Pending/Succeeded/Failed state for a
//! client that must never block on a network round trip.
//!
//! ## Input/Output Specification
//! - **Input**: one asynchronous computation producing `Result<T>`
//! - **Output**: non-blocking `status`/`result`/`error` polls plus an
//!   exactly-once completion notification
//! - **States**: Pending -> Succeeded | Failed, terminal once resolved
//!
//! ## Key Features
//! - Spawning never blocks the caller; the computation is driven by the
//!   runtime on worker threads
//! - Observers subscribe to a completion channel and receive the change on
//!   their own context, so a single-threaded consumer marshals the
//!   notification itself
//! - Replaced task generations are aborted, not awaited

use crate::errors::{AnalysisError, Result};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Externally observable task state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

enum TaskState<T> {
    Pending,
    Succeeded(Arc<T>),
    Failed(AnalysisError),
}

struct TaskShared<T> {
    state: RwLock<TaskState<T>>,
    completion: watch::Sender<TaskStatus>,
}

impl<T> TaskShared<T> {
    /// Resolve the task exactly once. A second resolution attempt indicates
    /// a broken invariant and is dropped with an error log instead of
    /// corrupting the terminal state.
    fn complete(&self, outcome: Result<T>) {
        let mut state = self.state.write();
        if !matches!(*state, TaskState::Pending) {
            tracing::error!("analysis task resolved twice; keeping first outcome");
            return;
        }

        let status = match outcome {
            Ok(value) => {
                *state = TaskState::Succeeded(Arc::new(value));
                TaskStatus::Succeeded
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::debug!(error = %err, "analysis task completed without a result");
                } else {
                    tracing::warn!(error = %err, category = err.category(), "analysis task failed");
                }
                *state = TaskState::Failed(err);
                TaskStatus::Failed
            }
        };
        drop(state);

        self.completion.send_replace(status);
    }
}

/// Single-assignment observable wrapper around one asynchronous analysis.
///
/// Owned by the coordinator that created it; consumers only read. All read
/// accessors take a short lock and never await, so they are safe to call
/// from any thread at any time.
pub struct AnalysisTask<T> {
    shared: Arc<TaskShared<T>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<T> AnalysisTask<T>
where
    T: Send + Sync + 'static,
{
    /// Start the computation immediately and return the observable handle.
    ///
    /// The computation runs on the runtime's worker pool; this constructor
    /// only spawns and returns.
    pub fn spawn<F>(computation: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (completion, _) = watch::channel(TaskStatus::Pending);
        let shared = Arc::new(TaskShared {
            state: RwLock::new(TaskState::Pending),
            completion,
        });

        let driver = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                let outcome = computation.await;
                shared.complete(outcome);
            }
        });

        Self {
            shared,
            driver: Mutex::new(Some(driver)),
        }
    }

    /// Current state, without blocking
    pub fn status(&self) -> TaskStatus {
        match *self.shared.state.read() {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Succeeded(_) => TaskStatus::Succeeded,
            TaskState::Failed(_) => TaskStatus::Failed,
        }
    }

    /// The value, only present once the task has Succeeded
    pub fn result(&self) -> Option<Arc<T>> {
        match &*self.shared.state.read() {
            TaskState::Succeeded(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// The error, only present once the task has Failed
    pub fn error(&self) -> Option<AnalysisError> {
        match &*self.shared.state.read() {
            TaskState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Subscribe to the completion notification. The change is observed on
    /// whatever context awaits the receiver, which is how a single-threaded
    /// consumer gets the notification on its own thread.
    pub fn subscribe(&self) -> watch::Receiver<TaskStatus> {
        self.shared.completion.subscribe()
    }

    /// Await the terminal status. Returns immediately if already resolved.
    pub async fn wait(&self) -> TaskStatus {
        let mut rx = self.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                return self.status();
            }
        }
    }

    /// Stop driving the computation. A task aborted while Pending stays
    /// Pending forever; callers replace the handle rather than reuse it.
    pub fn abort(&self) {
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }
}
