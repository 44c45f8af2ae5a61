//! In-process work queue, delayed scheduling and the recurring import timer.
//!
//! Tasks are delivered at least once to a consumer that spawns each of them
//! independently, so there is no ordering between tasks of different SKUs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::domain::task::SyncTask;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The consumer side has shut down.
    #[error("task queue is closed")]
    Closed,
    /// Delayed scheduling was requested outside of a tokio runtime.
    #[error("no async runtime available for delayed task")]
    NoRuntime,
}

/// Destination for sync tasks.
pub trait TaskQueue: Send + Sync {
    /// Queue a task for immediate execution.
    fn enqueue(&self, task: SyncTask) -> Result<(), QueueError>;
    /// Queue a task once `at` has passed.
    fn schedule_single(&self, at: DateTime<Utc>, task: SyncTask) -> Result<(), QueueError>;
}

/// Executes dequeued tasks.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: SyncTask);
}

/// [`TaskQueue`] backed by an unbounded tokio channel.
#[derive(Clone)]
pub struct TokioTaskQueue {
    sender: UnboundedSender<SyncTask>,
}

impl TokioTaskQueue {
    /// Create the queue and the receiver to pass to [`run_consumer`].
    pub fn new() -> (Self, UnboundedReceiver<SyncTask>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl TaskQueue for TokioTaskQueue {
    fn enqueue(&self, task: SyncTask) -> Result<(), QueueError> {
        self.sender.send(task).map_err(|_| QueueError::Closed)
    }

    fn schedule_single(&self, at: DateTime<Utc>, task: SyncTask) -> Result<(), QueueError> {
        if self.sender.is_closed() {
            return Err(QueueError::Closed);
        }
        let handle = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        let delay = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let sender = self.sender.clone();

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let kind = task.kind();
            if sender.send(task).is_err() {
                log::warn!("Dropped delayed {kind} task: queue closed");
            }
        });
        Ok(())
    }
}

/// Drain the queue, spawning one task per job until every sender is dropped.
pub async fn run_consumer<H>(mut receiver: UnboundedReceiver<SyncTask>, handler: Arc<H>)
where
    H: TaskHandler + 'static,
{
    while let Some(task) = receiver.recv().await {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(task).await;
        });
    }
    log::info!("Task queue closed, consumer stopped");
}

/// Enqueue [`SyncTask::StartImport`] now and then once per `period`.
pub async fn run_schedule<Q>(queue: Q, period: Duration)
where
    Q: TaskQueue,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = queue.enqueue(SyncTask::StartImport) {
            log::error!("Stopping import schedule: {e}");
            break;
        }
    }
}
