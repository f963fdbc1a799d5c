//! Block batch driver.
pub mod balances;
pub mod snapshots;
pub mod workflow;

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use crate::constants::POLL_INTERVAL_MS;
use crate::core::node::NodeError;
use crate::core::types::Head;
use crate::core::types::Height;
use crate::core::Node;
use crate::monitor::MonitorMessage;
use crate::store::postgres::PgStore;
use crate::store::StoreError;
pub use workflow::BatchSummary;
pub use workflow::ProcessError;
pub use workflow::Workflow;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("expected block {expected}, got {actual}")]
    Gap { expected: Height, actual: Height },
}

/// Pulls batches of blocks from the archive and feeds them to the workflow,
/// one database transaction per batch.
pub struct Worker {
    id: String,
    node: Node,
    store: PgStore,
    workflow: Workflow,
    start_height: Height,
    batch_size: i32,
    monitor_tx: Sender<MonitorMessage>,
}

impl Worker {
    pub fn new(
        id: &str,
        node: Node,
        store: PgStore,
        workflow: Workflow,
        start_height: Height,
        batch_size: i32,
        monitor_tx: Sender<MonitorMessage>,
    ) -> Self {
        Self {
            id: String::from(id),
            node,
            store,
            workflow,
            start_height,
            batch_size,
            monitor_tx,
        }
    }

    /// Runs until ctrl-c or the first failure.
    pub async fn start(&mut self) -> Result<(), WorkerError> {
        let head = self.store.get_head();
        if head.is_initial() {
            tracing::info!("[{}] empty store, starting at {}", self.id, self.start_height);
        } else {
            tracing::info!("[{}] resuming after block {}", self.id, head.height);
        }
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("[{}] got a ctrl-c message", self.id);
                    return Ok(());
                },
                progressed = self.step() => {
                    if !progressed? {
                        tracing::debug!("[{}] waiting for new blocks", self.id);
                        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
                    }
                },
            }
        }
    }

    /// Processes the next batch, if any. Returns false when caught up.
    async fn step(&mut self) -> Result<bool, WorkerError> {
        let head = self.store.get_head().clone();
        let from = (head.height + 1).max(self.start_height);
        let tip = self.node.height().await?;
        if from > tip {
            return Ok(false);
        }
        let to = (from + self.batch_size - 1).min(tip);
        let blocks = self.node.blocks(from, to).await?;
        for (expected, block) in (from..).zip(&blocks) {
            if block.header.height != expected {
                return Err(WorkerError::Gap {
                    expected,
                    actual: block.header.height,
                });
            }
        }
        let Some(last) = blocks.last() else {
            return Ok(false);
        };
        let new_head = Head::from(&last.header);

        let mut tx = self.store.begin().await?;
        let summary = self.workflow.process_batch(&mut tx, &blocks).await?;
        tx.commit(&new_head).await?;
        self.store.set_head(new_head.clone());

        tracing::info!(
            "[{}] processed blocks {}-{} ({} actions)",
            self.id,
            from,
            new_head.height,
            summary.actions
        );
        self.notify(MonitorMessage::Processed(new_head.height)).await;
        if let Some(height) = summary.snapshots.last() {
            self.notify(MonitorMessage::Snapshot(*height)).await;
        }
        Ok(true)
    }

    async fn notify(&self, msg: MonitorMessage) {
        if let Err(e) = self.monitor_tx.send(msg).await {
            tracing::warn!("[{}] monitor unavailable: {e}", self.id);
        }
    }
}
