//! Per-batch processing of blocks into the read model.
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::balances::BalanceReconciler;
use super::snapshots::Snapshotter;
use crate::actions::pipeline;
use crate::actions::pipeline::Env;
use crate::actions::pipeline::PipelineError;
use crate::config::Config;
use crate::config::IngestFilter;
use crate::core::node::NodeError;
use crate::core::oracle::RuntimeOracle;
use crate::core::ss58::AddressCodec;
use crate::core::types::Block;
use crate::core::types::Height;
use crate::core::types::SpecVersion;
use crate::decoding::unknown_items;
use crate::decoding::DecodeError;
use crate::evm::introspection::TokenIntrospector;
use crate::handlers::block_actions;
use crate::handlers::HandlerError;
use crate::store::EntityStore;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error("expected {expected} values of `{item}`, got {actual}")]
    StorageMismatch {
        item: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub blocks: usize,
    pub actions: usize,
    /// Heights at which chain states got written.
    pub snapshots: Vec<Height>,
}

pub struct Workflow {
    codec: AddressCodec,
    filter: IngestFilter,
    token_call_timeout: Duration,
    oracle: Arc<dyn RuntimeOracle>,
    introspector: Arc<dyn TokenIntrospector>,
    balances: BalanceReconciler,
    snapshotter: Snapshotter,
    spec_version: Option<SpecVersion>,
}

impl Workflow {
    pub fn new(
        config: &Config,
        oracle: Arc<dyn RuntimeOracle>,
        introspector: Arc<dyn TokenIntrospector>,
    ) -> Self {
        Self {
            codec: config.codec(),
            filter: config.filter.clone(),
            token_call_timeout: config.token_call_timeout,
            oracle,
            introspector,
            balances: BalanceReconciler::new(),
            snapshotter: Snapshotter::new(config.snapshot_interval_ms),
            spec_version: None,
        }
    }

    /// Processes consecutive `blocks` against `store`.
    ///
    /// Touched balances get reconciled at the end of the batch and before
    /// each snapshot.
    #[tracing::instrument(skip_all, fields(
        from = blocks.first().map(|b| b.header.height),
        to = blocks.last().map(|b| b.header.height),
    ))]
    pub async fn process_batch(
        &mut self,
        store: &mut dyn EntityStore,
        blocks: &[Block],
    ) -> Result<BatchSummary, ProcessError> {
        let mut summary = BatchSummary::default();
        for block in blocks {
            summary.actions += self.process_block(store, block).await?;
            summary.blocks += 1;

            if self.snapshotter.is_due(store, block).await? {
                self.balances
                    .flush(store, self.oracle.as_ref(), block, &self.codec)
                    .await?;
                let record = self
                    .snapshotter
                    .snapshot(store, self.oracle.as_ref(), block, &self.codec)
                    .await?;
                summary.snapshots.push(record.height);
            }
        }
        if let Some(last) = blocks.last() {
            self.balances
                .flush(store, self.oracle.as_ref(), last, &self.codec)
                .await?;
        }
        Ok(summary)
    }

    /// Runs handlers and actions of a single block, returning the number
    /// of executed actions.
    async fn process_block(
        &mut self,
        store: &mut dyn EntityStore,
        block: &Block,
    ) -> Result<usize, ProcessError> {
        self.check_runtime(block);
        let actions = block_actions(block, &self.codec, &self.filter)?;
        let mut env = Env {
            store,
            introspector: self.introspector.as_ref(),
            token_call_timeout: self.token_call_timeout,
        };
        let executed = pipeline::process(&mut env, actions).await?;
        self.balances.scan(block, &self.codec, &self.filter)?;
        Ok(executed)
    }

    /// Warns about catalogued items a new runtime declares under unknown
    /// fingerprints. Decoding them fails, so better know early.
    fn check_runtime(&mut self, block: &Block) {
        let spec_version = block.runtime.spec_version;
        if self.spec_version == Some(spec_version) {
            return;
        }
        tracing::info!("runtime {} v{}", block.runtime.spec_name, spec_version);
        let unknown = unknown_items(&block.runtime);
        if !unknown.is_empty() {
            tracing::warn!(
                "runtime v{} has unsupported versions of: {}",
                spec_version,
                unknown.join(", ")
            );
        }
        self.spec_version = Some(spec_version);
    }
}
