//! Debounced validate/synthesize pipeline
//!
//! ```text
//!            edit                 quiet for `debounce`
//!   Idle ──────────► PendingEdit ─────────────────────► Running
//!                     ▲  ▲   │ edit                        │
//!                     │  │   └──────► (window restarts)    │ edit: result goes stale
//!                     │  └─────────────────────────────────┤
//!                     │ edit                               ▼
//!                     └─────────────────────────────── Published
//! ```
//!
//! The [`GenesisPipeline`] is the single writer of its session. Every edit
//! bumps a generation counter and hands a snapshot to the worker task; the
//! worker waits for a quiet period, then validates, synthesizes, renders and
//! size-checks the latest snapshot on a blocking thread. A cycle that finishes
//! after a newer edit arrived is discarded. Report, document and index are
//! published together as one [`Published`] value.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use subnet_genesis::{
    AddressOracle, ArtifactStore, GenesisBuilder, GenesisDocument, GenesisParams, PathIndex,
    Rendered, SynthesisError, Synthesized, paths,
};
use subnet_validation::{ValidationReport, Validator, capacity};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{GenesisSession, PipelineConfig};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The worker task is gone
    #[error("pipeline worker stopped")]
    WorkerStopped,
}

/// Observable pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No edit since spawn; the initial snapshot is published
    Idle,
    /// Waiting out the debounce window
    PendingEdit,
    /// Validating and synthesizing
    Running,
    /// The latest edit's result is published
    Published,
}

/// A synthesized and rendered document
#[derive(Debug)]
pub struct PublishedDocument {
    /// Synthesis output
    pub synthesized: Synthesized,
    /// Serialized text with its path index
    pub rendered: Rendered,
}

/// One atomically published pipeline result
#[derive(Debug)]
pub struct Published {
    /// Generation of the snapshot this was computed from
    pub generation: u64,
    /// Field errors and warnings, including the size check
    pub report: ValidationReport,
    /// The document, or the structural failure that prevented it
    pub output: Result<PublishedDocument, SynthesisError>,
    /// Serialized size against this limit
    pub size_limit: usize,
}

impl Published {
    /// The validation report
    pub const fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// The genesis document
    pub fn document(&self) -> Result<&GenesisDocument, &SynthesisError> {
        self.output.as_ref().map(|output| &output.synthesized.document)
    }

    /// Path index of the rendered document
    pub fn index(&self) -> Option<&PathIndex> {
        self.output.as_ref().ok().map(|output| &output.rendered.index)
    }

    /// Rendered document text
    pub fn text(&self) -> Option<&str> {
        self.output.as_ref().ok().map(|output| output.rendered.text.as_str())
    }

    /// Whether the document may be submitted as-is
    pub fn ready_for_submission(&self) -> bool {
        !self.report.has_errors() &&
            self.output.as_ref().is_ok_and(|output| output.rendered.size() <= self.size_limit)
    }
}

/// Snapshot handed from the writer to the worker
#[derive(Debug, Clone)]
struct Edit {
    generation: u64,
    params: Arc<GenesisParams>,
}

#[derive(Debug)]
struct Shared {
    generation: AtomicU64,
    state: Mutex<PipelineState>,
}

/// Everything a cycle needs besides the snapshot
#[derive(Debug, Clone)]
struct CycleContext {
    oracle: Arc<dyn AddressOracle>,
    artifacts: Arc<ArtifactStore>,
    size_limit: usize,
}

/// Owns a session and keeps a published result in step with it
#[derive(Debug)]
pub struct GenesisPipeline {
    session: GenesisSession,
    shared: Arc<Shared>,
    edits: watch::Sender<Edit>,
    published: watch::Receiver<Arc<Published>>,
    worker: JoinHandle<()>,
}

impl GenesisPipeline {
    /// Spawn the worker task and publish the initial snapshot synchronously.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(session: GenesisSession, artifacts: ArtifactStore, config: PipelineConfig) -> Self {
        let ctx = CycleContext {
            oracle: session.oracle(),
            artifacts: Arc::new(artifacts),
            size_limit: config.size_limit,
        };
        let shared =
            Arc::new(Shared { generation: AtomicU64::new(0), state: Mutex::new(PipelineState::Idle) });

        let initial = Edit { generation: 0, params: Arc::new(session.snapshot()) };
        let first = Arc::new(run_cycle(&initial, &ctx));
        let (published_tx, published) = watch::channel(first);
        let (edits, edits_rx) = watch::channel(initial);

        let worker = Worker {
            config,
            ctx,
            shared: Arc::clone(&shared),
            edits: edits_rx,
            published: published_tx,
        };
        let worker = tokio::spawn(worker.run());

        Self { session, shared, edits, published, worker }
    }

    /// The session, read-only
    pub const fn session(&self) -> &GenesisSession {
        &self.session
    }

    /// Apply an edit to the session. Never blocks and never fails.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut GenesisSession) -> R) -> R {
        let out = f(&mut self.session);
        let params = Arc::new(self.session.snapshot());

        let generation = {
            let mut state = self.shared.state.lock();
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = PipelineState::PendingEdit;
            generation
        };
        // A closed channel means the worker is gone; the edit still lands in the session.
        let _ = self.edits.send(Edit { generation, params });
        out
    }

    /// Generation of the latest edit
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        *self.shared.state.lock()
    }

    /// Latest published result
    pub fn latest(&self) -> Arc<Published> {
        Arc::clone(&self.published.borrow())
    }

    /// Latest published report
    pub fn report(&self) -> ValidationReport {
        self.latest().report.clone()
    }

    /// Latest published document
    pub fn document(&self) -> Option<GenesisDocument> {
        self.latest().document().ok().cloned()
    }

    /// Latest published path index
    pub fn index(&self) -> Option<PathIndex> {
        self.latest().index().cloned()
    }

    /// Subscribe to publishes
    pub fn subscribe(&self) -> watch::Receiver<Arc<Published>> {
        self.published.clone()
    }

    /// Wait until the latest edit has been published
    pub async fn flush(&self) -> Result<Arc<Published>, PipelineError> {
        let target = self.generation();
        let mut rx = self.published.clone();
        let published = rx
            .wait_for(|published| published.generation >= target)
            .await
            .map_err(|_| PipelineError::WorkerStopped)?;
        Ok(Arc::clone(&published))
    }

    /// Stop the worker and hand back the session
    pub async fn shutdown(self) -> GenesisSession {
        let Self { session, edits, worker, .. } = self;
        drop(edits);
        if let Err(err) = worker.await {
            warn!(target: "subnet::pipeline", %err, "Pipeline worker panicked");
        }
        session
    }
}

struct Worker {
    config: PipelineConfig,
    ctx: CycleContext,
    shared: Arc<Shared>,
    edits: watch::Receiver<Edit>,
    published: watch::Sender<Arc<Published>>,
}

impl Worker {
    async fn run(mut self) {
        while self.edits.changed().await.is_ok() {
            if !self.debounce().await {
                break;
            }

            let edit = self.edits.borrow_and_update().clone();
            self.set_state_if_current(edit.generation, PipelineState::Running);

            let ctx = self.ctx.clone();
            let shared = Arc::clone(&self.shared);
            let generation = edit.generation;
            let result = tokio::task::spawn_blocking(move || {
                if is_stale(&shared, generation) {
                    return None;
                }
                let published = run_cycle(&edit, &ctx);
                (!is_stale(&shared, generation)).then_some(published)
            })
            .await;

            match result {
                Ok(Some(published)) => self.publish(published),
                Ok(None) => {
                    debug!(target: "subnet::pipeline", generation, "Discarding stale cycle");
                }
                Err(err) => {
                    warn!(target: "subnet::pipeline", generation, %err, "Pipeline cycle panicked");
                }
            }
        }
        debug!(target: "subnet::pipeline", "Pipeline worker stopped");
    }

    /// Trailing-edge debounce; `false` when the writer went away
    async fn debounce(&mut self) -> bool {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.debounce) => return true,
                changed = self.edits.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                    debug!(target: "subnet::pipeline", "Edit during debounce, restarting window");
                }
            }
        }
    }

    fn publish(&self, published: Published) {
        let generation = published.generation;
        let mut state = self.shared.state.lock();
        if self.shared.generation.load(Ordering::SeqCst) != generation {
            debug!(target: "subnet::pipeline", generation, "Discarding stale cycle");
            return;
        }

        debug!(
            target: "subnet::pipeline",
            generation,
            errors = published.report.errors.len(),
            warnings = published.report.warnings.len(),
            ok = published.output.is_ok(),
            "Publishing"
        );
        self.published.send_replace(Arc::new(published));
        *state = PipelineState::Published;
    }

    fn set_state_if_current(&self, generation: u64, next: PipelineState) {
        let mut state = self.shared.state.lock();
        if self.shared.generation.load(Ordering::SeqCst) == generation {
            *state = next;
        }
    }
}

fn is_stale(shared: &Shared, generation: u64) -> bool {
    shared.generation.load(Ordering::SeqCst) != generation
}

/// Validate, synthesize, render and size-check one snapshot
fn run_cycle(edit: &Edit, ctx: &CycleContext) -> Published {
    let params = &edit.params;
    let mut report =
        Validator::new(ctx.oracle.as_ref()).with_artifacts(&ctx.artifacts).validate(params);

    let output = GenesisBuilder::new(params)
        .with_artifacts(&ctx.artifacts)
        .with_oracle(ctx.oracle.as_ref())
        .build()
        .and_then(|synthesized| {
            let rendered = synthesized.render()?;
            Ok(PublishedDocument { synthesized, rendered })
        });

    match &output {
        Ok(output) => {
            let size = output.rendered.size();
            let check = capacity::validate_size(size, ctx.size_limit);
            if check.warning.is_some() {
                warn!(
                    target: "subnet::pipeline",
                    size,
                    limit = ctx.size_limit,
                    "Genesis exceeds size ceiling"
                );
            }
            report.record(paths::GENESIS, check);
        }
        Err(err) => {
            warn!(target: "subnet::pipeline", generation = edit.generation, %err, "Synthesis failed");
        }
    }

    Published { generation: edit.generation, report, output, size_limit: ctx.size_limit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use subnet_genesis::{Precompile, Predeploy};

    const ADDR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";

    fn config() -> PipelineConfig {
        PipelineConfig::default().with_debounce(Duration::from_millis(20))
    }

    fn session() -> GenesisSession {
        let mut session = GenesisSession::new(54321, "COIN", "COIN");
        session.set_genesis_timestamp(1_700_000_000);
        session.add_allocation(ADDR, "1000000");
        session
    }

    #[tokio::test]
    async fn test_initial_publish_is_synchronous() {
        let pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        let latest = pipeline.latest();
        assert_eq!(latest.generation, 0);
        assert!(latest.report().is_empty(), "{:?}", latest.report());
        assert!(latest.ready_for_submission());
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_last_edit_wins() {
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        pipeline.edit(|s| s.set_chain_id(1));
        pipeline.edit(|s| s.set_chain_id(2));
        pipeline.edit(|s| s.set_chain_id(777));
        assert_eq!(pipeline.state(), PipelineState::PendingEdit);

        let published = pipeline.flush().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Published);
        assert_eq!(published.generation, 3);
        assert_eq!(published.document().unwrap().config.chain_id, 777);
        assert_eq!(pipeline.document().unwrap().config.chain_id, 777);
    }

    #[tokio::test]
    async fn test_report_and_document_advance_together() {
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        pipeline.edit(|s| s.set_allowlist_activated(Precompile::TxAllowList, true));
        let published = pipeline.flush().await.unwrap();

        // Activated with no addresses: reported, yet the block is still emitted.
        assert!(published.report().error("config.txAllowListConfig").is_some());
        assert!(published.document().unwrap().allow_list(Precompile::TxAllowList).is_some());
        assert!(published.index().unwrap().get("txAllowList").is_some());
        assert!(!published.ready_for_submission());
    }

    #[tokio::test]
    async fn test_no_allocations_publishes_failure_with_report() {
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        pipeline.edit(|s| s.remove_allocation(0));
        let published = pipeline.flush().await.unwrap();

        assert_matches!(published.document(), Err(SynthesisError::NoAllocations));
        assert!(published.report().error("tokenAllocations").is_some());
        assert!(published.index().is_none());
        assert!(!published.ready_for_submission());
    }

    #[tokio::test]
    async fn test_size_ceiling_reported_at_genesis() {
        let config = config().with_size_limit(512);
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config);
        pipeline.edit(|s| s.set_preinstall(Predeploy::Create2Deployer, true));
        let published = pipeline.flush().await.unwrap();

        assert!(published.report().warning("genesis").is_some());
        assert!(!published.report().has_errors());
        assert!(published.document().is_ok());
        assert!(!published.ready_for_submission());
    }

    #[tokio::test]
    async fn test_edits_restart_debounce() {
        tokio::time::pause();
        let config = PipelineConfig::default().with_debounce(Duration::from_millis(80));
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config);
        let mut rx = pipeline.subscribe();

        for chain_id in 100..105 {
            pipeline.edit(|s| s.set_chain_id(chain_id));
            tokio::time::advance(Duration::from_millis(10)).await;
        }
        assert!(!rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        let published = Arc::clone(&rx.borrow_and_update());
        assert_eq!(published.generation, 5);
        assert_eq!(published.document().unwrap().config.chain_id, 104);
    }

    #[tokio::test]
    async fn test_sub_second_block_rate_is_carried_and_warned() {
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        pipeline.edit(|s| s.set_target_block_rate(0.4));
        let published = pipeline.flush().await.unwrap();

        assert_eq!(published.document().unwrap().config.fee_config.target_block_rate, 1);
        assert!(published.report().warning("feeConfig.targetBlockRate").is_some());
        assert!(!published.report().has_errors());
    }

    #[test]
    fn test_stale_cycle_is_discarded() {
        let shared = Shared { generation: AtomicU64::new(2), state: Mutex::new(PipelineState::Running) };
        assert!(is_stale(&shared, 1));
        assert!(!is_stale(&shared, 2));
    }

    #[test]
    fn test_cycle_is_idempotent() {
        let ctx = CycleContext {
            oracle: Arc::new(subnet_genesis::HexAddressOracle),
            artifacts: Arc::new(ArtifactStore::new()),
            size_limit: PipelineConfig::default().size_limit,
        };
        let edit = Edit { generation: 1, params: Arc::new(session().snapshot()) };
        let a = run_cycle(&edit, &ctx);
        let b = run_cycle(&edit, &ctx);
        assert_eq!(a.text().unwrap(), b.text().unwrap());
        assert_eq!(a.report, b.report);
    }

    #[tokio::test]
    async fn test_shutdown_returns_session() {
        let mut pipeline = GenesisPipeline::spawn(session(), ArtifactStore::new(), config());
        pipeline.edit(|s| s.set_token_symbol("ABC"));
        let session = pipeline.shutdown().await;
        assert_eq!(session.params().identity.token_symbol, "ABC");
    }
}
