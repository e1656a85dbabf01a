//! Subnet Genesis Pipeline
//!
//! Session-scoped configuration aggregate plus the debounced controller that
//! keeps a validation report, genesis document and path index in step with
//! it.
//!
//! ```rust,no_run
//! use subnet_genesis::ArtifactStore;
//! use subnet_pipeline::{GenesisPipeline, GenesisSession, PipelineConfig};
//!
//! # async fn demo() -> Result<(), subnet_pipeline::PipelineError> {
//! let mut session = GenesisSession::new(54321, "COIN", "COIN");
//! session.add_allocation("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1", "1000000");
//!
//! let mut pipeline = GenesisPipeline::spawn(session, ArtifactStore::new(), PipelineConfig::default());
//! pipeline.edit(|s| s.set_max_block_gas_cost(2_000_000));
//! let published = pipeline.flush().await?;
//! assert!(published.ready_for_submission());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod controller;
pub mod session;

pub use config::{ParamsError, PipelineConfig, load_params};
pub use controller::{GenesisPipeline, PipelineError, PipelineState, Published, PublishedDocument};
pub use session::GenesisSession;
