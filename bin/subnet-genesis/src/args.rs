//! Arguments shared by every command

use alloy_primitives::Address;
use clap::Args;
use std::{path::PathBuf, sync::Arc, time::Duration};
use subnet_genesis::{ArtifactStore, Precompile, StaticWallet, constants::MAX_GENESIS_SIZE};
use subnet_pipeline::{GenesisPipeline, GenesisSession, PipelineConfig, Published, load_params};
use tracing::{debug, info, warn};

/// Where the parameters and bytecode come from
#[derive(Debug, Clone, Args)]
pub struct ParamsArgs {
    /// Parameter file (.toml or .json)
    #[arg(long, short = 'p', env = "SUBNET_GENESIS_PARAMS")]
    pub params: PathBuf,

    /// Directory of predeploy bytecode, one `<name>.hex` file per contract
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Connected wallet; pinned as first admin of activated allowlists with no admin
    #[arg(long)]
    pub wallet: Option<Address>,

    /// Serialized size ceiling in bytes
    #[arg(long, default_value_t = MAX_GENESIS_SIZE)]
    pub size_limit: usize,
}

impl ParamsArgs {
    /// Load the parameters and run them through the pipeline once
    pub async fn publish(&self) -> eyre::Result<Arc<Published>> {
        let params = load_params(&self.params)?;
        info!(
            target: "subnet::cli",
            path = %self.params.display(),
            chain_id = params.identity.chain_id,
            allocations = params.allocations.len(),
            "Loaded parameters"
        );

        let artifacts = match &self.artifacts {
            Some(dir) => ArtifactStore::load_dir(dir)?,
            None => ArtifactStore::new(),
        };
        debug!(target: "subnet::cli", artifacts = artifacts.len(), "Loaded predeploy artifacts");

        let mut session = GenesisSession::from_params(params);
        if let Some(wallet) = self.wallet {
            session = session.with_wallet(Arc::new(StaticWallet(wallet)));
        }

        let config = PipelineConfig::default()
            .with_debounce(Duration::ZERO)
            .with_size_limit(self.size_limit);
        let mut pipeline = GenesisPipeline::spawn(session, artifacts, config);

        if self.wallet.is_some() {
            // Re-activating pins the wallet wherever the Admin bucket is empty.
            pipeline.edit(|session| {
                let activated: Vec<Precompile> = session
                    .params()
                    .allowlists
                    .iter()
                    .filter(|(_, config)| config.activated)
                    .map(|(precompile, _)| precompile)
                    .collect();
                for precompile in activated {
                    session.set_allowlist_activated(precompile, true);
                }
            });
        }

        let published = pipeline.flush().await?;
        pipeline.shutdown().await;
        Ok(published)
    }
}

/// Log every error and warning in the report
pub fn log_report(published: &Published) {
    for (path, message) in &published.report.errors {
        warn!(target: "subnet::cli", %path, "error: {message}");
    }
    for (path, message) in &published.report.warnings {
        warn!(target: "subnet::cli", %path, "warning: {message}");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::{Path, PathBuf};

    pub(crate) const PARAMS: &str = r#"
[identity]
chainId = 54321
tokenName = "COIN"
tokenSymbol = "COIN"
genesisTimestamp = 1700000000

[[allocations]]
address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1"
amount = "1000000"
"#;

    pub(crate) fn write_params(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("params.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }
}
