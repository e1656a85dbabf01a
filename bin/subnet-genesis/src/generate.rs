//! `generate`: write the genesis document

use clap::Parser;
use std::path::PathBuf;
use subnet_genesis::PathIndex;
use tracing::info;

use crate::args::{ParamsArgs, log_report};

/// Generate command arguments
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub params: ParamsArgs,

    /// Output file; stdout when omitted
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Also write the path index as JSON to this file
    #[arg(long)]
    pub index: Option<PathBuf>,
}

impl GenerateArgs {
    /// Run the command
    pub async fn run(&self) -> eyre::Result<()> {
        let published = self.params.publish().await?;
        log_report(&published);

        let (Some(text), Some(index)) = (published.text(), published.index()) else {
            let err = published.document().err().map(ToString::to_string).unwrap_or_default();
            eyre::bail!("genesis synthesis failed: {err}");
        };

        match &self.out {
            Some(path) => {
                std::fs::write(path, text)?;
                info!(
                    target: "subnet::cli",
                    path = %path.display(),
                    bytes = text.len(),
                    ready = published.ready_for_submission(),
                    "Wrote genesis"
                );
            }
            None => println!("{text}"),
        }

        if let Some(path) = &self.index {
            std::fs::write(path, serde_json::to_string_pretty(&index_json(index))?)?;
            info!(target: "subnet::cli", path = %path.display(), paths = index.len(), "Wrote path index");
        }

        Ok(())
    }
}

/// Path index as a JSON object of `path -> {start, end, startLine, endLine}`
pub fn index_json(index: &PathIndex) -> serde_json::Value {
    index
        .iter()
        .map(|(path, span)| {
            (
                path.to_string(),
                serde_json::json!({
                    "start": span.start,
                    "end": span.end,
                    "startLine": span.start_line,
                    "endLine": span.end_line,
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::tests::{PARAMS, write_params};
    use subnet_genesis::constants::MAX_GENESIS_SIZE;

    fn args(dir: &std::path::Path, params: &str) -> GenerateArgs {
        GenerateArgs {
            params: ParamsArgs {
                params: write_params(dir, params),
                artifacts: None,
                wallet: None,
                size_limit: MAX_GENESIS_SIZE,
            },
            out: Some(dir.join("genesis.json")),
            index: Some(dir.join("index.json")),
        }
    }

    #[tokio::test]
    async fn test_generate_writes_document_and_index() {
        let dir = tempfile::tempdir().unwrap();
        args(dir.path(), PARAMS).run().await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("genesis.json")).unwrap();
        let genesis: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(genesis["config"]["chainId"], 54321);
        assert_eq!(genesis["timestamp"], "0x6553f100");

        let index: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("index.json")).unwrap())
                .unwrap();
        let span = &index["config.chainId"];
        let start = span["start"].as_u64().unwrap() as usize;
        let end = span["end"].as_u64().unwrap() as usize;
        assert_eq!(&text[start..end], "54321");
    }

    #[tokio::test]
    async fn test_generate_pins_wallet_admin() {
        let dir = tempfile::tempdir().unwrap();
        let params = format!("{PARAMS}\n[allowlists.txAllowList]\nactivated = true\n");
        let mut args = args(dir.path(), &params);
        args.params.wallet = Some(alloy_primitives::Address::repeat_byte(0x42));
        args.run().await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("genesis.json")).unwrap();
        let genesis: serde_json::Value = serde_json::from_str(&text).unwrap();
        let admins = genesis["config"]["txAllowListConfig"]["adminAddresses"].as_array().unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(
            admins[0].as_str().unwrap().to_lowercase(),
            "0x4242424242424242424242424242424242424242"
        );
    }

    #[tokio::test]
    async fn test_generate_fails_without_allocations() {
        let dir = tempfile::tempdir().unwrap();
        let err = args(dir.path(), "[identity]\nchainId = 1\n").run().await.unwrap_err();
        assert!(err.to_string().contains("at least one token allocation"));
        assert!(!dir.path().join("genesis.json").exists());
    }
}
