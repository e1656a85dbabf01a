//! `index`: print the path index

use clap::Parser;

use crate::args::ParamsArgs;

/// Index command arguments
#[derive(Debug, Parser)]
pub struct IndexArgs {
    #[command(flatten)]
    pub params: ParamsArgs,

    /// Print only the text at this path, or at its nearest indexed ancestor
    #[arg(long)]
    pub path: Option<String>,
}

impl IndexArgs {
    /// Run the command
    pub async fn run(&self) -> eyre::Result<()> {
        let published = self.params.publish().await?;
        let (Some(text), Some(index)) = (published.text(), published.index()) else {
            let err = published.document().err().map(ToString::to_string).unwrap_or_default();
            eyre::bail!("genesis synthesis failed: {err}");
        };

        match &self.path {
            Some(path) => {
                let Some((found, span)) = index.resolve(path) else {
                    eyre::bail!("path {path} is not in the document");
                };
                if found != path {
                    tracing::info!(target: "subnet::cli", requested = %path, %found, "Resolved to ancestor");
                }
                println!("{}", span.text(text));
            }
            None => {
                for (path, span) in index.iter() {
                    println!(
                        "{path}\t{}..{}\tlines {}-{}",
                        span.start, span.end, span.start_line, span.end_line
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::tests::{PARAMS, write_params};
    use subnet_genesis::constants::MAX_GENESIS_SIZE;

    fn args(dir: &std::path::Path, path: Option<&str>) -> IndexArgs {
        IndexArgs {
            params: ParamsArgs {
                params: write_params(dir, PARAMS),
                artifacts: None,
                wallet: None,
                size_limit: MAX_GENESIS_SIZE,
            },
            path: path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_index_paths() {
        let dir = tempfile::tempdir().unwrap();
        args(dir.path(), None).run().await.unwrap();
        args(dir.path(), Some("tokenAllocations.0.address")).run().await.unwrap();
        assert!(args(dir.path(), Some("nothing.here")).run().await.is_err());
    }
}
