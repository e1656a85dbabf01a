//! `check`: print the validation report

use clap::Parser;

use crate::args::ParamsArgs;

/// Check command arguments
#[derive(Debug, Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub params: ParamsArgs,
}

impl CheckArgs {
    /// Run the command; fails when the document is not ready for submission
    pub async fn run(&self) -> eyre::Result<()> {
        let published = self.params.publish().await?;
        println!("{}", serde_json::to_string_pretty(published.report())?);

        if let Err(err) = published.document() {
            eyre::bail!("genesis synthesis failed: {err}");
        }
        if !published.ready_for_submission() {
            eyre::bail!(
                "genesis is not ready for submission: {} error(s), {} warning(s)",
                published.report.errors.len(),
                published.report.warnings.len()
            );
        }
        Ok(())
    }
}
