//! Rebuild, install and run the spreader JavaScript test suite

use anyhow::Result;
use spreader_tasks::cli::{self, Cli, PipelineKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();
    cli::init_logging(cli.verbose)?;

    let outcome = cli::run(PipelineKind::Test, &cli).await?;
    std::process::exit(outcome.code());
}
