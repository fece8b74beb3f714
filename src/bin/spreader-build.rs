//! Configure, build and install the spreader JavaScript package

use anyhow::Result;
use spreader_tasks::cli::{self, Cli, PipelineKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();
    cli::init_logging(cli.verbose)?;

    let outcome = cli::run(PipelineKind::Build, &cli).await?;
    std::process::exit(outcome.code());
}
