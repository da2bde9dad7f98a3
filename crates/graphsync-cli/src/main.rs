//! graphsync: sync code structure into Neo4j

use clap::Parser;
use graphsync_cli::commands::sync;
use graphsync_cli::{Cli, Commands, setup_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Sync(args) => {
            sync::run(&args).await?;
        }
    }

    Ok(())
}
