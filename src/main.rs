use anyhow::Result;
use clap::Parser;
use spendboard::cli::{init_tracing, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}
