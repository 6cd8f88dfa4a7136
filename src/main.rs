use clap::Parser;

use aqi_processor::cli::{run, Cli};
use aqi_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
