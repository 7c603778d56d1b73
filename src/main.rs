use anyhow::Result;
use mosher::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
