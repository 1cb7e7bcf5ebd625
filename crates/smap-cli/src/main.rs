//! Entrypoint for the `smap` binary.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    smap_cli::run().await
}
