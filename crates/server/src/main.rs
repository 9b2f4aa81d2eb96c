//! HTTP server binary for app-store review analysis.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Model credentials usually arrive via a local .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
