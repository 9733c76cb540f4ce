//! shutterlog server binary.

use shutterlog::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present, then layered config (file + environment)
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    shutterlog::start_server(config).await?;

    Ok(())
}
