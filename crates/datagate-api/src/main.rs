use anyhow::Result;
use datagate_api::setup::{initialize_app, server::start_server};
use datagate_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    datagate_api::telemetry::init_tracing();

    let config = Config::from_env()?;

    let (_state, app) = initialize_app(config.clone()).await?;

    start_server(&config, app).await?;

    Ok(())
}
