use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use relay_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    relay_core::logging::init("relay")?;

    let cfg = Arc::new(Config::load()?);
    info!(
        database = %cfg.database_path.display(),
        topic_name_limit = cfg.topic_name_limit,
        "configuration loaded"
    );

    relay_telegram::router::run_polling(cfg)
        .await
        .context("telegram bot failed")?;

    Ok(())
}
