//! Insta Server - Main entry point

use anyhow::Result;
use insta_common::logging::{init_logging, LogConfig};
use tracing::info;

use insta_server::{api, config::Config, store};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("insta-server")
        .filter_directives("insta_server=debug,tower_http=debug,sqlx=info")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting Insta Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );
    info!(
        backend = %config.store.backend,
        database = %config.store.database,
        decode_policy = %config.codec.decode_policy,
        "Store configuration"
    );

    let gateway = store::connect(&config.store).await?;

    api::serve(config, gateway).await
}
