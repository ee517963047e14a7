use log::{error, info, warn};

use rusty_relay::config::ServerConfig;
use rusty_relay::core::RelayServer;

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    // Load config (JSON file + env overrides, defaults on failure)
    let config = ServerConfig::load();

    info!(
        "Configuration: host={}, port={}, {} banned words",
        config.host,
        config.port,
        config.banned_words.len()
    );

    let server = match RelayServer::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    info!("Starting Rusty Relay server on {}", config.addr());

    // Run until Ctrl-C, then close all open connections
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
}
