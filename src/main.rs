use anyhow::{Context, Result};
use dotenv::dotenv;
use log::{error, info, warn};

use dbc_fee_desk::{config, server, state::State};

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize environment variables
    dotenv().ok();

    // Initialize logging
    init_logger();

    info!("Starting DBC fee desk...");

    // Load configuration
    let config = config::load_config()?;
    info!("Configuration loaded");

    // Missing chain settings only disable the endpoints that need them
    if let Err(e) = config.rpc_url() {
        warn!("{}; chain-backed endpoints will answer with 500", e);
    }
    if let Err(e) = config.pool_config() {
        warn!("{}; pool and fee endpoints will answer with 500", e);
    }

    let server = server::init_server(State::from_config(config)).context("Failed to bind HTTP server")?;
    let handle = server.handle();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server stopped with error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            handle.stop(true).await;
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logger() {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
}
