use log::{error, info, warn};

use presence_relay::config::ServerConfig;
use presence_relay::core::create_router;
use presence_relay::handlers::routes;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("No .env file loaded: {}", e),
    };

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, max_message_size={}",
        config.host, config.port, config.max_message_size
    );

    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let router = create_router();
    let routes = routes(router.clone(), &config);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    let (bound, server) = match warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, shutdown_signal)
    {
        Ok(bound) => bound,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Presence relay listening on ws://{}/ws", bound);
    server.await;

    // Close whatever is still connected before exiting
    router.shutdown().await;
    info!("Server stopped");
}
