//! HTTP and WebSocket route tree

use log::debug;
use std::convert::Infallible;
use warp::{Filter, Rejection, Reply};

use crate::config::ServerConfig;
use crate::constants::WS_PATH;
use crate::core::router::SharedRouter;
use crate::handlers::websocket::handle_ws_client;

/// Build every route the relay serves: `/ws`, `/health` and `/stats`
pub fn routes(
    router: SharedRouter,
    config: &ServerConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let max_message_size = config.max_message_size;

    let ws_route = warp::path(WS_PATH)
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_router(router.clone()))
        .map(move |ws: warp::ws::Ws, router: SharedRouter| {
            debug!("New websocket connection");
            ws.max_message_size(max_message_size)
                .on_upgrade(move |socket| handle_ws_client(socket, router))
        });

    let health_route = warp::path("health").and(warp::path::end()).map(|| "OK");

    let stats_route = warp::path("stats")
        .and(warp::path::end())
        .and(with_router(router))
        .and_then(stats_handler);

    ws_route.or(health_route).or(stats_route)
}

async fn stats_handler(router: SharedRouter) -> std::result::Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&router.stats().await))
}

// Helper function to include the router in request handlers
fn with_router(
    router: SharedRouter,
) -> impl Filter<Extract = (SharedRouter,), Error = Infallible> + Clone {
    warp::any().map(move || router.clone())
}
