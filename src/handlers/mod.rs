//! Request handlers for different server endpoints

pub mod routes;
pub mod websocket;

pub use routes::routes;
pub use websocket::handle_ws_client;
