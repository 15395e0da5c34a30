// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const WS_PATH: &str = "ws";

// Upper bound for a single inbound WebSocket frame
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;
