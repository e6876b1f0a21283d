//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// How long to wait for in-flight connections during graceful shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8080).into(),
            max_connections: 1024,
            read_buffer_size: 8192,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}
