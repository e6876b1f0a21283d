//! HTTP server implementation for microroute-rs.
//!
//! This module provides a simple, efficient HTTP server that dispatches
//! requests through the radix tree router and leverages Rust's concurrency
//! features and the microroute-rs parser.

mod response;
mod config;
mod error;
mod handler;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Middleware};
pub use http_server::HttpServer;
