//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};

/// Errors that can occur while serving a connection.
///
/// The routing outcomes (`NotFound`, `MethodNotAllowed`) are produced by the
/// dispatch path after the router has been consulted; the connection handler
/// writes the matching 404/405 response before returning them.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be parsed; answered with a 400.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error on the socket or listener.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No tree holds a route for the path, under any method. Carries the
    /// raw request path, query string included.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The path is registered, but under different methods. The 405
    /// response lists those methods in its `Allow` header.
    #[error("Method {0} not allowed for path: {1}")]
    MethodNotAllowed(Method, String),

    /// A handler failed; answered with a 500.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
