//! A radix tree HTTP router with a minimal async server.
//!
//! This library routes HTTP requests through compressed prefix trees, one per
//! method. Route patterns support static segments, `:name` parameters that
//! capture a single path segment, and a trailing `*name` wildcard that
//! captures the remainder of the path. Lookups walk the tree without
//! allocating; captured parameters are reported through a caller-supplied
//! closure.
//!
//! # Features
//!
//! - Compressed radix trees with static, parameter, and wildcard segments
//! - Zero-allocation lookup with static-first precedence
//! - Per-method routing across the nine common HTTP methods
//! - A one-time bind pass that transforms every registered handler, used by
//!   the server to apply middleware
//! - A small async HTTP server with graceful shutdown and connection limiting
//!
//! # Examples
//!
//! ## Routing
//!
//! ```
//! use microroute_rs::Router;
//!
//! let mut router = Router::new();
//! router.add("GET", "/", "home");
//! router.add("GET", "/users/:id", "user");
//! router.add("GET", "/static/*filepath", "assets");
//!
//! let mut params = Vec::new();
//! let data = router.lookup("GET", "/users/42", |name, value| {
//!     params.push((name.to_string(), value.to_string()));
//! });
//!
//! assert_eq!(data, Some(&"user"));
//! assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use microroute_rs::{HttpResponse, HttpServer, Method, ServerConfig, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = HttpServer::new(ServerConfig::default());
//!
//!     server.add_route("/users/:id", vec![Method::GET], |req| async move {
//!         let id = req.get_param("id").cloned().unwrap_or_default();
//!         Ok(HttpResponse::new(StatusCode::Ok)
//!             .with_content_type("text/plain")
//!             .with_body_string(format!("User {id}")))
//!     });
//!
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! See the `demos` directory for complete programs.

// Export the parser module
pub mod parser;

// Export the routing module
pub mod routing;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use routing::{Router, Tree, METHODS};
pub use server::{
    Error as ServerError, HandlerFn, HandlerFuture, HttpResponse, HttpServer, Middleware,
    ServerConfig, StatusCode,
};
