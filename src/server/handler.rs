//! HTTP request handler and middleware types.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
///
/// Handlers are stored inside the routing trees; the `Arc` makes them cheap
/// to clone between tree nodes and connection tasks.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// A middleware layer: takes a handler and returns the wrapped handler.
///
/// Layers are applied to every registered handler through the router's bind
/// pass when the server seals its routes, so routes and middleware may be
/// declared in either order.
pub type Middleware = Arc<dyn Fn(HandlerFn) -> HandlerFn + Send + Sync>;
