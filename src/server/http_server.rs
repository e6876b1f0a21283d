//! HTTP server implementation.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::signal;
use log::{info, warn, error};

use crate::parser::{Method, parse_request};
use crate::routing::Router;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{HandlerFn, HandlerFuture, Middleware};
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server that dispatches requests through a radix [`Router`].
///
/// Routes and middleware are registered during single-threaded startup.
/// Starting the server seals the router: middleware layers are applied to
/// every handler via the router's bind pass, and the finished router is
/// shared read-only across connection tasks, so request dispatch takes no
/// locks.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// One routing tree per HTTP method.
    router: Router<HandlerFn>,
    /// Middleware layers, outermost first, applied when the router is sealed.
    middleware: Vec<Middleware>,
    /// Registered (method, path) pairs, kept for the startup banner.
    endpoints: Vec<(Method, String)>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            middleware: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Register a handler for the given path pattern and methods.
    ///
    /// The pattern may contain `:name` parameters and a trailing `*name`
    /// wildcard; captured values are available through
    /// [`HttpRequest::get_param`](crate::parser::HttpRequest::get_param).
    pub fn add_route<F, Fut>(&mut self, path: impl Into<String>, methods: Vec<Method>, handler: F)
    where
        F: Fn(crate::parser::HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let path = path.into();
        let handler: HandlerFn = Arc::new(move |req| -> HandlerFuture {
            Box::pin(handler(req))
        });

        for method in &methods {
            self.router.add(method.as_str(), &path, handler.clone());
            self.endpoints.push((*method, path.clone()));
        }
    }

    /// Add a middleware layer wrapping every handler.
    ///
    /// Layers may be declared before or after the routes they wrap; the
    /// first layer added ends up outermost. They are applied once, when the
    /// server starts.
    pub fn wrap<M>(&mut self, middleware: M)
    where
        M: Fn(HandlerFn) -> HandlerFn + Send + Sync + 'static,
    {
        self.middleware.push(Arc::new(middleware));
    }

    /// Seal the routes: apply the middleware layers to every registered
    /// handler and hand out the router for serving.
    pub fn into_router(mut self) -> Arc<Router<HandlerFn>> {
        if !self.middleware.is_empty() {
            let layers = std::mem::take(&mut self.middleware);
            self.router.bind(move |handler| {
                layers
                    .iter()
                    .rev()
                    .fold(handler, |handler, layer| layer(handler))
            });
        }

        Arc::new(self.router)
    }

    /// Display the server banner and registered endpoints.
    fn display_server_info(&self) {
        // Display the banner
        let banner = include_str!("../banner.txt");
        info!("\n{banner}");

        // Display registered endpoints
        info!("Registered endpoints:");
        for (method, path) in &self.endpoints {
            info!("  {method} {path}");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: Arc<mpsc::Sender<()>>, tasks: &mut JoinSet<()>) {
        // Spawn a task to handle Ctrl+C
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        router: Arc<Router<HandlerFn>>,
        read_buffer_size: usize,
        shutdown_tx: Arc<mpsc::Sender<()>>,
        tasks: &mut JoinSet<()>,
    ) {
        // Try to acquire a permit from the semaphore
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                // Send a 503 Service Unavailable response
                let response = HttpResponse::text(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let shutdown_tx = shutdown_tx.clone();

        // Spawn a task to handle the connection
        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, router, read_buffer_size).await {
                error!("Error handling connection: {e}");

                // If there's a critical error, signal shutdown
                if matches!(e, Error::IoError(_)) {
                    info!("Critical I/O error, initiating shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        // If there's a critical error, signal to break the loop
        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, timeout: std::time::Duration) {
        // Wait for all tasks to complete (with timeout)
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let _ = tokio::time::timeout(timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    ///
    /// Consumes the server: route registration and middleware wrapping are
    /// complete once this is called.
    pub async fn start(self) -> Result<(), Error> {
        // Display server information
        self.display_server_info();

        // Set up the TCP listener
        let listener = self.setup_listener().await?;

        let config = self.config.clone();

        // Seal the routes; the router is immutable from here on
        let router = self.into_router();

        // Create a semaphore to limit concurrent connections
        let semaphore = Arc::new(Semaphore::new(config.max_connections));

        // Create a channel for shutdown signaling
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let shutdown_tx = Arc::new(shutdown_tx);

        // Use JoinSet to keep track of all spawned tasks
        let mut tasks = JoinSet::new();

        // Set up a Ctrl+C handler for graceful shutdown
        Self::setup_ctrl_c_handler(shutdown_tx.clone(), &mut tasks);

        loop {
            tokio::select! {
                // Check for shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                // Accept new connections
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                router.clone(),
                                config.read_buffer_size,
                                shutdown_tx.clone(),
                                &mut tasks
                            ).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        // Perform graceful shutdown
        Self::perform_shutdown(&mut tasks, config.shutdown_timeout).await;

        Ok(())
    }

    /// Handle a single connection: read, parse, route, respond.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: Arc<Router<HandlerFn>>,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let mut buf = vec![0; read_buffer_size];

        // Read data from the socket
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(()); // Connection closed
        }

        // Parse the HTTP request
        let mut request = match parse_request(&buf[..n]) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::text(
                    StatusCode::BadRequest,
                    format!("Error parsing request: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        // Look up the handler, collecting route parameters as the tree
        // walk captures them
        let mut params = HashMap::new();
        let handler = router
            .lookup(request.method.as_str(), request.route_path(), |name, value| {
                params.insert(name.to_string(), value.to_string());
            })
            .cloned();

        let Some(handler) = handler else {
            // The path may be registered under a different method
            let allowed = router.allowed_methods(request.route_path());

            if allowed.is_empty() {
                let response = HttpResponse::text(
                    StatusCode::NotFound,
                    format!("Not found: {path}", path = request.route_path()),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::NotFound(request.path));
            }

            // Method not allowed
            let allowed = allowed.join(", ");
            let response = HttpResponse::text(
                StatusCode::MethodNotAllowed,
                format!(
                    "Method {method} not allowed for path: {path}. Allowed methods: {allowed}",
                    method = request.method,
                    path = request.route_path(),
                ),
            )
            .with_header("Allow", allowed);

            socket.write_all(&response.to_bytes()).await?;
            return Err(Error::MethodNotAllowed(request.method, request.path));
        };

        request.params = params;

        // Call the handler
        let response = match handler(request).await {
            Ok(resp) => resp,
            Err(e) => {
                let response = HttpResponse::text(
                    StatusCode::InternalServerError,
                    format!("Internal server error: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(e);
            }
        };

        // Send the response
        socket.write_all(&response.to_bytes()).await?;

        Ok(())
    }
}
