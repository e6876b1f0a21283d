//! A basic HTTP server demonstrating radix tree routing and middleware.

use microroute_rs::{HandlerFn, HttpResponse, HttpServer, Method, ServerConfig, StatusCode};
use log::info;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    // Create a server configuration with default values
    let config = ServerConfig {
        addr: "127.0.0.1:8081".parse()?,
        max_connections: 100,
        read_buffer_size: 4096,
        ..ServerConfig::default()
    };

    // Create a new HTTP server
    let mut server = HttpServer::new(config);

    // Add a simple route that responds with "Hello, World!"
    server.add_route("/", vec![Method::GET], |_req| async move {
        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string("Hello, World!"))
    });

    // Add a route with a path parameter
    server.add_route("/hello/:name", vec![Method::GET], |req| async move {
        let name = req.get_param("name").cloned().unwrap_or_default();

        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string(format!("Hello, {name}!")))
    });

    // Add a route with two parameters and a second method on the same path
    server.add_route("/users/:id/posts/:slug", vec![Method::GET, Method::DELETE], |req| async move {
        let id = req.get_param("id").cloned().unwrap_or_default();
        let slug = req.get_param("slug").cloned().unwrap_or_default();

        match req.method {
            Method::DELETE => Ok(HttpResponse::new(StatusCode::NoContent)),
            _ => Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string(format!("Post {slug} by user {id}"))),
        }
    });

    // Add a wildcard route that captures the rest of the path
    server.add_route("/static/*filepath", vec![Method::GET], |req| async move {
        let filepath = req.get_param("filepath").cloned().unwrap_or_default();

        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string(format!("Would serve: {filepath}")))
    });

    // Add a middleware layer that logs every request
    server.wrap(|next: HandlerFn| -> HandlerFn {
        Arc::new(move |req| {
            let next = next.clone();
            Box::pin(async move {
                let started = Instant::now();
                let method = req.method;
                let path = req.path.clone();
                let result = next(req).await;
                info!("{method} {path} took {elapsed:?}", elapsed = started.elapsed());
                result
            })
        })
    });

    info!("Starting server on http://127.0.0.1:8081");

    // Start the server
    server.start().await?;

    Ok(())
}
