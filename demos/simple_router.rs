//! Using the router directly, without the HTTP server.

use microroute_rs::Router;

fn main() {
    let mut router = Router::new();

    // Static routes
    router.add("GET", "/", "home");
    router.add("GET", "/about", "about");

    // Parameterized routes
    router.add("GET", "/users/:id", "user profile");
    router.add("GET", "/users/:id/posts/:slug", "user post");

    // A wildcard route
    router.add("GET", "/files/*filepath", "file server");

    // The same path on a different method
    router.add("DELETE", "/users/:id", "delete user");

    for (method, path) in [
        ("GET", "/"),
        ("GET", "/about"),
        ("GET", "/users/42"),
        ("GET", "/users/42/posts/hello-world"),
        ("GET", "/files/css/site.css"),
        ("DELETE", "/users/42"),
        ("GET", "/missing"),
    ] {
        let mut params = Vec::new();
        match router.lookup(method, path, |name, value| {
            params.push(format!("{name}={value}"));
        }) {
            Some(data) => println!("{method} {path} -> {data} [{params}]", params = params.join(", ")),
            None => println!("{method} {path} -> 404 (allowed: {allowed:?})", allowed = router.allowed_methods(path)),
        }
    }
}
