//! The per-method dispatcher on top of [`Tree`].

use crate::routing::tree::Tree;

/// Every method the dispatcher owns a tree for, in lookup order for
/// [`Router::allowed_methods`].
pub const METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "CONNECT", "TRACE",
];

/// A high-performance HTTP request router: one radix [`Tree`] per method.
///
/// Registration and [`Router::bind`] mutate the trees and belong in
/// single-threaded startup code; once serving begins, [`Router::lookup`] is
/// a lock-free read-only traversal.
pub struct Router<T> {
    get: Tree<T>,
    post: Tree<T>,
    put: Tree<T>,
    patch: Tree<T>,
    delete: Tree<T>,
    head: Tree<T>,
    options: Tree<T>,
    connect: Tree<T>,
    trace: Tree<T>,
}

impl<T> Router<T> {
    /// Create a new router containing trees for every HTTP method.
    pub fn new() -> Self {
        Router {
            get: Tree::new(),
            post: Tree::new(),
            put: Tree::new(),
            patch: Tree::new(),
            delete: Tree::new(),
            head: Tree::new(),
            options: Tree::new(),
            connect: Tree::new(),
            trace: Tree::new(),
        }
    }

    /// Finds the handler and parameters for the given route without
    /// allocating. Returns `None` for an unrecognized method or when no
    /// pattern matches; the caller is responsible for the 404.
    pub fn lookup<F>(&self, method: &str, path: &str, add_parameter: F) -> Option<&T>
    where
        F: FnMut(&str, &str),
    {
        self.select_tree(method)?.lookup(path, add_parameter)
    }

    /// Applies `transform` exactly once to every handler stored across all
    /// method trees. Used to retrofit middleware onto handlers that were
    /// registered before the middleware was known.
    pub fn bind<F>(&mut self, mut transform: F)
    where
        F: FnMut(T) -> T,
    {
        self.get.bind(&mut transform);
        self.post.bind(&mut transform);
        self.put.bind(&mut transform);
        self.patch.bind(&mut transform);
        self.delete.bind(&mut transform);
        self.head.bind(&mut transform);
        self.options.bind(&mut transform);
        self.connect.bind(&mut transform);
        self.trace.bind(&mut transform);
    }

    /// The methods under which the given path is registered, for building an
    /// `Allow` header on 405 responses. Off the hot path; allocates.
    pub fn allowed_methods(&self, path: &str) -> Vec<&'static str> {
        let mut allowed = Vec::new();

        for method in METHODS {
            if self.lookup(method, path, |_, _| {}).is_some() {
                allowed.push(method);
            }
        }

        allowed
    }

    fn select_tree(&self, method: &str) -> Option<&Tree<T>> {
        match method {
            "GET" => Some(&self.get),
            "POST" => Some(&self.post),
            "PUT" => Some(&self.put),
            "PATCH" => Some(&self.patch),
            "DELETE" => Some(&self.delete),
            "HEAD" => Some(&self.head),
            "OPTIONS" => Some(&self.options),
            "CONNECT" => Some(&self.connect),
            "TRACE" => Some(&self.trace),
            _ => None,
        }
    }

    fn select_tree_mut(&mut self, method: &str) -> Option<&mut Tree<T>> {
        match method {
            "GET" => Some(&mut self.get),
            "POST" => Some(&mut self.post),
            "PUT" => Some(&mut self.put),
            "PATCH" => Some(&mut self.patch),
            "DELETE" => Some(&mut self.delete),
            "HEAD" => Some(&mut self.head),
            "OPTIONS" => Some(&mut self.options),
            "CONNECT" => Some(&mut self.connect),
            "TRACE" => Some(&mut self.trace),
            _ => None,
        }
    }
}

impl<T: Clone> Router<T> {
    /// Registers a handler for the given method and path pattern. A no-op
    /// for unrecognized methods.
    pub fn add(&mut self, method: &str, path: &str, handler: T) {
        if let Some(tree) = self.select_tree_mut(method) {
            tree.add(path, handler);
        }
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}
