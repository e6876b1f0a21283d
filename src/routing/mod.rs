//! HTTP request routing.
//!
//! This module maps an HTTP method and URL path to a registered handler
//! using one compressed prefix (radix) tree per method, with support for
//! static segments, `:name` parameters and trailing `*name` wildcards, and
//! zero-allocation lookup on the hot path.

mod node;
mod router;
mod tree;

// Re-export public items
pub use router::{Router, METHODS};
pub use tree::Tree;
