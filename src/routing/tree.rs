//! The per-method radix tree.

use crate::routing::node::{Flow, Kind, Node, NodeId, ROOT, SEPARATOR};

/// Hands a captured name/value pair to the caller's sink. Names and segment
/// values are sliced on `/` boundaries or whole-name boundaries, so for any
/// valid UTF-8 input path the lossy conversion borrows without copying.
fn emit<F>(name: &[u8], value: &[u8], add_parameter: &mut F)
where
    F: FnMut(&str, &str),
{
    add_parameter(
        &String::from_utf8_lossy(name),
        &String::from_utf8_lossy(value),
    );
}

/// A compressed prefix tree mapping URL paths to handlers of type `T`.
///
/// Patterns use `/` as the literal separator, `:name` for a single-segment
/// parameter and `*name` for a trailing wildcard. Matching is bytewise, so
/// patterns and paths may contain multibyte characters; internal splits can
/// land in the middle of one. Registration mutates the tree and is meant for
/// single-threaded startup; [`Tree::lookup`] is a read-only traversal that
/// performs no allocation and is safe to call from any number of threads
/// once registration is complete.
///
/// # Examples
///
/// ```
/// use microroute_rs::Tree;
///
/// let mut tree = Tree::new();
/// tree.add("/post/:id", "post handler");
///
/// let handler = tree.lookup("/post/42", |name, value| {
///     assert_eq!(name, "id");
///     assert_eq!(value, "42");
/// });
/// assert_eq!(handler, Some(&"post handler"));
/// ```
pub struct Tree<T> {
    pub(crate) nodes: Vec<Node<T>>,
}

impl<T> Tree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::root()],
        }
    }

    /// Move a node into the arena and return its index.
    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// O(1) child selection via the dense byte table.
    pub(crate) fn static_child(&self, node: NodeId, next: u8) -> Option<NodeId> {
        let current = &self.nodes[node];
        if next >= current.start_index && next < current.end_index {
            let child = current.indices[(next - current.start_index) as usize];
            if child != ROOT {
                return Some(child);
            }
        }
        None
    }

    /// Finds the handler for the given path without allocating, invoking
    /// `add_parameter` once per captured `:name` or `*name` value before
    /// returning. Returns `None` when no registered pattern matches; a miss
    /// is normal control flow, not an error.
    ///
    /// Static children are preferred over the parameter child, which is
    /// preferred over the wildcard fallback. Once a parameter or wildcard
    /// has consumed bytes there is no backtracking into other branches.
    pub fn lookup<F>(&self, path: &str, mut add_parameter: F) -> Option<&T>
    where
        F: FnMut(&str, &str),
    {
        let mut path = path.as_bytes();
        let mut node = ROOT;
        let mut parameter: Option<NodeId> = None;
        let mut parameter_path: &[u8] = b"";
        let mut wildcard: Option<NodeId> = None;
        let mut wildcard_path: &[u8] = b"";

        // Skip the first iteration if the starting characters are equal.
        let mut i = usize::from(
            !path.is_empty()
                && !self.nodes[ROOT].prefix.is_empty()
                && path[0] == self.nodes[ROOT].prefix[0],
        );

        'search: {
            // Search the tree for equal parts until we can no longer proceed.
            'walk: while i < path.len() {
                let current = &self.nodes[node];

                // The node we just checked is entirely included in our path.
                // node: /|
                // path: /|blog
                if i == current.prefix.len() {
                    if current.wildcard.is_some() {
                        wildcard = current.wildcard;
                        wildcard_path = &path[i..];
                    }

                    parameter = current.parameter;
                    parameter_path = &path[i..];

                    if let Some(child) = self.static_child(node, path[i]) {
                        node = child;
                        path = &path[i..];
                        i = 1;
                        continue 'walk;
                    }

                    // node: /|:id
                    // path: /|blog
                    if let Some(param) = current.parameter {
                        node = param;
                        path = &path[i..];
                        i = 1;

                        // Segment capture: consume bytes up to the next
                        // separator or the end of the path.
                        while i < path.len() {
                            // node: /:id|/posts
                            // path: /123|/posts
                            if path[i] == SEPARATOR {
                                emit(&self.nodes[node].prefix, &path[..i], &mut add_parameter);

                                let Some(child) = self.static_child(node, SEPARATOR) else {
                                    break 'search;
                                };

                                node = child;
                                path = &path[i..];
                                i = 1;
                                continue 'walk;
                            }

                            i += 1;
                        }

                        emit(&self.nodes[node].prefix, &path[..i], &mut add_parameter);
                        return self.nodes[node].data.as_ref();
                    }

                    // node: /|*any
                    // path: /|image.png
                    break 'search;
                }

                // We got a conflict.
                // node: /b|ag
                // path: /b|riefcase
                if path[i] != current.prefix[i] {
                    break 'search;
                }

                i += 1;
            }

            // node: /blog|
            // path: /blog|
            if i == self.nodes[node].prefix.len() {
                return self.nodes[node].data.as_ref();
            }

            // The path ended mid-prefix; fall through to the recorded
            // parameter or wildcard, if any.
        }

        if let Some(parameter) = parameter {
            let current = &self.nodes[parameter];
            emit(&current.prefix, parameter_path, &mut add_parameter);
            return current.data.as_ref();
        }

        if let Some(wildcard) = wildcard {
            let current = &self.nodes[wildcard];
            emit(&current.prefix, wildcard_path, &mut add_parameter);
            return current.data.as_ref();
        }

        None
    }

    /// Replaces every stored handler with `transform(handler)`, exactly once
    /// per node. Nodes already transformed by an earlier bind pass are
    /// skipped, so routes registered late can be converged with another call
    /// without double-wrapping the rest.
    pub fn bind<F>(&mut self, transform: &mut F)
    where
        F: FnMut(T) -> T,
    {
        for node in &mut self.nodes {
            if node.bound {
                continue;
            }

            if let Some(data) = node.data.take() {
                node.data = Some(transform(data));
                node.bound = true;
            }
        }
    }
}

impl<T: Clone> Tree<T> {
    /// Registers `data` under the given pattern. Registering the exact same
    /// pattern twice overwrites the previous handler; a static route and a
    /// parameterized route may coexist at the same position, with the static
    /// one winning at lookup time.
    ///
    /// A `*name` wildcard is only meaningful as the final segment of a
    /// pattern; anything behind it is a registration defect (checked in
    /// debug builds, ignored in release).
    pub fn add(&mut self, path: &str, data: T) {
        debug_assert!(
            path.find('*')
                .map_or(true, |index| !path[index..].contains('/')),
            "wildcard must be the final segment of the pattern: {path}"
        );

        let path = path.as_bytes();
        let mut i = 0;
        let mut offset = 0;
        let mut node = ROOT;

        // Search the tree for equal parts until we can no longer proceed.
        loop {
            'begin: loop {
                match self.nodes[node].kind {
                    Kind::Parameter => {
                        // Only reached when the same parameterized route is
                        // added twice.
                        // node: /post/:id|
                        // path: /post/:id|
                        if i == path.len() {
                            self.nodes[node].data = Some(data);
                            return;
                        }

                        // A separator ends the placeholder; branch into the
                        // structure behind it.
                        if path[i] == SEPARATOR {
                            let (next, next_offset, flow) =
                                self.descend(node, path, &data, i, offset);
                            node = next;
                            offset = next_offset;
                            match flow {
                                Flow::Stop => return,
                                Flow::Begin => continue 'begin,
                                Flow::Next => break 'begin,
                            }
                        }
                    }
                    _ => {
                        if i == path.len() {
                            // The path already exists.
                            // node: /blog|
                            // path: /blog|
                            if i - offset == self.nodes[node].prefix.len() {
                                self.nodes[node].data = Some(data);
                                return;
                            }

                            // The path ended but the node prefix is longer.
                            // node: /blog|feed
                            // path: /blog|
                            self.split(node, i - offset, b"", &data);
                            return;
                        }

                        // The node we just checked is entirely included in
                        // our path.
                        // node: /|
                        // path: /|blog
                        if i - offset == self.nodes[node].prefix.len() {
                            let (next, next_offset, flow) =
                                self.descend(node, path, &data, i, offset);
                            node = next;
                            offset = next_offset;
                            match flow {
                                Flow::Stop => return,
                                Flow::Begin => continue 'begin,
                                Flow::Next => break 'begin,
                            }
                        }

                        // We got a conflict.
                        // node: /b|ag
                        // path: /b|riefcase
                        if path[i] != self.nodes[node].prefix[i - offset] {
                            self.split(node, i - offset, &path[i..], &data);
                            return;
                        }
                    }
                }

                break 'begin;
            }

            i += 1;
        }
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}
