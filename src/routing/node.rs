//! Radix tree nodes and the node-level insertion operations.
//!
//! Nodes live in a growable arena owned by the [`Tree`](super::tree::Tree)
//! and refer to each other by arena index. Splitting a node therefore means
//! allocating a fresh slot for the old suffix and overwriting the original
//! slot in place, with no shared mutable aliasing.

use crate::routing::tree::Tree;

/// Index of a node in the tree's arena. The root always occupies slot 0 and
/// is never a child of another node, so 0 doubles as the "no child" sentinel
/// inside the byte-indexed child table.
pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

pub(crate) const SEPARATOR: u8 = b'/';
pub(crate) const PARAMETER: u8 = b':';
pub(crate) const WILDCARD: u8 = b'*';

/// What a node matches during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// A literal prefix.
    Static,
    /// A `:name` capture consuming a single path segment.
    Parameter,
    /// A `*name` capture consuming the remainder of the path.
    Wildcard,
}

/// Control flow returned by [`Tree::descend`] to its caller in `Tree::add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// The path has been fully inserted.
    Stop,
    /// Re-examine the current node without consuming a byte.
    Begin,
    /// Consume the current byte and keep walking.
    Next,
}

/// One compressed edge-segment of the path space.
#[derive(Debug)]
pub(crate) struct Node<T> {
    /// The literal bytes this node consumes. Splits land on arbitrary byte
    /// offsets, so a static prefix may hold a partial multibyte character.
    /// For parameter and wildcard nodes this is the capture name instead,
    /// which is always sliced on character boundaries.
    pub(crate) prefix: Vec<u8>,
    /// The handler bound to this exact node, if any.
    pub(crate) data: Option<T>,
    /// Dense byte-range table mapping the next path byte to a child node.
    /// A slot of `ROOT` means no child for that byte.
    pub(crate) indices: Vec<NodeId>,
    pub(crate) start_index: u8,
    pub(crate) end_index: u8,
    /// The single `:name` child, reachable only when no static child fits.
    pub(crate) parameter: Option<NodeId>,
    /// The single `*name` child, the traversal's last resort.
    pub(crate) wildcard: Option<NodeId>,
    pub(crate) kind: Kind,
    /// Set once this node's handler has passed through a bind transform.
    pub(crate) bound: bool,
}

impl<T> Node<T> {
    fn new(prefix: &[u8], data: Option<T>, kind: Kind) -> Self {
        Node {
            prefix: prefix.to_vec(),
            data,
            indices: Vec::new(),
            start_index: 0,
            end_index: 0,
            parameter: None,
            wildcard: None,
            kind,
            bound: false,
        }
    }

    /// The prefix-less node a fresh tree starts with.
    pub(crate) fn root() -> Self {
        Node::new(b"", None, Kind::Static)
    }

    pub(crate) fn empty(prefix: &[u8]) -> Self {
        Node::new(prefix, None, Kind::Static)
    }

    pub(crate) fn with_data(prefix: &[u8], data: T) -> Self {
        Node::new(prefix, Some(data), Kind::Static)
    }

    pub(crate) fn parameter(name: &[u8]) -> Self {
        Node::new(name, None, Kind::Parameter)
    }

    pub(crate) fn wildcard(name: &[u8], data: T) -> Self {
        Node::new(name, Some(data), Kind::Wildcard)
    }

    /// Clone every field except the prefix, which is replaced. Used when a
    /// node is split and its tail moves onto a new arena slot.
    pub(crate) fn clone_with_prefix(&self, prefix: Vec<u8>) -> Self
    where
        T: Clone,
    {
        Node {
            prefix,
            data: self.data.clone(),
            indices: self.indices.clone(),
            start_index: self.start_index,
            end_index: self.end_index,
            parameter: self.parameter,
            wildcard: self.wildcard,
            kind: self.kind,
            bound: self.bound,
        }
    }

    /// Turn this node back into a bare branch point with the given prefix.
    pub(crate) fn reset(&mut self, prefix: Vec<u8>) {
        self.prefix = prefix;
        self.data = None;
        self.indices = Vec::new();
        self.start_index = 0;
        self.end_index = 0;
        self.parameter = None;
        self.wildcard = None;
        self.kind = Kind::Static;
        self.bound = false;
    }
}

impl<T: Clone> Tree<T> {
    /// Splits `node` at `index`: the uncommon suffix of the existing prefix
    /// moves onto a fresh child, the node itself is truncated, and `path`
    /// (the diverging remainder of the inserted pattern) is appended as a
    /// sibling. An empty `path` means the inserted pattern terminates at the
    /// split point, so the truncated node carries the data itself.
    pub(crate) fn split(&mut self, node: NodeId, index: usize, path: &[u8], data: &T) {
        let suffix = self.nodes[node].prefix[index..].to_vec();
        let split_node = self.nodes[node].clone_with_prefix(suffix);
        let split_id = self.alloc(split_node);

        let prefix = self.nodes[node].prefix[..index].to_vec();
        self.nodes[node].reset(prefix);

        if path.is_empty() {
            self.nodes[node].data = Some(data.clone());
            self.add_child(node, split_id);
            return;
        }

        self.add_child(node, split_id);
        self.append(node, path, data);
    }

    /// Registers `child` in the byte-indexed table of `node`, growing the
    /// dense range as needed. An occupied slot is overwritten, detaching the
    /// previous child.
    pub(crate) fn add_child(&mut self, node: NodeId, child: NodeId) {
        let first_char = self.nodes[child].prefix[0];
        let current = &mut self.nodes[node];

        if current.start_index == 0 {
            current.start_index = first_char;
            current.indices = vec![ROOT];
        } else if first_char < current.start_index {
            let diff = (current.start_index - first_char) as usize;
            let mut indices = vec![ROOT; diff + current.indices.len()];
            indices[diff..].copy_from_slice(&current.indices);
            current.start_index = first_char;
            current.indices = indices;
        } else if first_char >= current.end_index {
            let grow = (first_char - current.end_index) as usize + 1;
            let len = current.indices.len();
            current.indices.resize(len + grow, ROOT);
        }

        current.end_index = current.start_index.wrapping_add(current.indices.len() as u8);
        current.indices[(first_char - current.start_index) as usize] = child;
    }

    /// Adds an implicit `/` child sharing the same data, so that `/path` and
    /// `/path/` resolve to the same handler. Skipped when the node already
    /// ends in a slash, already has a `/` child, or is a wildcard.
    pub(crate) fn add_trailing_slash(&mut self, node: NodeId, data: &T) {
        let current = &self.nodes[node];
        if current.prefix.last() == Some(&SEPARATOR)
            || current.kind == Kind::Wildcard
            || self.static_child(node, SEPARATOR).is_some()
        {
            return;
        }

        let slash = self.alloc(Node::with_data(b"/", data.clone()));
        self.add_child(node, slash);
    }

    /// Appends the remaining pattern below `node`, peeling off static text,
    /// `:name` parameters and `*name` wildcards until it is consumed.
    ///
    /// node: /user|
    /// path: /user|/:userid
    pub(crate) fn append(&mut self, node: NodeId, path: &[u8], data: &T) {
        let mut node = node;
        let mut path = path;

        loop {
            if path.is_empty() {
                self.nodes[node].data = Some(data.clone());
                return;
            }

            let placeholder = match path.iter().position(|&byte| byte == PARAMETER) {
                Some(index) => Some(index),
                None => path.iter().position(|&byte| byte == WILDCARD),
            };

            let Some(placeholder) = placeholder else {
                // Purely static remainder. A prefix-less node is the fresh
                // root and absorbs the text instead of gaining a child.
                if self.nodes[node].prefix.is_empty() {
                    self.nodes[node].prefix = path.to_vec();
                    self.nodes[node].data = Some(data.clone());
                    self.add_trailing_slash(node, data);
                    return;
                }

                let child = self.alloc(Node::with_data(path, data.clone()));
                self.add_child(node, child);
                self.add_trailing_slash(child, data);
                return;
            };

            // The placeholder sits right at the front.
            if placeholder == 0 {
                let end = path
                    .iter()
                    .position(|&byte| byte == SEPARATOR)
                    .unwrap_or(path.len());
                let name = &path[1..end];

                if path[0] == PARAMETER {
                    let child = self.alloc(Node::parameter(name));
                    self.add_trailing_slash(child, data);
                    self.nodes[node].parameter = Some(child);
                    node = child;
                    path = &path[end..];
                    continue;
                }

                // A wildcard terminates the branch and holds the data itself.
                let child = self.alloc(Node::wildcard(name, data.clone()));
                self.nodes[node].wildcard = Some(child);
                return;
            }

            // Static text ahead of the placeholder.
            if self.nodes[node].prefix.is_empty() {
                self.nodes[node].prefix = path[..placeholder].to_vec();
                path = &path[placeholder..];
                continue;
            }

            let mut child = Node::empty(&path[..placeholder]);

            // A lone slash resolves to the same content as its parent node.
            if child.prefix.len() == 1 && child.prefix[0] == SEPARATOR {
                child.data = self.nodes[node].data.clone();
            }

            let child = self.alloc(child);
            self.add_child(node, child);
            node = child;
            path = &path[placeholder..];
        }
    }

    /// Called from `Tree::add` once a node's prefix has been fully consumed,
    /// to decide where the walk continues: into a fitting static child, into
    /// the parameter child, or by appending the remainder right here.
    pub(crate) fn descend(
        &mut self,
        node: NodeId,
        path: &[u8],
        data: &T,
        i: usize,
        offset: usize,
    ) -> (NodeId, usize, Flow) {
        let next = path[i];

        if let Some(child) = self.static_child(node, next) {
            return (child, i, Flow::Next);
        }

        // No fitting child. A prefix-less node is the starting node and
        // absorbs the remainder directly.
        if self.nodes[node].prefix.is_empty() {
            self.append(node, &path[i..], data);
            return (node, offset, Flow::Stop);
        }

        // node: /user/|:id
        // path: /user/|:id/profile
        if next == PARAMETER {
            if let Some(parameter) = self.nodes[node].parameter {
                return (parameter, i, Flow::Begin);
            }
        }

        self.append(node, &path[i..], data);
        (node, offset, Flow::Stop)
    }
}
