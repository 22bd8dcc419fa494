//! Node normalizers
//!
//! Replace freshly built AST nodes with structurally equal nodes seen before, so
//! templates sharing fragments share memory. One cache holds all node kinds.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::DEFAULT_NORMALIZER_CAPACITY;
use crate::error::ConfigError;
use crate::message::{Message, MessagePart, ParameterPart, TextPart};

/// A node kind that can be normalized. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Message(Arc<Message>),
    Text(Arc<TextPart>),
    Parameter(Arc<ParameterPart>),
}

impl Node {
    /// Tells whether both nodes are the same instance.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Message(a), Node::Message(b)) => Arc::ptr_eq(a, b),
            (Node::Text(a), Node::Text(b)) => Arc::ptr_eq(a, b),
            (Node::Parameter(a), Node::Parameter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<MessagePart> for Node {
    fn from(part: MessagePart) -> Self {
        match part {
            MessagePart::Text(t) => Node::Text(t),
            MessagePart::Parameter(p) => Node::Parameter(p),
        }
    }
}

pub trait MessagePartNormalizer: Send + Sync + fmt::Debug {
    /// Returns `node` or a structurally equal node returned earlier.
    fn normalize(&self, node: Node) -> Node;

    fn normalize_part(&self, part: MessagePart) -> MessagePart {
        match self.normalize(Node::from(part.clone())) {
            Node::Text(t) => MessagePart::Text(t),
            Node::Parameter(p) => MessagePart::Parameter(p),
            Node::Message(_) => part,
        }
    }

    fn normalize_message(&self, message: Arc<Message>) -> Arc<Message> {
        match self.normalize(Node::Message(Arc::clone(&message))) {
            Node::Message(m) => m,
            _ => message,
        }
    }
}

/// Keeps every node as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNormalizer;

impl MessagePartNormalizer for NoOpNormalizer {
    fn normalize(&self, node: Node) -> Node {
        node
    }
}

/// Remembers every node; never evicts.
#[derive(Debug, Default)]
pub struct UnboundedNormalizer {
    nodes: Mutex<HashSet<Node>>,
}

impl UnboundedNormalizer {
    pub fn new() -> Self {
        UnboundedNormalizer::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessagePartNormalizer for UnboundedNormalizer {
    fn normalize(&self, node: Node) -> Node {
        let mut nodes = self.nodes.lock();
        if let Some(existing) = nodes.get(&node) {
            return existing.clone();
        }
        nodes.insert(node.clone());
        node
    }
}

/// Remembers the `capacity` most recently used nodes.
///
/// Entries are kept most recent first. A hit moves the entry to the front, a
/// miss inserts at the front and drops the least recently used entry when full.
#[derive(Debug)]
pub struct LruNormalizer {
    capacity: usize,
    nodes: Mutex<Vec<Node>>,
}

impl LruNormalizer {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(LruNormalizer {
            capacity,
            nodes: Mutex::new(Vec::with_capacity(capacity)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tells whether the very instance `node` is cached.
    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.lock().iter().any(|n| n.ptr_eq(node))
    }
}

impl Default for LruNormalizer {
    fn default() -> Self {
        LruNormalizer {
            capacity: DEFAULT_NORMALIZER_CAPACITY,
            nodes: Mutex::new(Vec::with_capacity(DEFAULT_NORMALIZER_CAPACITY)),
        }
    }
}

impl MessagePartNormalizer for LruNormalizer {
    fn normalize(&self, node: Node) -> Node {
        let mut nodes = self.nodes.lock();

        if let Some(pos) = nodes.iter().position(|n| *n == node) {
            if pos > 0 {
                let hit = nodes.remove(pos);
                nodes.insert(0, hit);
            }
            return nodes[0].clone();
        }

        nodes.insert(0, node.clone());
        if nodes.len() > self.capacity {
            if let Some(evicted) = nodes.pop() {
                tracing::debug!(?evicted, capacity = self.capacity, "normalizer evicted node");
            }
        }

        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(Arc::new(TextPart::new(s, false, false)))
    }

    #[test]
    fn test_unbounded_shares_equal_nodes() {
        let normalizer = UnboundedNormalizer::new();
        let first = normalizer.normalize(text("a"));
        let second = normalizer.normalize(text("a"));
        assert!(first.ptr_eq(&second));
        assert_eq!(normalizer.len(), 1);
    }

    #[test]
    fn test_lru_hit_moves_to_front() {
        let normalizer = LruNormalizer::new(2).unwrap();
        let a = normalizer.normalize(text("a"));
        let b = normalizer.normalize(text("b"));
        normalizer.normalize(text("a"));
        normalizer.normalize(text("c"));

        assert!(normalizer.contains(&a));
        assert_eq!(normalizer.len(), 2);
        assert!(!normalizer.normalize(text("b")).ptr_eq(&b));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(LruNormalizer::new(0), Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn test_heterogeneous_nodes() {
        let normalizer = LruNormalizer::new(4).unwrap();
        let message = Arc::new(Message::text("a"));
        let part = MessagePart::text("a", false, false);

        let m1 = normalizer.normalize_message(Arc::clone(&message));
        let p1 = normalizer.normalize_part(part.clone());
        let m2 = normalizer.normalize_message(Arc::new(Message::text("a")));
        let p2 = normalizer.normalize_part(part);

        assert!(Arc::ptr_eq(&m1, &m2));
        assert!(matches!((&p1, &p2), (MessagePart::Text(a), MessagePart::Text(b)) if Arc::ptr_eq(a, b)));
        assert_eq!(normalizer.len(), 2);
    }
}
