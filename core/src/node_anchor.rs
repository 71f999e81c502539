//! Borrowed views of grid nodes used by queries and path search.

use crate::Node;
use std::fmt;

/// A node together with where it sits in the grid.
///
/// The grid keeps ownership of the node; an anchor only lives as long as the
/// query or walk that produced it. `accumulated_score` is meaningful only on
/// anchors returned by the walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAnchor<'a> {
    pub node: Option<&'a Node>,
    pub location: usize,
    pub spanning_length: usize,
    pub accumulated_score: f64,
}

impl<'a> NodeAnchor<'a> {
    pub fn new(node: &'a Node, location: usize, spanning_length: usize) -> Self {
        Self {
            node: Some(node),
            location,
            spanning_length,
            accumulated_score: 0.0,
        }
    }

    /// An anchor without a node, returned when a lookup finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// First position after the node.
    pub fn end(&self) -> usize {
        self.location + self.spanning_length
    }

    /// Score of the node itself; zero is a real score, not "missing".
    pub fn score(&self) -> f64 {
        self.node.map(Node::score).unwrap_or(0.0)
    }

    pub fn key(&self) -> &'a str {
        self.node.map(Node::key).unwrap_or("")
    }

    /// Text of the node's selected candidate.
    pub fn value(&self) -> &'a str {
        self.node.map(Node::current_value).unwrap_or("")
    }

    /// Whether `self` and `other` cover at least one common reading.
    pub fn overlaps(&self, other: &NodeAnchor<'_>) -> bool {
        self.location < other.end() && other.location < self.end()
    }
}

impl fmt::Display for NodeAnchor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(
                f,
                "{{@({},{}),{}:{}}}",
                self.location,
                self.spanning_length,
                node.key(),
                node.current_value()
            ),
            None => write!(f, "{{@({},{}),-}}", self.location, self.spanning_length),
        }
    }
}
