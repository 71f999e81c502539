//! Nodes sharing one start position, keyed by how many readings they cover.

use crate::Node;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct Span {
    length_node_map: AHashMap<usize, Node>,
    maximum_length: usize,
}

impl Span {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.length_node_map.clear();
        self.maximum_length = 0;
    }

    /// Store `node` as the phrase covering `length` readings, replacing any
    /// node already there.
    pub fn insert_node_of_length(&mut self, node: Node, length: usize) {
        self.length_node_map.insert(length, node);
        if length > self.maximum_length {
            self.maximum_length = length;
        }
    }

    /// Remove every node longer than `length`.
    pub fn remove_node_of_length_greater_than(&mut self, length: usize) {
        if length >= self.maximum_length {
            return;
        }
        self.length_node_map.retain(|&l, _| l <= length);
        self.maximum_length = self.length_node_map.keys().copied().max().unwrap_or(0);
    }

    pub fn node_of_length(&self, length: usize) -> Option<&Node> {
        self.length_node_map.get(&length)
    }

    pub fn node_of_length_mut(&mut self, length: usize) -> Option<&mut Node> {
        self.length_node_map.get_mut(&length)
    }

    pub fn maximum_length(&self) -> usize {
        self.maximum_length
    }

    pub fn is_empty(&self) -> bool {
        self.length_node_map.is_empty()
    }

    /// Stored lengths in ascending order.
    pub fn lengths(&self) -> Vec<usize> {
        let mut lengths: Vec<usize> = self.length_node_map.keys().copied().collect();
        lengths.sort_unstable();
        lengths
    }
}
