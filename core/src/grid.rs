//! The reading lattice.
//!
//! A `Grid` holds one `Span` per reading position. A node stored in the span
//! at position `p` with length `L` is a phrase covering readings `[p, p+L)`.
//! Positions passed to the `nodes_ending_at`/`nodes_crossing_or_ending_at`
//! family are cursor boundaries in `[0, width]`; `nodes_at` takes a reading
//! index in `[0, width)`.

use crate::{KeyValuePair, Node, NodeAnchor, Span};
use tracing::debug;

/// Longest phrase, in readings, the lattice considers.
pub const MAX_SPAN_LENGTH: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct Grid {
    spans: Vec<Span>,
}

/// How an override applies to the chosen node.
#[derive(Debug, Clone, Copy)]
enum Selection {
    Fixed,
    Floating(f64),
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Number of reading positions.
    pub fn width(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, location: usize) -> Option<&Span> {
        self.spans.get(location)
    }

    /// Store `node` at `location` covering `spanning_length` readings,
    /// growing the grid with empty spans if `location` is past the end.
    ///
    /// The caller is responsible for `location + spanning_length <= width`.
    pub fn insert_node(&mut self, node: Node, location: usize, spanning_length: usize) {
        if location >= self.spans.len() {
            self.spans.resize_with(location + 1, Span::new);
        }
        self.spans[location].insert_node_of_length(node, spanning_length);
    }

    pub fn has_node_at_location_spanning_length_matching_key(
        &self,
        location: usize,
        spanning_length: usize,
        key: &str,
    ) -> bool {
        self.spans
            .get(location)
            .and_then(|span| span.node_of_length(spanning_length))
            .is_some_and(|node| node.key() == key)
    }

    /// Open an empty position at `location` (a reading was inserted there).
    ///
    /// Nodes before `location` that would now straddle the new reading are
    /// removed. No-op when `location > width`.
    pub fn expand_grid_by_one_at_location(&mut self, location: usize) {
        if location > self.spans.len() {
            debug!(location, width = self.width(), "expand past grid end ignored");
            return;
        }
        self.spans.insert(location, Span::new());
        self.trim_spans_before(location);
        debug!(location, width = self.width(), "grid expanded");
    }

    /// Remove the position at `location` (its reading was deleted), dropping
    /// earlier nodes that covered it. No-op when `location >= width`.
    pub fn shrink_grid_by_one_at_location(&mut self, location: usize) {
        if location >= self.spans.len() {
            debug!(location, width = self.width(), "shrink past grid end ignored");
            return;
        }
        self.spans.remove(location);
        self.trim_spans_before(location);
        debug!(location, width = self.width(), "grid shrunk");
    }

    fn trim_spans_before(&mut self, location: usize) {
        for (i, span) in self.spans.iter_mut().enumerate().take(location) {
            span.remove_node_of_length_greater_than(location - i);
        }
    }

    /// Nodes starting at reading `location`, shortest first.
    pub fn nodes_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        let Some(span) = self.spans.get(location) else {
            return Vec::new();
        };
        (1..=MAX_SPAN_LENGTH)
            .filter_map(|length| {
                span.node_of_length(length)
                    .map(|node| NodeAnchor::new(node, location, length))
            })
            .collect()
    }

    /// Nodes whose span ends exactly at boundary `location`, longest first.
    pub fn nodes_ending_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        if location == 0 || location > self.spans.len() {
            return Vec::new();
        }
        self.spans[..location]
            .iter()
            .enumerate()
            .filter(|(i, span)| i + span.maximum_length() >= location)
            .filter_map(|(i, span)| {
                span.node_of_length(location - i)
                    .map(|node| NodeAnchor::new(node, i, location - i))
            })
            .collect()
    }

    /// Nodes that end at boundary `location` or straddle it, ordered by start
    /// then length.
    pub fn nodes_crossing_or_ending_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        if location == 0 || location > self.spans.len() {
            return Vec::new();
        }
        let mut result = Vec::new();
        for (i, span) in self.spans[..location].iter().enumerate() {
            if i + span.maximum_length() < location {
                continue;
            }
            for length in (location - i)..=span.maximum_length() {
                if let Some(node) = span.node_of_length(length) {
                    result.push(NodeAnchor::new(node, i, length));
                }
            }
        }
        result
    }

    /// Nodes lying entirely inside boundaries `[begin, end]`.
    pub fn nodes_in_range(&self, begin: usize, end: usize) -> Vec<NodeAnchor<'_>> {
        let end = end.min(self.spans.len());
        let mut result = Vec::new();
        for location in begin..end {
            let span = &self.spans[location];
            for length in span.lengths() {
                if location + length > end {
                    continue;
                }
                if let Some(node) = span.node_of_length(length) {
                    result.push(NodeAnchor::new(node, location, length));
                }
            }
        }
        result
    }

    /// Candidates offered at cursor `location`, in the order the override
    /// operations search them. Duplicates are dropped.
    pub fn candidates_at(&self, location: usize) -> Vec<KeyValuePair> {
        let mut result: Vec<KeyValuePair> = Vec::new();
        for anchor in self.override_search_order(location) {
            let Some(node) = anchor.node else { continue };
            for kv in node.candidates() {
                if !result.contains(kv) {
                    result.push(kv.clone());
                }
            }
        }
        result
    }

    /// Pin `value` on the first node around `location` that offers it.
    ///
    /// Every other node overlapping the chosen one is reset, so a path can
    /// never combine two conflicting selections. Returns an empty anchor when
    /// no node offers `value`.
    pub fn fix_node_selected_candidate(&mut self, location: usize, value: &str) -> NodeAnchor<'_> {
        self.apply_selection(location, value, Selection::Fixed)
    }

    /// Like `fix_node_selected_candidate`, but the node gets
    /// `overriding_score` instead of the override sentinel.
    pub fn override_node_score_for_selected_candidate(
        &mut self,
        location: usize,
        value: &str,
        overriding_score: f64,
    ) -> NodeAnchor<'_> {
        self.apply_selection(location, value, Selection::Floating(overriding_score))
    }

    fn override_search_order(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        let mut anchors = self.nodes_crossing_or_ending_at(location);
        anchors.extend(self.nodes_at(location));
        anchors
    }

    fn apply_selection(&mut self, location: usize, value: &str, selection: Selection) -> NodeAnchor<'_> {
        let target = self.override_search_order(location).into_iter().find_map(|anchor| {
            let index = anchor.node?.candidate_index(value)?;
            Some((anchor.location, anchor.spanning_length, index))
        });
        let Some((start, length, index)) = target else {
            debug!(location, value, "no node offers candidate");
            return NodeAnchor::empty();
        };

        let end = start + length;
        let window_begin = start.saturating_sub(MAX_SPAN_LENGTH - 1);
        let window_end = end + MAX_SPAN_LENGTH - 1;
        let conflicts: Vec<(usize, usize)> = self
            .nodes_in_range(window_begin, window_end)
            .into_iter()
            .filter(|a| a.location < end && start < a.end())
            .filter(|a| !(a.location == start && a.spanning_length == length))
            .map(|a| (a.location, a.spanning_length))
            .collect();
        for (loc, len) in &conflicts {
            if let Some(node) = self.node_mut(*loc, *len) {
                node.reset_candidate();
            }
        }

        if let Some(node) = self.node_mut(start, length) {
            match selection {
                Selection::Fixed => node.select_candidate_at_index(index),
                Selection::Floating(score) => node.select_floating_candidate_at_index(index, score),
            }
        }
        debug!(
            location,
            value,
            start,
            length,
            reset = conflicts.len(),
            ?selection,
            "candidate selected"
        );

        self.spans[start]
            .node_of_length(length)
            .map(|node| NodeAnchor::new(node, start, length))
            .unwrap_or_default()
    }

    fn node_mut(&mut self, location: usize, length: usize) -> Option<&mut Node> {
        self.spans.get_mut(location)?.node_of_length_mut(length)
    }
}
