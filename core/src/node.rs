//! Candidate set for one (position, length) cell of the lattice.

use crate::{KeyValuePair, Unigram};

/// Score a node takes once the user pins one of its candidates.
///
/// Language-model scores are log probabilities (≤ 0), so any positive value
/// outranks a natural decomposition; the walker treats a node at or above
/// this score as an unconditional choice.
pub const SELECTED_CANDIDATE_SCORE: f64 = 99.0;

/// All known candidates for one reading key, ordered best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    key: String,
    score: f64,
    unigrams: Vec<Unigram>,
    candidates: Vec<KeyValuePair>,
    selected_unigram_index: usize,
}

impl Node {
    /// Build a node from the unigrams a language model returned for `key`.
    ///
    /// Unigrams are sorted by descending score; the sort is stable so ties
    /// keep the model's order.
    pub fn new<K: Into<String>>(key: K, mut unigrams: Vec<Unigram>) -> Self {
        unigrams.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let score = unigrams.first().map(|u| u.score).unwrap_or(0.0);
        let candidates = unigrams.iter().map(|u| u.key_value.clone()).collect();

        Self {
            key: key.into(),
            score,
            unigrams,
            candidates,
            selected_unigram_index: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Effective score used by the walker.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn unigrams(&self) -> &[Unigram] {
        &self.unigrams
    }

    pub fn candidates(&self) -> &[KeyValuePair] {
        &self.candidates
    }

    pub fn selected_unigram_index(&self) -> usize {
        self.selected_unigram_index
    }

    /// Whether the user pinned a candidate with the sentinel score.
    pub fn is_overridden(&self) -> bool {
        self.score >= SELECTED_CANDIDATE_SCORE
    }

    /// Pin candidate `index`. Out-of-range indices fall back to 0.
    pub fn select_candidate_at_index(&mut self, index: usize) {
        self.select_index(index);
        self.score = SELECTED_CANDIDATE_SCORE;
    }

    /// Select candidate `index` with an explicit score instead of the
    /// override sentinel, so it competes with its peers rather than winning
    /// outright.
    pub fn select_floating_candidate_at_index(&mut self, index: usize, score: f64) {
        self.select_index(index);
        self.score = score;
    }

    /// Drop any selection and go back to the statistically best candidate.
    pub fn reset_candidate(&mut self) {
        self.selected_unigram_index = 0;
        self.score = self.highest_unigram_score();
    }

    /// Score of the unigram whose text is `value`, or 0 when absent.
    pub fn score_for_candidate(&self, value: &str) -> f64 {
        self.unigrams
            .iter()
            .find(|u| u.key_value.value == value)
            .map(|u| u.score)
            .unwrap_or(0.0)
    }

    pub fn highest_unigram_score(&self) -> f64 {
        self.unigrams.first().map(|u| u.score).unwrap_or(0.0)
    }

    /// The selected pair, or an empty pair when the node has no candidates.
    pub fn current_key_value(&self) -> KeyValuePair {
        self.candidates
            .get(self.selected_unigram_index)
            .cloned()
            .unwrap_or_default()
    }

    /// Text of the selected candidate without cloning; empty when none.
    pub fn current_value(&self) -> &str {
        self.candidates
            .get(self.selected_unigram_index)
            .map(|kv| kv.value.as_str())
            .unwrap_or("")
    }

    /// Index of the first candidate whose text is `value`.
    pub fn candidate_index(&self, value: &str) -> Option<usize> {
        self.candidates.iter().position(|kv| kv.value == value)
    }

    fn select_index(&mut self, index: usize) {
        self.selected_unigram_index = if index < self.unigrams.len() { index } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new(
            "ㄕˋ",
            vec![
                Unigram::from_parts("ㄕˋ", "是", -2.0),
                Unigram::from_parts("ㄕˋ", "事", -1.5),
                Unigram::from_parts("ㄕˋ", "市", -2.0),
                Unigram::from_parts("ㄕˋ", "世", -3.0),
            ],
        )
    }

    #[test]
    fn sorts_descending_and_keeps_ties_stable() {
        let n = node();
        let values: Vec<&str> = n.candidates().iter().map(|kv| kv.value.as_str()).collect();
        assert_eq!(values, vec!["事", "是", "市", "世"]);
        for pair in n.unigrams().windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(n.score(), -1.5);
        assert_eq!(n.selected_unigram_index(), 0);
        assert_eq!(n.current_value(), "事");
    }

    #[test]
    fn empty_node_has_zero_score_and_empty_value() {
        let n = Node::new("x", vec![]);
        assert_eq!(n.score(), 0.0);
        assert_eq!(n.highest_unigram_score(), 0.0);
        assert!(n.current_key_value().is_empty());
        assert_eq!(n.current_value(), "");
    }

    #[test]
    fn select_uses_sentinel_and_clamps() {
        let mut n = node();
        n.select_candidate_at_index(2);
        assert_eq!(n.selected_unigram_index(), 2);
        assert_eq!(n.score(), SELECTED_CANDIDATE_SCORE);
        assert!(n.is_overridden());
        assert_eq!(n.current_value(), "市");

        n.select_candidate_at_index(42);
        assert_eq!(n.selected_unigram_index(), 0);
        assert_eq!(n.score(), SELECTED_CANDIDATE_SCORE);
    }

    #[test]
    fn floating_selection_keeps_caller_score() {
        let mut n = node();
        n.select_floating_candidate_at_index(3, -0.25);
        assert_eq!(n.current_value(), "世");
        assert_eq!(n.score(), -0.25);
        assert!(!n.is_overridden());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut n = node();
        n.select_candidate_at_index(1);
        n.reset_candidate();
        let once = n.clone();
        n.reset_candidate();
        assert_eq!(n, once);
        assert_eq!(n.selected_unigram_index(), 0);
        assert_eq!(n.score(), -1.5);
    }

    #[test]
    fn score_for_candidate_scans_values() {
        let n = node();
        assert_eq!(n.score_for_candidate("世"), -3.0);
        assert_eq!(n.score_for_candidate("不存在"), 0.0);
        assert_eq!(n.candidate_index("市"), Some(2));
        assert_eq!(n.candidate_index("不存在"), None);
    }
}
