//! Scored single-key candidates supplied by a language model.

use crate::KeyValuePair;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A `KeyValuePair` with its language-model score.
///
/// Scores are usually natural-log probabilities, so higher (closer to zero)
/// is better. The lattice only ever compares and adds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unigram {
    pub key_value: KeyValuePair,
    pub score: f64,
}

impl Unigram {
    pub fn new(key_value: KeyValuePair, score: f64) -> Self {
        Self { key_value, score }
    }

    /// Shorthand for `Unigram::new(KeyValuePair::new(key, value), score)`.
    pub fn from_parts<K: Into<String>, V: Into<String>>(key: K, value: V, score: f64) -> Self {
        Self::new(KeyValuePair::new(key, value), score)
    }

    pub fn value(&self) -> &str {
        &self.key_value.value
    }
}

impl PartialOrd for Unigram {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.key_value.cmp(&other.key_value) {
            Ordering::Equal => self.score.partial_cmp(&other.score),
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for Unigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.key_value, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_pair_before_score() {
        let low = Unigram::from_parts("a", "x", -1.0);
        let high = Unigram::from_parts("a", "x", -0.5);
        let other = Unigram::from_parts("b", "x", -9.0);

        assert!(low < high);
        assert!(high < other);
        assert_eq!(low.partial_cmp(&low.clone()), Some(Ordering::Equal));
    }

    #[test]
    fn display_includes_score() {
        let u = Unigram::from_parts("ㄋㄧˇ", "你", -2.5);
        assert_eq!(u.to_string(), "((ㄋㄧˇ,你),-2.5)");
        assert_eq!(u.value(), "你");
    }
}
