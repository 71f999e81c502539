//! Reading key / surface text pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reading key (e.g. "ㄋㄧˇ-ㄏㄠˇ") paired with the text it produces ("你好").
///
/// Ordering is lexicographic by key, then by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// True for the placeholder pair returned when no candidate is selectable.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

impl fmt::Display for KeyValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_key_then_value() {
        let a = KeyValuePair::new("ㄋㄧˇ", "你");
        let b = KeyValuePair::new("ㄋㄧˇ", "妳");
        let c = KeyValuePair::new("ㄏㄠˇ", "好");

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);

        let mut pairs = vec![c.clone(), b.clone(), a.clone()];
        pairs.sort();
        assert_eq!(pairs, vec![a, b, c]);
    }

    #[test]
    fn equality_needs_both_fields() {
        assert_eq!(KeyValuePair::new("k", "v"), KeyValuePair::new("k", "v"));
        assert_ne!(KeyValuePair::new("k", "v"), KeyValuePair::new("k", "w"));
        assert_ne!(KeyValuePair::new("k", "v"), KeyValuePair::new("j", "v"));
    }

    #[test]
    fn default_is_empty() {
        assert!(KeyValuePair::default().is_empty());
        assert!(!KeyValuePair::new("k", "").is_empty());
        assert_eq!(KeyValuePair::new("k", "v").to_string(), "(k,v)");
    }
}
