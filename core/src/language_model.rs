//! Language models the reading builder queries for candidates.
//!
//! The lattice itself never talks to a model; only `ReadingBuilder` does,
//! when it creates nodes. Implementations must be deterministic for a given
//! key until their phrase table changes.

use crate::{KeyValuePair, Unigram, DEFAULT_LM_CACHE_SIZE};
use ahash::AHashMap;
use anyhow::{Context, Result};
use lru::LruCache;
use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

pub trait LanguageModel {
    /// Every unigram known for `key`, in the model's preferred order.
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram>;

    fn has_unigrams_for_key(&self, key: &str) -> bool;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram> {
        (**self).unigrams_for_key(key)
    }

    fn has_unigrams_for_key(&self, key: &str) -> bool {
        (**self).has_unigrams_for_key(key)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Rc<M> {
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram> {
        (**self).unigrams_for_key(key)
    }

    fn has_unigrams_for_key(&self, key: &str) -> bool {
        (**self).has_unigrams_for_key(key)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Arc<M> {
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram> {
        (**self).unigrams_for_key(key)
    }

    fn has_unigrams_for_key(&self, key: &str) -> bool {
        (**self).has_unigrams_for_key(key)
    }
}

/// Reading that always maps to itself.
const SPACE_READING: &str = " ";

/// Hash-map phrase table plus user phrases.
///
/// System phrases carry their own scores. User phrases score 0, which is
/// above any log probability, and come first; a value is returned at most
/// once per key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLanguageModel {
    phrases: AHashMap<String, Vec<(String, f64)>>,
    user_phrases: AHashMap<String, Vec<String>>,
}

impl InMemoryLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system phrase for `key`.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V, score: f64) {
        self.phrases
            .entry(key.into())
            .or_default()
            .push((value.into(), score));
    }

    /// Add a user phrase; returns false if it was already present.
    pub fn add_user_phrase<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> bool {
        let value = value.into();
        let list = self.user_phrases.entry(key.into()).or_default();
        if list.contains(&value) {
            return false;
        }
        list.push(value);
        true
    }

    pub fn user_phrases(&self) -> &AHashMap<String, Vec<String>> {
        &self.user_phrases
    }

    /// Number of keys with system phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.user_phrases.is_empty()
    }

    /// Parse a phrase table of the form `{"key": [["value", score], ...]}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let table: HashMap<String, Vec<(String, f64)>> =
            serde_json::from_str(content).context("parse phrase table json")?;
        Ok(Self {
            phrases: table.into_iter().collect(),
            user_phrases: AHashMap::new(),
        })
    }

    /// Load a JSON phrase table from disk (see `from_json_str`).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read phrase table {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("load {}", path.display()))
    }
}

impl LanguageModel for InMemoryLanguageModel {
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram> {
        if key == SPACE_READING {
            return vec![Unigram::from_parts(SPACE_READING, SPACE_READING, 0.0)];
        }

        let mut result: Vec<Unigram> = Vec::new();
        let mut push_unique = |value: &str, score: f64| {
            if !result.iter().any(|u| u.key_value.value == value) {
                result.push(Unigram::new(KeyValuePair::new(key, value), score));
            }
        };

        if let Some(values) = self.user_phrases.get(key) {
            for value in values {
                push_unique(value.as_str(), 0.0);
            }
        }
        if let Some(entries) = self.phrases.get(key) {
            for (value, score) in entries {
                push_unique(value.as_str(), *score);
            }
        }
        result
    }

    fn has_unigrams_for_key(&self, key: &str) -> bool {
        key == SPACE_READING
            || self.user_phrases.get(key).is_some_and(|v| !v.is_empty())
            || self.phrases.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// Wraps a model with an LRU cache of `unigrams_for_key` results.
///
/// Call `clear_cache` after changing the wrapped model's phrase table.
pub struct CachedLanguageModel<M> {
    inner: M,
    cache: RefCell<LruCache<String, Vec<Unigram>>>,
    cache_hits: RefCell<usize>,
    cache_misses: RefCell<usize>,
}

impl<M: LanguageModel> CachedLanguageModel<M> {
    pub fn new(inner: M, capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_LM_CACHE_SIZE } else { capacity };
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: RefCell::new(LruCache::new(capacity)),
            cache_hits: RefCell::new(0),
            cache_misses: RefCell::new(0),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Mutable access to the wrapped model. Clears the cache, since the
    /// phrase table may change.
    pub fn inner_mut(&mut self) -> &mut M {
        self.clear_cache();
        &mut self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    /// Returns `(hits, misses)`.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.cache_hits.borrow(), *self.cache_misses.borrow())
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        *self.cache_hits.borrow_mut() = 0;
        *self.cache_misses.borrow_mut() = 0;
    }
}

impl<M: LanguageModel> LanguageModel for CachedLanguageModel<M> {
    fn unigrams_for_key(&self, key: &str) -> Vec<Unigram> {
        if let Some(cached) = self.cache.borrow_mut().get(key) {
            *self.cache_hits.borrow_mut() += 1;
            return cached.clone();
        }
        *self.cache_misses.borrow_mut() += 1;

        let unigrams = self.inner.unigrams_for_key(key);
        self.cache.borrow_mut().put(key.to_string(), unigrams.clone());
        unigrams
    }

    fn has_unigrams_for_key(&self, key: &str) -> bool {
        if let Some(cached) = self.cache.borrow().peek(key) {
            return !cached.is_empty();
        }
        self.inner.has_unigrams_for_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> InMemoryLanguageModel {
        let mut lm = InMemoryLanguageModel::new();
        lm.insert("ㄋㄧˇ", "你", -3.0);
        lm.insert("ㄋㄧˇ", "妳", -5.0);
        lm.insert("ㄋㄧˇ", "你", -4.0);
        lm
    }

    #[test]
    fn returns_system_phrases_once_per_value() {
        let lm = model();
        let values: Vec<(String, f64)> = lm
            .unigrams_for_key("ㄋㄧˇ")
            .into_iter()
            .map(|u| (u.key_value.value, u.score))
            .collect();
        assert_eq!(values, vec![("你".to_string(), -3.0), ("妳".to_string(), -5.0)]);
        assert!(lm.has_unigrams_for_key("ㄋㄧˇ"));
        assert!(!lm.has_unigrams_for_key("ㄏㄠˇ"));
        assert!(lm.unigrams_for_key("ㄏㄠˇ").is_empty());
    }

    #[test]
    fn user_phrases_come_first_with_zero_score() {
        let mut lm = model();
        assert!(lm.add_user_phrase("ㄋㄧˇ", "妳"));
        assert!(!lm.add_user_phrase("ㄋㄧˇ", "妳"));
        let u = lm.unigrams_for_key("ㄋㄧˇ");
        assert_eq!(u[0].value(), "妳");
        assert_eq!(u[0].score, 0.0);
        assert_eq!(u.len(), 2);
    }

    #[test]
    fn space_maps_to_itself() {
        let lm = InMemoryLanguageModel::new();
        assert!(lm.has_unigrams_for_key(" "));
        assert_eq!(lm.unigrams_for_key(" ")[0].value(), " ");
    }

    #[test]
    fn parses_json_table() {
        let lm = InMemoryLanguageModel::from_json_str(r#"{"ㄏㄠˇ": [["好", -2.5], ["郝", -7.0]]}"#)
            .expect("parse");
        assert_eq!(lm.len(), 1);
        assert_eq!(lm.unigrams_for_key("ㄏㄠˇ")[1].value(), "郝");
        assert!(InMemoryLanguageModel::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn loads_json_file() {
        let path = std::env::temp_dir().join(format!(
            "libchinese_grid_test_lm_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"ㄕˋ": [["是", -1.0]]}"#).expect("write");
        let lm = InMemoryLanguageModel::load_json(&path).expect("load");
        assert!(lm.has_unigrams_for_key("ㄕˋ"));
        let _ = std::fs::remove_file(&path);

        assert!(InMemoryLanguageModel::load_json("/nonexistent/table.json").is_err());
    }

    #[test]
    fn cache_counts_hits_and_clears() {
        let cached = CachedLanguageModel::new(model(), 4);
        assert_eq!(cached.unigrams_for_key("ㄋㄧˇ").len(), 2);
        assert_eq!(cached.unigrams_for_key("ㄋㄧˇ").len(), 2);
        assert!(cached.unigrams_for_key("ㄏㄠˇ").is_empty());
        assert_eq!(cached.cache_stats(), (1, 2));
        assert!(!cached.has_unigrams_for_key("ㄏㄠˇ"));

        cached.clear_cache();
        assert_eq!(cached.cache_stats(), (0, 0));
    }

    #[test]
    fn inner_mut_invalidates_cache() {
        let mut cached = CachedLanguageModel::new(model(), 0);
        assert!(cached.unigrams_for_key("ㄏㄠˇ").is_empty());
        cached.inner_mut().insert("ㄏㄠˇ", "好", -2.0);
        assert_eq!(cached.unigrams_for_key("ㄏㄠˇ").len(), 1);
    }
}
