//! Keeps a `Grid` in step with an editable sequence of readings.
//!
//! Every edit opens or closes a grid position at the cursor and then asks
//! the language model for phrases around it, so the lattice always holds
//! every known phrase within `max_build_span_length` readings of the edit.

use crate::{utils, Config, Grid, KeyValuePair, LanguageModel, Node, NodeAnchor, Walker};
use tracing::{debug, trace};

pub struct ReadingBuilder<M> {
    lm: M,
    config: Config,
    readings: Vec<String>,
    cursor: usize,
    grid: Grid,
}

impl<M: LanguageModel> ReadingBuilder<M> {
    pub fn new(lm: M) -> Self {
        Self::with_config(lm, Config::default())
    }

    pub fn with_config(lm: M, config: Config) -> Self {
        Self {
            lm,
            config,
            readings: Vec::new(),
            cursor: 0,
            grid: Grid::new(),
        }
    }

    pub fn language_model(&self) -> &M {
        &self.lm
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clear(&mut self) {
        self.cursor = 0;
        self.readings.clear();
        self.grid.clear();
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to `[0, len]`.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.readings.len());
    }

    pub fn readings(&self) -> &[String] {
        &self.readings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Insert `reading` at the cursor and move the cursor past it.
    pub fn insert_reading_at_cursor(&mut self, reading: &str) {
        let reading = if self.config.normalize_readings {
            utils::normalize_reading(reading)
        } else {
            reading.to_string()
        };
        debug!(cursor = self.cursor, reading = %reading, "insert reading");

        self.readings.insert(self.cursor, reading);
        self.grid.expand_grid_by_one_at_location(self.cursor);
        self.build();
        self.cursor += 1;
    }

    /// Backspace. Returns false at the start of the buffer.
    pub fn delete_reading_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let removed = self.readings.remove(self.cursor);
        debug!(cursor = self.cursor, reading = %removed, "delete reading before cursor");

        self.grid.shrink_grid_by_one_at_location(self.cursor);
        self.build();
        true
    }

    /// Forward delete. Returns false at the end of the buffer.
    pub fn delete_reading_after_cursor(&mut self) -> bool {
        if self.cursor == self.readings.len() {
            return false;
        }
        let removed = self.readings.remove(self.cursor);
        debug!(cursor = self.cursor, reading = %removed, "delete reading after cursor");

        self.grid.shrink_grid_by_one_at_location(self.cursor);
        self.build();
        true
    }

    /// Drop the first `count` readings (e.g. after committing them).
    pub fn remove_head_readings(&mut self, count: usize) -> bool {
        if count > self.readings.len() {
            return false;
        }
        for _ in 0..count {
            self.cursor = self.cursor.saturating_sub(1);
            self.readings.remove(0);
            self.grid.shrink_grid_by_one_at_location(0);
        }
        debug!(count, remaining = self.readings.len(), "removed head readings");
        self.build();
        true
    }

    /// Best path over the current readings.
    pub fn walk(&self) -> Vec<NodeAnchor<'_>> {
        Walker::new(&self.grid).walk(0)
    }

    /// Candidates offered at the cursor.
    pub fn candidates_at_cursor(&self) -> Vec<KeyValuePair> {
        self.grid.candidates_at(self.cursor)
    }

    /// Pin `value` on a node around the cursor. Returns false when no node
    /// there offers it.
    pub fn fix_candidate_at_cursor(&mut self, value: &str) -> bool {
        !self.grid.fix_node_selected_candidate(self.cursor, value).is_empty()
    }

    fn join(&self, begin: usize, end: usize) -> String {
        self.readings[begin..end].join(&self.config.join_separator)
    }

    fn build(&mut self) {
        let span_length = self.config.effective_span_length();
        let begin = self.cursor.saturating_sub(span_length);
        let end = (self.cursor + span_length).min(self.readings.len());
        trace!(begin, end, span_length, "rebuild window");

        for p in begin..end {
            for q in 1..=span_length {
                if p + q > end {
                    break;
                }
                let combined = self.join(p, p + q);
                if self
                    .grid
                    .has_node_at_location_spanning_length_matching_key(p, q, &combined)
                {
                    continue;
                }
                let unigrams = self.lm.unigrams_for_key(&combined);
                if unigrams.is_empty() {
                    continue;
                }
                trace!(location = p, length = q, key = %combined, count = unigrams.len(), "insert node");
                self.grid.insert_node(Node::new(combined, unigrams), p, q);
            }
        }
    }
}
