//! Best-path search over a `Grid`.
//!
//! The walker starts at position 0 and, at every position, tries each node
//! starting there, recursing past it. The path whose last anchor carries the
//! highest accumulated score wins; ties keep the first path found, and nodes
//! are tried in descending score order.
//!
//! Two rules bend the plain maximum:
//! - a node at or above `SELECTED_CANDIDATE_SCORE` (a user override) is taken
//!   on its own, without exploring its neighbours;
//! - when a position offers multi-reading phrases, a run of single-reading
//!   nodes starting there whose joined text re-spells one of those phrases is
//!   charged `DROPPED_PATH_SCORE`, so the phrase is kept whole.

use crate::{Grid, NodeAnchor, SELECTED_CANDIDATE_SCORE};
use ahash::AHashMap;
use tracing::{debug, trace};

/// Penalty for a single-reading run that re-spells an available long phrase.
pub const DROPPED_PATH_SCORE: f64 = -999.0;

/// Best untracked suffix per location, scored from zero.
type SuffixMemo<'a> = AHashMap<usize, Vec<NodeAnchor<'a>>>;

pub struct Walker<'a> {
    grid: &'a Grid,
}

impl<'a> Walker<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The highest-scoring path from `location` to the end of the grid.
    ///
    /// Positions without nodes end the path early; callers should make sure
    /// every reading has at least a single-reading node.
    pub fn walk(&self, location: usize) -> Vec<NodeAnchor<'a>> {
        let mut memo = SuffixMemo::default();
        let path = self.walk_from(location, 0.0, "", &[], &mut memo);
        debug!(
            location,
            width = self.grid.width(),
            nodes = path.len(),
            score = path.last().map(|a| a.accumulated_score).unwrap_or(0.0),
            values = %values_of(&path).join(" "),
            "walked grid"
        );
        path
    }

    fn walk_from(
        &self,
        location: usize,
        accumulated_score: f64,
        joined_phrase: &str,
        long_phrases: &[String],
        memo: &mut SuffixMemo<'a>,
    ) -> Vec<NodeAnchor<'a>> {
        if location >= self.grid.width() {
            return Vec::new();
        }

        if joined_phrase.is_empty() && long_phrases.is_empty() {
            if let Some(suffix) = memo.get(&location) {
                return rebase(suffix.clone(), accumulated_score);
            }
            let suffix = self.best_path_at(location, 0.0, "", &[], memo);
            memo.insert(location, suffix.clone());
            return rebase(suffix, accumulated_score);
        }

        self.best_path_at(location, accumulated_score, joined_phrase, long_phrases, memo)
    }

    fn best_path_at(
        &self,
        location: usize,
        accumulated_score: f64,
        joined_phrase: &str,
        long_phrases: &[String],
        memo: &mut SuffixMemo<'a>,
    ) -> Vec<NodeAnchor<'a>> {
        let mut nodes = self.grid.nodes_at(location);
        if nodes.is_empty() {
            trace!(location, "no nodes at location");
            return Vec::new();
        }
        nodes.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut paths: Vec<Vec<NodeAnchor<'a>>> = Vec::with_capacity(nodes.len());

        if nodes[0].score() >= SELECTED_CANDIDATE_SCORE {
            let mut node = nodes[0];
            node.accumulated_score = accumulated_score + node.score();
            trace!(location, value = node.value(), "override wins");
            let suffix = self.walk_from(node.end(), node.accumulated_score, "", &[], memo);
            paths.push(prepend(node, suffix));
        } else if !long_phrases.is_empty() {
            let longest = long_phrases[0].chars().count();
            for mut node in nodes {
                let joined = format!("{joined_phrase}{}", node.value());
                node.accumulated_score = accumulated_score + node.score();

                let suffix = if long_phrases.contains(&joined) {
                    trace!(location, joined = %joined, "run re-spells a long phrase");
                    node.accumulated_score += DROPPED_PATH_SCORE;
                    self.walk_from(node.end(), node.accumulated_score, "", &[], memo)
                } else if joined.chars().count() >= longest {
                    self.walk_from(node.end(), node.accumulated_score, "", &[], memo)
                } else {
                    self.walk_from(node.end(), node.accumulated_score, &joined, long_phrases, memo)
                };
                paths.push(prepend(node, suffix));
            }
        } else {
            let mut new_long_phrases: Vec<String> = nodes
                .iter()
                .filter(|n| n.spanning_length >= 2)
                .map(|n| n.value().to_string())
                .collect();
            new_long_phrases.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));

            for mut node in nodes {
                node.accumulated_score = accumulated_score + node.score();
                let suffix = if node.spanning_length > 1 {
                    self.walk_from(node.end(), node.accumulated_score, "", &[], memo)
                } else {
                    self.walk_from(
                        location + 1,
                        node.accumulated_score,
                        node.value(),
                        &new_long_phrases,
                        memo,
                    )
                };
                paths.push(prepend(node, suffix));
            }
        }

        let mut best: Option<Vec<NodeAnchor<'a>>> = None;
        for path in paths {
            let better = match &best {
                None => true,
                Some(current) => terminal_score(&path) > terminal_score(current),
            };
            if better {
                best = Some(path);
            }
        }
        best.unwrap_or_default()
    }

    /// Every complete path from position 0 to `location`, in reading order.
    ///
    /// Each anchor's `accumulated_score` is the running total starting from
    /// `accumulated_score`. Exhaustive; meant for diagnostics and tests.
    pub fn dump_paths(&self, location: usize, accumulated_score: f64) -> Vec<Vec<NodeAnchor<'a>>> {
        if location == 0 || location > self.grid.width() {
            return Vec::new();
        }
        let mut paths = self.paths_ending_at(location);
        for path in paths.iter_mut() {
            let mut running = accumulated_score;
            for anchor in path.iter_mut() {
                running += anchor.score();
                anchor.accumulated_score = running;
            }
        }
        paths
    }

    fn paths_ending_at(&self, location: usize) -> Vec<Vec<NodeAnchor<'a>>> {
        if location == 0 {
            return vec![Vec::new()];
        }
        let mut paths = Vec::new();
        for anchor in self.grid.nodes_ending_at(location) {
            for mut prefix in self.paths_ending_at(anchor.location) {
                prefix.push(anchor);
                paths.push(prefix);
            }
        }
        paths
    }
}

/// Sum of the node scores along `path`.
pub fn path_score(path: &[NodeAnchor<'_>]) -> f64 {
    path.iter().map(NodeAnchor::score).sum()
}

/// Selected candidate text of every node along `path`.
pub fn values_of<'a>(path: &[NodeAnchor<'a>]) -> Vec<&'a str> {
    path.iter().map(NodeAnchor::value).collect()
}

/// Reading key of every node along `path`.
pub fn readings_of<'a>(path: &[NodeAnchor<'a>]) -> Vec<&'a str> {
    path.iter().map(NodeAnchor::key).collect()
}

fn terminal_score(path: &[NodeAnchor<'_>]) -> f64 {
    path.last().map(|a| a.accumulated_score).unwrap_or(f64::NEG_INFINITY)
}

fn prepend<'a>(node: NodeAnchor<'a>, suffix: Vec<NodeAnchor<'a>>) -> Vec<NodeAnchor<'a>> {
    let mut path = Vec::with_capacity(suffix.len() + 1);
    path.push(node);
    path.extend(suffix);
    path
}

fn rebase(mut path: Vec<NodeAnchor<'_>>, offset: f64) -> Vec<NodeAnchor<'_>> {
    for anchor in path.iter_mut() {
        anchor.accumulated_score += offset;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, Unigram};

    fn node(key: &str, value: &str, score: f64) -> Node {
        Node::new(key, vec![Unigram::from_parts(key, value, score)])
    }

    #[test]
    fn empty_grid_walks_to_empty_path() {
        let grid = Grid::new();
        assert!(Walker::new(&grid).walk(0).is_empty());
        assert!(Walker::new(&grid).dump_paths(0, 0.0).is_empty());
    }

    #[test]
    fn prefers_higher_total() {
        let mut grid = Grid::new();
        grid.insert_node(node("a", "A", -1.0), 0, 1);
        grid.insert_node(node("b", "B", -1.0), 1, 1);
        grid.insert_node(node("a-b", "X", -3.0), 0, 2);

        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["A", "B"]);
        assert_eq!(path_score(&path), -2.0);
        assert_eq!(path.last().unwrap().accumulated_score, -2.0);
    }

    #[test]
    fn single_run_respelling_long_phrase_is_penalized() {
        let mut grid = Grid::new();
        grid.insert_node(node("ㄋㄧˇ", "你", -1.0), 0, 1);
        grid.insert_node(node("ㄏㄠˇ", "好", -1.0), 1, 1);
        grid.insert_node(node("ㄋㄧˇ-ㄏㄠˇ", "你好", -3.0), 0, 2);

        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["你好"]);
        assert_eq!(readings_of(&path), vec!["ㄋㄧˇ-ㄏㄠˇ"]);
    }

    #[test]
    fn override_beats_statistics() {
        let mut grid = Grid::new();
        grid.insert_node(node("a", "A", -5.0), 0, 1);
        grid.insert_node(node("b", "B", -5.0), 1, 1);
        grid.insert_node(node("a-b", "X", -1.0), 0, 2);
        grid.fix_node_selected_candidate(0, "A");

        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["A", "B"]);
    }

    #[test]
    fn zero_scores_are_not_dropped() {
        let mut grid = Grid::new();
        grid.insert_node(node("a", "A", 0.0), 0, 1);
        grid.insert_node(node("b", "B", -0.5), 1, 1);

        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["A", "B"]);
        assert_eq!(path[0].accumulated_score, 0.0);
        assert_eq!(path[1].accumulated_score, -0.5);
    }

    #[test]
    fn gap_ends_path_early() {
        let mut grid = Grid::new();
        grid.insert_node(node("a", "A", -1.0), 0, 1);
        grid.insert_node(node("c", "C", -1.0), 2, 1);

        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["A"]);
    }

    #[test]
    fn ties_keep_first_found() {
        let mut grid = Grid::new();
        grid.insert_node(
            Node::new(
                "a",
                vec![Unigram::from_parts("a", "A1", -1.0), Unigram::from_parts("a", "A2", -1.0)],
            ),
            0,
            1,
        );
        grid.insert_node(node("b", "B", -1.0), 1, 1);
        grid.insert_node(node("a-b", "AB2", -2.0), 0, 2);

        // A1 B and AB2 both total -2; the path found first is kept
        let path = Walker::new(&grid).walk(0);
        assert_eq!(values_of(&path), vec!["A1", "B"]);
    }

    #[test]
    fn dump_paths_lists_complete_paths_in_order() {
        let mut grid = Grid::new();
        grid.insert_node(node("a", "A", -1.0), 0, 1);
        grid.insert_node(node("b", "B", -2.0), 1, 1);
        grid.insert_node(node("c", "C", -3.0), 2, 1);
        grid.insert_node(node("b-c", "BC", -4.0), 1, 2);

        let paths = Walker::new(&grid).dump_paths(3, 0.0);
        let values: Vec<Vec<&str>> = paths.iter().map(|p| values_of(p)).collect();
        assert_eq!(values, vec![vec!["A", "BC"], vec!["A", "B", "C"]]);
        assert_eq!(paths[0].last().unwrap().accumulated_score, -5.0);
        assert_eq!(paths[1].last().unwrap().accumulated_score, -6.0);
        assert_eq!(paths[1][0].accumulated_score, -1.0);

        let offset = Walker::new(&grid).dump_paths(3, 10.0);
        assert_eq!(offset[0].last().unwrap().accumulated_score, 5.0);
    }
}
