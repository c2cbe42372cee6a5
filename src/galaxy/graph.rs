//! Reachability graph construction.
//!
//! A `StarGraph` is a directed adjacency map from a star to the set of
//! stars reachable from it in a single jump under one specific range
//! function. The AI builds several of these per tick with different
//! (source set, destination set, range) combinations and never mutates
//! them afterwards.

use std::collections::{BTreeMap, BTreeSet};

use super::star::StarId;
use super::Galaxy;

/// Directed reachability: star -> stars reachable in one jump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarGraph {
    edges: BTreeMap<StarId, BTreeSet<StarId>>,
}

impl StarGraph {
    /// Stars reachable from `from` in one jump. Empty if `from` is not a source.
    pub fn neighbors(&self, from: StarId) -> impl Iterator<Item = StarId> + '_ {
        self.edges.get(&from).into_iter().flatten().copied()
    }

    /// True if `to` is directly reachable from `from`.
    pub fn contains_edge(&self, from: StarId, to: StarId) -> bool {
        self.edges.get(&from).is_some_and(|set| set.contains(&to))
    }

    /// All source stars with at least one outgoing edge, in id order.
    pub fn sources(&self) -> impl Iterator<Item = StarId> + '_ {
        self.edges.keys().copied()
    }

    /// Number of outgoing edges from `from`.
    pub fn degree(&self, from: StarId) -> usize {
        self.edges.get(&from).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The symmetric closure: every edge also present in reverse. The
    /// assignment search traverses graphs in this form.
    pub fn undirected(&self) -> StarGraph {
        let mut edges = self.edges.clone();
        for (&from, set) in &self.edges {
            for &to in set {
                edges.entry(to).or_default().insert(from);
            }
        }
        StarGraph { edges }
    }

    #[cfg(test)]
    fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }
}

/// Builds the directed reachability graph for one range function.
///
/// For every star in `from`, includes every star in `to` (excluding itself)
/// whose travel distance is within `range`. Wormhole pairs count as zero
/// distance, so they are always mutually reachable. Pure; O(|from| * |to|).
pub fn build_star_graph(galaxy: &Galaxy, from: &[StarId], to: &[StarId], range: f64) -> StarGraph {
    let mut edges: BTreeMap<StarId, BTreeSet<StarId>> = BTreeMap::new();
    for &source in from {
        let mut reachable = BTreeSet::new();
        for &dest in to {
            if dest == source {
                continue;
            }
            if galaxy.distance(source, dest) <= range {
                reachable.insert(dest);
            }
        }
        if !reachable.is_empty() {
            edges.insert(source, reachable);
        }
    }
    StarGraph { edges }
}
