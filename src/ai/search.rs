//! Assignment pool and best-first sourcing search.
//!
//! The pool holds what each owned star can still contribute this tick:
//! its garrison plus any idle fleets docked there. Orders consume it
//! destructively, so ships granted to one order are invisible to the next.
//! The search walks outward from an order's target star, cheapest cumulative
//! distance first, and reports every pool entry it reaches within the tick
//! budget. Callers decide per hit whether to keep searching.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::ai::context::Context;
use crate::galaxy::{FleetId, Galaxy, StarGraph, StarId};

/// What one owned star can contribute: its garrison plus docked idle fleets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub star: StarId,
    /// Idle fleets docked at the star, available for reuse.
    pub idle_fleets: Vec<FleetId>,
    /// Garrisoned ships plus ships aboard the idle fleets.
    pub total_ships: u32,
}

/// The per-tick pool of assignments, keyed by star.
///
/// Built once after context construction and consumed destructively by the
/// order evaluator and the logistics planner.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPool {
    entries: BTreeMap<StarId, Assignment>,
}

impl AssignmentPool {
    /// One entry per owned star that has a garrison or an idle fleet.
    pub fn from_context(galaxy: &Galaxy, ctx: &Context) -> Self {
        let mut entries = BTreeMap::new();
        for &star_id in &ctx.owned_stars {
            let Some(star) = galaxy.star(star_id) else {
                continue;
            };
            let idle_fleets = ctx.idle_fleets.get(&star_id).cloned().unwrap_or_default();
            let fleet_ships: u32 = idle_fleets
                .iter()
                .filter_map(|id| galaxy.fleet(*id))
                .map(|f| f.ships)
                .sum();
            let total_ships = star.garrison + fleet_ships;
            if total_ships == 0 && idle_fleets.is_empty() {
                continue;
            }
            entries.insert(star_id, Assignment { star: star_id, idle_fleets, total_ships });
        }
        AssignmentPool { entries }
    }

    pub fn get(&self, star: StarId) -> Option<&Assignment> {
        self.entries.get(&star)
    }

    pub fn get_mut(&mut self, star: StarId) -> Option<&mut Assignment> {
        self.entries.get_mut(&star)
    }

    pub fn remove(&mut self, star: StarId) -> Option<Assignment> {
        self.entries.remove(&star)
    }

    pub fn stars(&self) -> impl Iterator<Item = StarId> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A pool entry reached by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The assignment's star.
    pub star: StarId,
    /// Cumulative flight distance from the star to the search target.
    pub distance: f64,
    /// Travel time for that distance, in whole ticks.
    pub ticks: u32,
    /// The path to fly, hit star first and search target last.
    pub trace: Vec<StarId>,
}

/// Returned by the hit callback to continue or end the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Continue,
    Stop,
}

struct Candidate {
    distance: f64,
    star: StarId,
    trace: Vec<StarId>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed: BinaryHeap is a max-heap, we want the nearest star first.
    // Ties break on star id for determinism.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.star.cmp(&self.star))
    }
}

/// Best-first search outward from `target` over `graph`, treated as already
/// symmetric (pass [`StarGraph::undirected`] for movement graphs).
///
/// Every pool entry reached within `tick_budget` travel ticks that has an
/// idle fleet, or passes `can_purchase`, is reported to `on_hit` in
/// ascending-distance order. Stars are expanded at most once, so each hit
/// carries the cheapest trace to the target. `edge_filter` can veto
/// individual edges, letting callers route claims around owned space.
#[allow(clippy::too_many_arguments)]
pub fn search_assignments<P, F>(
    galaxy: &Galaxy,
    graph: &StarGraph,
    pool: &AssignmentPool,
    target: StarId,
    tick_budget: u32,
    can_purchase: P,
    edge_filter: Option<&dyn Fn(StarId, StarId) -> bool>,
    mut on_hit: F,
) where
    P: Fn(&Assignment) -> bool,
    F: FnMut(&Assignment, &SearchHit) -> SearchControl,
{
    let mut heap = BinaryHeap::new();
    let mut visited = BTreeSet::new();
    heap.push(Candidate { distance: 0.0, star: target, trace: vec![target] });

    while let Some(candidate) = heap.pop() {
        if !visited.insert(candidate.star) {
            continue;
        }

        let ticks = galaxy.travel_ticks(candidate.distance);
        if let Some(assignment) = pool.get(candidate.star) {
            if !assignment.idle_fleets.is_empty() || can_purchase(assignment) {
                let hit = SearchHit {
                    star: candidate.star,
                    distance: candidate.distance,
                    ticks,
                    trace: candidate.trace.clone(),
                };
                if on_hit(assignment, &hit) == SearchControl::Stop {
                    return;
                }
            }
        }

        for neighbor in graph.neighbors(candidate.star) {
            if visited.contains(&neighbor) {
                continue;
            }
            if let Some(filter) = edge_filter {
                if !filter(candidate.star, neighbor) {
                    continue;
                }
            }
            let distance = candidate.distance + galaxy.distance(candidate.star, neighbor);
            if galaxy.travel_ticks(distance) > tick_budget {
                continue;
            }
            let mut trace = Vec::with_capacity(candidate.trace.len() + 1);
            trace.push(neighbor);
            trace.extend_from_slice(&candidate.trace);
            heap.push(Candidate { distance, star: neighbor, trace });
        }
    }
}
