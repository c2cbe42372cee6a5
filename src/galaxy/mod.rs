//! Galaxy map and world-state types.
//!
//! Contains the core data structures for stars, factions, fleets, and the
//! reachability graphs built over them. The `Galaxy` struct is the working
//! model the AI reads every tick; all mutation goes through the world
//! operations in [`crate::world`].

pub mod faction;
pub mod fleet;
pub mod graph;
pub mod star;

use std::collections::BTreeMap;

pub use faction::{Faction, FactionId};
pub use fleet::{Fleet, FleetId, Waypoint, WaypointAction};
pub use graph::{build_star_graph, StarGraph};
pub use star::{Point, ResourceLevels, Star, StarId};

/// Base travel distance at hyperspace level zero.
pub const HYPERSPACE_RANGE_BASE: f64 = 30.0;
/// Base detection distance at scanning level zero.
pub const SCANNING_RANGE_BASE: f64 = 20.0;
/// Extra range granted per tech level, for both range kinds.
pub const RANGE_PER_LEVEL: f64 = 10.0;

/// Maximum travel distance per jump at the given hyperspace level.
pub fn hyperspace_range(level: u32) -> f64 {
    HYPERSPACE_RANGE_BASE + RANGE_PER_LEVEL * f64::from(level)
}

/// Maximum detection distance at the given scanning level.
pub fn scanning_range(level: u32) -> f64 {
    SCANNING_RANGE_BASE + RANGE_PER_LEVEL * f64::from(level)
}

/// The complete map state at a point in time.
///
/// Stars, fleets, and factions are kept in `BTreeMap`s so every traversal
/// the AI performs is deterministic for a given snapshot.
#[derive(Debug, Clone)]
pub struct Galaxy {
    pub id: u64,
    pub tick: u64,
    /// Ticks per production cycle; invasion and claim searches budget two cycles.
    pub ticks_per_cycle: u32,
    /// Travel distance covered per tick.
    pub speed: f64,
    pub stars: BTreeMap<StarId, Star>,
    pub fleets: BTreeMap<FleetId, Fleet>,
    pub factions: BTreeMap<FactionId, Faction>,
    next_fleet_id: u32,
}

impl Galaxy {
    /// Creates an empty galaxy with default pacing constants.
    pub fn new(id: u64) -> Self {
        Galaxy {
            id,
            tick: 0,
            ticks_per_cycle: 24,
            speed: 10.0,
            stars: BTreeMap::new(),
            fleets: BTreeMap::new(),
            factions: BTreeMap::new(),
            next_fleet_id: 0,
        }
    }

    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.insert(faction.id, faction);
    }

    pub fn add_star(&mut self, star: Star) {
        self.stars.insert(star.id, star);
    }

    /// Adds a fleet, keeping the id allocator ahead of hand-assigned ids.
    pub fn add_fleet(&mut self, fleet: Fleet) {
        self.next_fleet_id = self.next_fleet_id.max(fleet.id.0 + 1);
        self.fleets.insert(fleet.id, fleet);
    }

    /// Links two stars as a wormhole pair (zero travel distance).
    pub fn add_wormhole(&mut self, a: StarId, b: StarId) {
        if let Some(star) = self.stars.get_mut(&a) {
            star.wormhole_pair = Some(b);
        }
        if let Some(star) = self.stars.get_mut(&b) {
            star.wormhole_pair = Some(a);
        }
    }

    pub fn allocate_fleet_id(&mut self) -> FleetId {
        let id = FleetId(self.next_fleet_id);
        self.next_fleet_id += 1;
        id
    }

    pub fn star(&self, id: StarId) -> Option<&Star> {
        self.stars.get(&id)
    }

    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(&id)
    }

    /// Travel distance between two stars: zero for a wormhole pair, else
    /// straight-line distance.
    pub fn distance(&self, a: StarId, b: StarId) -> f64 {
        let (Some(sa), Some(sb)) = (self.stars.get(&a), self.stars.get(&b)) else {
            return f64::INFINITY;
        };
        if sa.wormhole_pair == Some(b) {
            return 0.0;
        }
        sa.position.distance_to(sb.position)
    }

    /// Ticks needed to cover the given distance at galaxy speed.
    pub fn travel_ticks(&self, distance: f64) -> u32 {
        (distance / self.speed).ceil() as u32
    }

    /// Ticks needed to travel between two stars.
    pub fn ticks_between(&self, a: StarId, b: StarId) -> u32 {
        self.travel_ticks(self.distance(a, b))
    }

    /// Ids of all stars owned by the faction, in id order.
    pub fn owned_star_ids(&self, faction: FactionId) -> Vec<StarId> {
        self.stars
            .values()
            .filter(|s| s.is_owned_by(faction))
            .map(|s| s.id)
            .collect()
    }

    /// Ids of all unowned stars, in id order.
    pub fn neutral_star_ids(&self) -> Vec<StarId> {
        self.stars
            .values()
            .filter(|s| s.owner.is_none())
            .map(|s| s.id)
            .collect()
    }

    /// Ids of every star on the map, in id order.
    pub fn all_star_ids(&self) -> Vec<StarId> {
        self.stars.keys().copied().collect()
    }

    /// The highest hyperspace level any faction has researched.
    pub fn max_hyperspace_level(&self) -> u32 {
        self.factions.values().map(|f| f.hyperspace).max().unwrap_or(0)
    }

    /// Remaining ticks until an in-transit fleet reaches its final waypoint
    /// destination, or `None` for an idle fleet. The first leg is measured
    /// from the fleet's current position; later legs star-to-star.
    pub fn fleet_eta(&self, fleet: &Fleet) -> Option<u32> {
        let first = fleet.waypoints.first()?;
        let first_star = self.stars.get(&first.destination)?;
        let mut ticks = self.travel_ticks(fleet.position.distance_to(first_star.position));
        for pair in fleet.waypoints.windows(2) {
            ticks += self.ticks_between(pair[0].destination, pair[1].destination);
        }
        Some(ticks)
    }
}
