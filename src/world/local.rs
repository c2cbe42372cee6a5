//! In-memory world model.
//!
//! `LocalWorld` is the reference [`WorldOps`] implementation the tick
//! scheduler and the test suite run against. Mutations apply to the working
//! model immediately; under [`PersistMode::Defer`] they are only journaled,
//! and a single `commit` at the end of the world tick performs the one
//! durable write. Double-applying a mutation to both the model and durable
//! storage would duplicate ships and credits, so the journal count and the
//! durable-write count are observable.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::trace;

use crate::galaxy::{
    hyperspace_range, FactionId, Fleet, FleetId, Galaxy, StarId, Waypoint,
};
use crate::world::combat;
use crate::world::ops::{
    InfrastructureKind, PersistMode, RouteHop, SpendStrategy, WorldError, WorldOps,
};

/// Credits to construct one new fleet.
pub const FLEET_COST: u32 = 25;

/// Credits for the next infrastructure level: `INFRA_COST_PER_LEVEL * (level + 1)`.
pub const INFRA_COST_PER_LEVEL: u32 = 5;

/// The in-memory working model with a deferred-persistence journal.
#[derive(Debug, Clone)]
pub struct LocalWorld {
    galaxy: Galaxy,
    deferred: u64,
    durable_writes: u64,
}

impl LocalWorld {
    pub fn new(galaxy: Galaxy) -> Self {
        LocalWorld { galaxy, deferred: 0, durable_writes: 0 }
    }

    pub fn galaxy_mut(&mut self) -> &mut Galaxy {
        &mut self.galaxy
    }

    /// Mutations journaled since the last commit.
    pub fn pending_mutations(&self) -> u64 {
        self.deferred
    }

    /// Durable writes performed so far.
    pub fn durable_writes(&self) -> u64 {
        self.durable_writes
    }

    /// Writes the whole world state durably, once, flushing the journal.
    /// Called by the tick scheduler after all factions and tick phases.
    pub fn commit(&mut self) {
        trace!(galaxy = self.galaxy.id, flushed = self.deferred, "commit");
        self.deferred = 0;
        self.durable_writes += 1;
    }

    fn record(&mut self, mode: PersistMode) {
        match mode {
            PersistMode::Defer => self.deferred += 1,
            PersistMode::Persist => self.durable_writes += 1,
        }
    }
}

impl WorldOps for LocalWorld {
    fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    fn defense_requirement(&self, target: StarId, attackers: u32, en_route: u32) -> u32 {
        combat::defense_requirement(&self.galaxy, target, attackers, en_route)
    }

    fn invasion_requirement(&self, target: StarId, eta_ticks: u32) -> u32 {
        combat::invasion_requirement(&self.galaxy, target, eta_ticks)
    }

    fn build_fleet(
        &mut self,
        star_id: StarId,
        ships: u32,
        mode: PersistMode,
    ) -> Result<FleetId, WorldError> {
        let star = self.galaxy.star(star_id).ok_or(WorldError::UnknownStar(star_id))?;
        if star.dead {
            return Err(WorldError::DeadStar(star_id));
        }
        let owner = star.owner.ok_or(WorldError::UnknownStar(star_id))?;
        if star.garrison < ships {
            return Err(WorldError::InsufficientGarrison {
                star: star_id,
                requested: ships,
                available: star.garrison,
            });
        }
        let credits = self
            .galaxy
            .faction(owner)
            .ok_or(WorldError::UnknownFaction(owner))?
            .credits;
        if credits < FLEET_COST {
            return Err(WorldError::InsufficientFunds {
                required: FLEET_COST,
                available: credits,
            });
        }

        let position = star.position;
        let id = self.galaxy.allocate_fleet_id();
        if let Some(faction) = self.galaxy.factions.get_mut(&owner) {
            faction.credits -= FLEET_COST;
        }
        if let Some(star) = self.galaxy.stars.get_mut(&star_id) {
            star.garrison -= ships;
        }
        self.galaxy.add_fleet(Fleet::docked(id, owner, ships, star_id, position));
        self.record(mode);
        Ok(id)
    }

    fn transfer_ships(
        &mut self,
        fleet_id: FleetId,
        fleet_ships: u32,
        star_id: StarId,
        star_garrison: u32,
        mode: PersistMode,
    ) -> Result<(), WorldError> {
        let fleet = self.galaxy.fleet(fleet_id).ok_or(WorldError::UnknownFleet(fleet_id))?;
        let star = self.galaxy.star(star_id).ok_or(WorldError::UnknownStar(star_id))?;
        if fleet.orbiting != Some(star_id) {
            return Err(WorldError::NotDocked { fleet: fleet_id, star: star_id });
        }
        let total = fleet.ships + star.garrison;
        if fleet_ships + star_garrison != total {
            return Err(WorldError::UnbalancedTransfer { fleet_ships, star_garrison, total });
        }
        if let Some(fleet) = self.galaxy.fleets.get_mut(&fleet_id) {
            fleet.ships = fleet_ships;
        }
        if let Some(star) = self.galaxy.stars.get_mut(&star_id) {
            star.garrison = star_garrison;
        }
        self.record(mode);
        Ok(())
    }

    fn assign_movement_plan(
        &mut self,
        fleet_id: FleetId,
        waypoints: Vec<Waypoint>,
        looped: bool,
        mode: PersistMode,
    ) -> Result<(), WorldError> {
        let fleet = self
            .galaxy
            .fleets
            .get_mut(&fleet_id)
            .ok_or(WorldError::UnknownFleet(fleet_id))?;
        fleet.waypoints = waypoints;
        fleet.looped = looped;
        self.record(mode);
        Ok(())
    }

    fn bulk_spend(
        &mut self,
        faction: FactionId,
        strategy: SpendStrategy,
        kind: InfrastructureKind,
        amount: u32,
        mode: PersistMode,
    ) -> Result<u32, WorldError> {
        if self.galaxy.faction(faction).is_none() {
            return Err(WorldError::UnknownFaction(faction));
        }
        let SpendStrategy::CheapestFirst = strategy;

        let mut spent = 0u32;
        loop {
            let credits = self.galaxy.faction(faction).map_or(0, |f| f.credits);
            let budget = (amount - spent).min(credits);

            // Cheapest next level across all owned stars.
            let cheapest = self
                .galaxy
                .stars
                .values()
                .filter(|s| s.is_owned_by(faction) && !s.dead)
                .map(|s| {
                    let level = match kind {
                        InfrastructureKind::Economy => s.infrastructure.economy,
                        InfrastructureKind::Industry => s.infrastructure.industry,
                        InfrastructureKind::Science => s.infrastructure.science,
                    };
                    (INFRA_COST_PER_LEVEL * (level + 1), s.id)
                })
                .min();
            let Some((cost, star_id)) = cheapest else { break };
            if cost > budget {
                break;
            }

            if let Some(f) = self.galaxy.factions.get_mut(&faction) {
                f.credits -= cost;
            }
            if let Some(s) = self.galaxy.stars.get_mut(&star_id) {
                match kind {
                    InfrastructureKind::Economy => s.infrastructure.economy += 1,
                    InfrastructureKind::Industry => s.infrastructure.industry += 1,
                    InfrastructureKind::Science => s.infrastructure.science += 1,
                }
            }
            spent += cost;
        }

        if spent > 0 {
            self.record(mode);
        }
        Ok(spent)
    }

    fn shortest_route(&self, fleet_id: FleetId, from: StarId, to: StarId) -> Vec<RouteHop> {
        let Some(fleet) = self.galaxy.fleet(fleet_id) else {
            return Vec::new();
        };
        let range = self
            .galaxy
            .faction(fleet.owner)
            .map_or(0.0, |f| hyperspace_range(f.hyperspace));
        dijkstra_route(&self.galaxy, from, to, range)
    }
}

/// Heap entry ordered so the smallest cumulative distance pops first.
#[derive(Debug)]
struct RouteCandidate {
    distance: f64,
    star: StarId,
}

impl PartialEq for RouteCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for RouteCandidate {}
impl PartialOrd for RouteCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for RouteCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.star.cmp(&self.star))
    }
}

/// Dijkstra over single-jump edges within `range`. Returns both endpoints,
/// or an empty route when `to` is unreachable.
fn dijkstra_route(galaxy: &Galaxy, from: StarId, to: StarId, range: f64) -> Vec<RouteHop> {
    let all = galaxy.all_star_ids();
    let mut best: HashMap<StarId, f64> = HashMap::new();
    let mut prev: HashMap<StarId, StarId> = HashMap::new();
    let mut settled: HashSet<StarId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    best.insert(from, 0.0);
    heap.push(RouteCandidate { distance: 0.0, star: from });

    while let Some(RouteCandidate { distance, star }) = heap.pop() {
        if !settled.insert(star) {
            continue;
        }
        if star == to {
            break;
        }
        for &next in &all {
            if next == star || settled.contains(&next) {
                continue;
            }
            let hop = galaxy.distance(star, next);
            if hop > range {
                continue;
            }
            let candidate = distance + hop;
            if best.get(&next).map_or(true, |&d| candidate < d) {
                best.insert(next, candidate);
                prev.insert(next, star);
                heap.push(RouteCandidate { distance: candidate, star: next });
            }
        }
    }

    if !settled.contains(&to) {
        return Vec::new();
    }
    let mut route = vec![RouteHop { star: to, cumulative_distance: best[&to] }];
    let mut cursor = to;
    while let Some(&p) = prev.get(&cursor) {
        route.push(RouteHop { star: p, cumulative_distance: best[&p] });
        cursor = p;
    }
    route.reverse();
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{Faction, Point, Star, WaypointAction};

    fn world_fixture() -> LocalWorld {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_faction(Faction::new(FactionId(1), 1, 1, 100));
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(FactionId(1), 10));
        galaxy.add_star(Star::new(StarId(2), 35.0, 0.0).owned_by(FactionId(1), 0));
        galaxy.add_star(Star::new(StarId(3), 70.0, 0.0));
        LocalWorld::new(galaxy)
    }

    #[test]
    fn build_fleet_moves_garrison_and_charges_credits() {
        let mut world = world_fixture();
        let id = world.build_fleet(StarId(1), 3, PersistMode::Defer).unwrap();
        let galaxy = world.galaxy();
        assert_eq!(galaxy.fleet(id).unwrap().ships, 3);
        assert_eq!(galaxy.fleet(id).unwrap().orbiting, Some(StarId(1)));
        assert_eq!(galaxy.star(StarId(1)).unwrap().garrison, 7);
        assert_eq!(galaxy.faction(FactionId(1)).unwrap().credits, 100 - FLEET_COST);
    }

    #[test]
    fn build_fleet_rejects_dead_star_and_poverty() {
        let mut world = world_fixture();
        world.galaxy_mut().stars.get_mut(&StarId(1)).unwrap().dead = true;
        assert_eq!(
            world.build_fleet(StarId(1), 1, PersistMode::Defer),
            Err(WorldError::DeadStar(StarId(1)))
        );

        let mut poor = world_fixture();
        poor.galaxy_mut().factions.get_mut(&FactionId(1)).unwrap().credits = 0;
        let err = poor.build_fleet(StarId(1), 1, PersistMode::Defer).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn transfer_requires_conservation() {
        let mut world = world_fixture();
        let fleet = world.build_fleet(StarId(1), 1, PersistMode::Defer).unwrap();
        // 1 on fleet + 9 at star; rebalance to 6 + 4.
        world.transfer_ships(fleet, 6, StarId(1), 4, PersistMode::Defer).unwrap();
        assert_eq!(world.galaxy().fleet(fleet).unwrap().ships, 6);
        assert_eq!(world.galaxy().star(StarId(1)).unwrap().garrison, 4);

        let err = world.transfer_ships(fleet, 6, StarId(1), 5, PersistMode::Defer).unwrap_err();
        assert!(matches!(err, WorldError::UnbalancedTransfer { .. }));
    }

    #[test]
    fn deferred_mutations_produce_no_durable_writes_until_commit() {
        let mut world = world_fixture();
        let fleet = world.build_fleet(StarId(1), 2, PersistMode::Defer).unwrap();
        world.transfer_ships(fleet, 5, StarId(1), 5, PersistMode::Defer).unwrap();
        world
            .assign_movement_plan(
                fleet,
                vec![Waypoint::new(StarId(1), StarId(2), WaypointAction::None)],
                false,
                PersistMode::Defer,
            )
            .unwrap();

        assert_eq!(world.durable_writes(), 0);
        assert_eq!(world.pending_mutations(), 3);

        world.commit();
        assert_eq!(world.durable_writes(), 1);
        assert_eq!(world.pending_mutations(), 0);
    }

    #[test]
    fn persist_mode_writes_through() {
        let mut world = world_fixture();
        world.build_fleet(StarId(1), 1, PersistMode::Persist).unwrap();
        assert_eq!(world.durable_writes(), 1);
        assert_eq!(world.pending_mutations(), 0);
    }

    #[test]
    fn bulk_spend_buys_cheapest_levels_first() {
        let mut world = world_fixture();
        // Star 1 and 2 both at economy level 0: next level costs 5 each,
        // then 10 each.
        let spent = world
            .bulk_spend(
                FactionId(1),
                SpendStrategy::CheapestFirst,
                InfrastructureKind::Economy,
                12,
                PersistMode::Defer,
            )
            .unwrap();
        assert_eq!(spent, 10);
        let galaxy = world.galaxy();
        assert_eq!(galaxy.star(StarId(1)).unwrap().infrastructure.economy, 1);
        assert_eq!(galaxy.star(StarId(2)).unwrap().infrastructure.economy, 1);
        assert_eq!(galaxy.faction(FactionId(1)).unwrap().credits, 90);
    }

    #[test]
    fn shortest_route_chains_jumps_within_range() {
        let mut world = world_fixture();
        let fleet = world.build_fleet(StarId(1), 1, PersistMode::Defer).unwrap();
        // Hyperspace level 1 -> range 40: star 3 takes two hops via star 2.
        let route = world.shortest_route(fleet, StarId(1), StarId(3));
        let stars: Vec<StarId> = route.iter().map(|h| h.star).collect();
        assert_eq!(stars, vec![StarId(1), StarId(2), StarId(3)]);
        assert!((route[2].cumulative_distance - 70.0).abs() < 1e-9);
    }

    #[test]
    fn shortest_route_prefers_wormholes() {
        let mut world = world_fixture();
        world.galaxy_mut().add_wormhole(StarId(1), StarId(3));
        let fleet = world.build_fleet(StarId(1), 1, PersistMode::Defer).unwrap();
        let route = world.shortest_route(fleet, StarId(1), StarId(3));
        let stars: Vec<StarId> = route.iter().map(|h| h.star).collect();
        assert_eq!(stars, vec![StarId(1), StarId(3)]);
        assert_eq!(route[1].cumulative_distance, 0.0);
    }

    #[test]
    fn shortest_route_empty_when_unreachable() {
        let mut world = world_fixture();
        world.galaxy_mut().add_star(Star::new(StarId(9), 1000.0, 1000.0));
        let fleet = world.build_fleet(StarId(1), 1, PersistMode::Defer).unwrap();
        assert!(world.shortest_route(fleet, StarId(1), StarId(9)).is_empty());
    }
}
