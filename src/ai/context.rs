//! Per-tick decision context.
//!
//! One immutable snapshot of everything the faction's turn needs: the six
//! reachability graphs, frontier classification, incoming-threat index,
//! idle-fleet and in-transit indices, and aggregate economy figures. Built
//! once at turn start, read-only for the rest of the turn, discarded at
//! tick end.

use std::collections::BTreeMap;

use crate::ai::border::{classify_borders, BorderStarData};
use crate::galaxy::{
    build_star_graph, hyperspace_range, scanning_range, FactionId, FleetId, Galaxy, StarGraph,
    StarId,
};

/// The reachability graphs built for one faction's turn.
///
/// Each is a different (source set, destination set, range) combination of
/// the same pure builder.
#[derive(Debug, Clone)]
pub struct ContextGraphs {
    /// Mine -> all, at min(scan, hyperspace): where fleets can actually go.
    pub external: StarGraph,
    /// Mine -> mine, at hyperspace: friendly-territory movement.
    pub internal: StarGraph,
    /// Mine -> all, at max(scan, hyperspace): border detection.
    pub logical: StarGraph,
    /// Mine -> all, at scan: what each star can see.
    pub detection: StarGraph,
    /// All -> mine, at the galaxy-wide best hyperspace: who can hit us.
    pub incoming: StarGraph,
    /// Mine+neutral -> mine+neutral, at min(scan, hyperspace): expansion space.
    pub free: StarGraph,
}

/// Aggregate faction totals for the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactionTotals {
    pub economy: u32,
    pub industry: u32,
    pub science: u32,
    /// Garrisoned plus fleet-borne ships.
    pub ships: u32,
}

/// The per-faction, per-tick facts bundle.
#[derive(Debug, Clone)]
pub struct Context {
    pub faction: FactionId,
    pub tick: u64,
    pub owned_stars: Vec<StarId>,
    /// Idle fleets docked at each owned star.
    pub idle_fleets: BTreeMap<StarId, Vec<FleetId>>,
    pub graphs: ContextGraphs,
    pub borders: BTreeMap<StarId, BorderStarData>,
    /// star -> eta-in-ticks -> enemy fleets arriving then.
    pub threats: BTreeMap<StarId, BTreeMap<u32, Vec<FleetId>>>,
    /// Own in-transit fleets indexed by plan origin.
    pub in_transit_by_origin: BTreeMap<StarId, Vec<FleetId>>,
    /// Own in-transit fleets indexed by final destination.
    pub in_transit_by_destination: BTreeMap<StarId, Vec<FleetId>>,
    pub totals: FactionTotals,
    /// This faction's hyperspace travel range.
    pub internal_range: f64,
}

/// Builds the context for one faction's turn, or `None` when the faction
/// owns no stars (the turn is skipped entirely).
pub fn build_context(galaxy: &Galaxy, faction_id: FactionId) -> Option<Context> {
    let faction = galaxy.faction(faction_id)?;
    let owned = galaxy.owned_star_ids(faction_id);
    if owned.is_empty() {
        return None;
    }

    let all = galaxy.all_star_ids();
    let mut free_set = owned.clone();
    free_set.extend(galaxy.neutral_star_ids());
    free_set.sort_unstable();

    let hyper = hyperspace_range(faction.hyperspace);
    let scan = scanning_range(faction.scanning);
    let external_range = hyper.min(scan);
    let logical_range = hyper.max(scan);
    let global_range = hyperspace_range(galaxy.max_hyperspace_level());

    let graphs = ContextGraphs {
        external: build_star_graph(galaxy, &owned, &all, external_range),
        internal: build_star_graph(galaxy, &owned, &owned, hyper),
        logical: build_star_graph(galaxy, &owned, &all, logical_range),
        detection: build_star_graph(galaxy, &owned, &all, scan),
        incoming: build_star_graph(galaxy, &all, &owned, global_range),
        free: build_star_graph(galaxy, &free_set, &free_set, external_range),
    };

    let borders = classify_borders(galaxy, faction_id, &owned, &graphs.logical, &graphs.detection);

    let mut idle_fleets: BTreeMap<StarId, Vec<FleetId>> = BTreeMap::new();
    let mut threats: BTreeMap<StarId, BTreeMap<u32, Vec<FleetId>>> = BTreeMap::new();
    let mut in_transit_by_origin: BTreeMap<StarId, Vec<FleetId>> = BTreeMap::new();
    let mut in_transit_by_destination: BTreeMap<StarId, Vec<FleetId>> = BTreeMap::new();

    for fleet in galaxy.fleets.values() {
        if fleet.owner == faction_id {
            if fleet.is_idle() {
                if let Some(star) = fleet.orbiting {
                    if galaxy.star(star).is_some_and(|s| s.is_owned_by(faction_id)) {
                        idle_fleets.entry(star).or_default().push(fleet.id);
                    }
                }
                continue;
            }
            if let Some(origin) = fleet.plan_origin() {
                in_transit_by_origin.entry(origin).or_default().push(fleet.id);
            }
            if let Some(dest) = fleet.final_destination() {
                in_transit_by_destination.entry(dest).or_default().push(fleet.id);
            }
            continue;
        }

        // Enemy fleet headed for one of our stars: index by (target, eta).
        let Some(dest) = fleet.final_destination() else {
            continue;
        };
        if !galaxy.star(dest).is_some_and(|s| s.is_owned_by(faction_id)) {
            continue;
        }
        if let Some(eta) = galaxy.fleet_eta(fleet) {
            threats.entry(dest).or_default().entry(eta).or_default().push(fleet.id);
        }
    }

    let mut totals = FactionTotals::default();
    for &star_id in &owned {
        if let Some(star) = galaxy.star(star_id) {
            totals.economy += star.infrastructure.economy;
            totals.industry += star.infrastructure.industry;
            totals.science += star.infrastructure.science;
            totals.ships += star.garrison;
        }
    }
    for fleet in galaxy.fleets.values() {
        if fleet.owner == faction_id {
            totals.ships += fleet.ships;
        }
    }

    Some(Context {
        faction: faction_id,
        tick: galaxy.tick,
        owned_stars: owned,
        idle_fleets,
        graphs,
        borders,
        threats,
        in_transit_by_origin,
        in_transit_by_destination,
        totals,
        internal_range: hyper,
    })
}
