//! Rear-to-front ship logistics.
//!
//! After orders are filled, interior stars push their remaining garrisons
//! toward the frontier. Each frontier star gets a priority (hostile borders
//! weigh the enemy garrisons in sight, free borders a flat trickle), every
//! interior star with leftover ships picks its best target by priority over
//! distance squared, and the resulting movements run best-first. A collector
//! passing over another pending origin sweeps that garrison up on the way
//! instead of letting it buy its own fleet.

use std::collections::BTreeSet;

use tracing::debug;

use crate::ai::border::BorderClass;
use crate::ai::context::Context;
use crate::ai::search::AssignmentPool;
use crate::ai::AiError;
use crate::galaxy::{Galaxy, StarId, Waypoint, WaypointAction};
use crate::world::{PersistMode, WorldOps};

/// Priority of a frontier star facing only unowned space.
const FREE_BORDER_PRIORITY: f64 = 1.0;

/// Movements scoring at least this much dispatch even when the origin would
/// otherwise stockpile toward a cheaper future fleet.
const URGENT_SCORE: f64 = 10_000.0;

/// One planned rear-to-front transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub from: StarId,
    pub to: StarId,
    pub score: f64,
}

/// Plans and dispatches rear-to-front movements against what is left of the
/// pool. Returns the number of fleets dispatched.
pub fn plan_logistics<W: WorldOps>(
    world: &mut W,
    ctx: &Context,
    pool: &mut AssignmentPool,
) -> Result<u32, AiError> {
    let mut movements = queue_movements(world.galaxy(), ctx, pool);
    if movements.is_empty() {
        return Ok(0);
    }
    movements.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| a.from.cmp(&b.from))
    });

    // Origins with a movement still pending; collectors passing over one
    // absorb it.
    let mut queued: BTreeSet<StarId> = movements.iter().map(|m| m.from).collect();
    let mut folded: BTreeSet<StarId> = BTreeSet::new();

    let mut dispatched = 0u32;
    for movement in &movements {
        if folded.contains(&movement.from) {
            continue;
        }
        let Some(entry) = pool.get(movement.from) else {
            continue;
        };

        // Below one cycle of local production and nothing idle to reuse, a
        // non-urgent origin stockpiles rather than buying a fleet.
        if entry.idle_fleets.is_empty() {
            let industry = world
                .galaxy()
                .star(movement.from)
                .map_or(0, |s| s.infrastructure.industry);
            if entry.total_ships < industry && movement.score < URGENT_SCORE {
                debug!(star = %movement.from, "stockpiling, movement held");
                continue;
            }
        }

        let fleet_id = match pool
            .get_mut(movement.from)
            .and_then(|e| e.idle_fleets.pop())
        {
            Some(id) => id,
            None => match world.build_fleet(movement.from, 0, PersistMode::Defer) {
                Ok(id) => id,
                Err(err) if err.is_recoverable() => {
                    debug!(star = %movement.from, %err, "movement skipped");
                    continue;
                }
                Err(err) => return Err(err.into()),
            },
        };

        let route = world.shortest_route(fleet_id, movement.from, movement.to);
        if route.len() < 2 {
            // Unreachable; the fleet stays docked and available.
            if let Some(entry) = pool.get_mut(movement.from) {
                entry.idle_fleets.push(fleet_id);
            }
            continue;
        }

        let mut waypoints = Vec::with_capacity(route.len() - 1);
        let mut folds = Vec::new();
        for pair in route.windows(2) {
            let dest = pair[1].star;
            let action = if dest == movement.to {
                WaypointAction::DropAll
            } else if queued.contains(&dest) && !folded.contains(&dest) {
                folds.push(dest);
                WaypointAction::CollectAll
            } else {
                WaypointAction::None
            };
            waypoints.push(Waypoint::new(pair[0].star, dest, action));
        }

        // Load the whole garrison aboard.
        let (aboard, garrison) = {
            let galaxy = world.galaxy();
            let fleet = galaxy.fleet(fleet_id).ok_or(AiError::MissingFleet(fleet_id))?;
            let star = galaxy
                .star(movement.from)
                .ok_or(AiError::MissingStar(movement.from))?;
            (fleet.ships + star.garrison, star.garrison)
        };
        if garrison > 0 {
            world.transfer_ships(fleet_id, aboard, movement.from, 0, PersistMode::Defer)?;
        }
        world.assign_movement_plan(fleet_id, waypoints, false, PersistMode::Defer)?;

        pool.remove(movement.from);
        queued.remove(&movement.from);
        for fold in folds {
            pool.remove(fold);
            folded.insert(fold);
        }
        dispatched += 1;
    }
    Ok(dispatched)
}

/// Scores every frontier star and picks one target per interior origin.
fn queue_movements(galaxy: &Galaxy, ctx: &Context, pool: &AssignmentPool) -> Vec<Movement> {
    let mut priorities: Vec<(StarId, f64)> = Vec::new();
    for (&star, data) in &ctx.borders {
        let priority = match data.class {
            BorderClass::EmptySpace => continue,
            BorderClass::FreeStars => FREE_BORDER_PRIORITY,
            BorderClass::HostileBorder => data
                .detection_neighbors
                .iter()
                .filter_map(|s| galaxy.star(*s))
                .filter(|s| s.is_enemy_of(ctx.faction))
                .map(|s| f64::from(s.garrison))
                .sum::<f64>()
                .max(FREE_BORDER_PRIORITY),
        };
        priorities.push((star, priority));
    }
    if priorities.is_empty() {
        return Vec::new();
    }

    let mut movements = Vec::new();
    for from in pool.stars().collect::<Vec<_>>() {
        // Frontier stars are destinations, never sources.
        if ctx.borders.contains_key(&from) {
            continue;
        }
        let Some(entry) = pool.get(from) else {
            continue;
        };
        if entry.total_ships == 0 {
            continue;
        }

        let mut best: Option<(StarId, f64)> = None;
        for &(to, priority) in &priorities {
            if to == from {
                continue;
            }
            let d = galaxy.distance(from, to).max(1.0);
            let score = priority * 10_000.0 / (d * d);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((to, score));
            }
        }
        let Some((to, score)) = best else {
            continue;
        };

        // A hauler already flying this leg, or a collector inbound for the
        // target that loads here, makes the movement redundant.
        let hauled = ctx.in_transit_by_origin.get(&from).is_some_and(|fleets| {
            fleets
                .iter()
                .filter_map(|id| galaxy.fleet(*id))
                .any(|f| f.final_destination() == Some(to))
        });
        let collected = ctx
            .in_transit_by_destination
            .get(&to)
            .is_some_and(|fleets| {
                fleets
                    .iter()
                    .filter_map(|id| galaxy.fleet(*id))
                    .any(|f| f.collects_at(from))
            });
        if hauled || collected {
            continue;
        }

        movements.push(Movement { from, to, score });
    }
    movements
}
