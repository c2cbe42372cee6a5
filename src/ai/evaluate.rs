//! Order evaluation and fleet dispatch.
//!
//! Orders are processed in strict category priority (defend, invade, claim),
//! score-descending within a category, against a shared assignment pool.
//! Ships granted to an earlier order are gone for later ones; there is no
//! joint optimization and no backtracking. All world mutations here are
//! deferred; the tick scheduler commits once at the end of the tick.

use tracing::debug;

use crate::ai::context::Context;
use crate::ai::orders::Order;
use crate::ai::search::{search_assignments, AssignmentPool, SearchControl, SearchHit};
use crate::ai::state::{AiState, Invasion};
use crate::ai::AiError;
use crate::galaxy::{StarId, Waypoint, WaypointAction};
use crate::world::{PersistMode, WorldOps};

/// Category priority first, score second, target id as the deterministic
/// tie-break.
pub fn sort_orders(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| b.score().total_cmp(&a.score()))
            .then_with(|| a.target().cmp(&b.target()))
    });
}

/// Evaluates the orders against the pool, dispatching fleets as it goes.
/// Returns the number of fleets dispatched.
///
/// Pool entries at threatened stars are withdrawn up front: a star expecting
/// an attack keeps its garrison.
pub fn evaluate_orders<W: WorldOps>(
    world: &mut W,
    ctx: &Context,
    pool: &mut AssignmentPool,
    state: &mut AiState,
    mut orders: Vec<Order>,
) -> Result<u32, AiError> {
    sort_orders(&mut orders);

    for order in &orders {
        if let Order::DefendStar { star, .. } = order {
            pool.remove(*star);
        }
    }

    let internal = ctx.graphs.internal.undirected();
    let external = ctx.graphs.external.undirected();
    let free = ctx.graphs.free.undirected();
    let strike_budget = 2 * world.galaxy().ticks_per_cycle;

    let mut dispatched = 0u32;
    for order in orders {
        match order {
            Order::DefendStar { star, ticks_until, ref incoming, .. } => {
                let attackers: u32 = incoming
                    .iter()
                    .filter_map(|id| world.galaxy().fleet(*id))
                    .map(|f| f.ships)
                    .sum();
                let arrival = ctx.tick + u64::from(ticks_until);
                let en_route = state.committed_to(star, arrival);
                let needed = world.defense_requirement(star, attackers, en_route);
                if needed == 0 {
                    continue;
                }

                // Cheapest contributors first, until the shortfall is covered.
                let mut picks: Vec<(StarId, SearchHit, u32)> = Vec::new();
                let mut outstanding = needed;
                search_assignments(
                    world.galaxy(),
                    &internal,
                    pool,
                    star,
                    ticks_until,
                    |a| a.total_ships > 0,
                    None,
                    |assignment, hit| {
                        let take = assignment.total_ships.min(outstanding);
                        if take > 0 {
                            picks.push((assignment.star, hit.clone(), take));
                            outstanding -= take;
                        }
                        if outstanding == 0 {
                            SearchControl::Stop
                        } else {
                            SearchControl::Continue
                        }
                    },
                );
                if outstanding > 0 {
                    debug!(%star, needed, short = outstanding, "defense shortfall");
                }

                for (source, hit, take) in picks {
                    // Contributors hold position until the last safe
                    // departure tick; nearer ones go out on a later tick but
                    // their ships are withheld from later orders now.
                    if hit.ticks < ticks_until {
                        reserve_ships(pool, source, take);
                        continue;
                    }
                    let plan = defend_and_return_plan(&hit.trace);
                    if let Some(shipped) = use_assignment(world, pool, source, take, plan)? {
                        state.record_commitment(star, arrival, shipped);
                        dispatched += 1;
                    }
                }
            }

            Order::InvadeStar { star, .. } => {
                if state.is_invading(star) {
                    continue;
                }
                // A strike splits across sources only at the cost of combat
                // timing; the first single source that can field the whole
                // force wins, or nobody goes.
                let strike = {
                    let world_ref: &W = &*world;
                    let mut strike: Option<(StarId, SearchHit, u32)> = None;
                    search_assignments(
                        world_ref.galaxy(),
                        &external,
                        pool,
                        star,
                        strike_budget,
                        |a| a.total_ships > 0,
                        None,
                        |assignment, hit| {
                            let base = world_ref.invasion_requirement(star, hit.ticks);
                            let needed = (base * 3 + 1) / 2;
                            if assignment.total_ships >= needed {
                                strike = Some((assignment.star, hit.clone(), needed));
                                SearchControl::Stop
                            } else {
                                SearchControl::Continue
                            }
                        },
                    );
                    strike
                };
                let Some((source, hit, needed)) = strike else {
                    debug!(%star, "no single source can field an invasion");
                    continue;
                };
                let plan = fly_to_plan(&hit.trace, WaypointAction::None);
                if let Some(_shipped) = use_assignment(world, pool, source, needed, plan)? {
                    state
                        .invasions_in_progress
                        .push(Invasion { star, arrival_tick: ctx.tick + u64::from(hit.ticks) });
                    dispatched += 1;
                }
            }

            Order::ClaimStar { star, .. } => {
                // A claim dispatched earlier this tick may already cover the
                // target (every star on a settler's path is marked).
                if state.is_claiming(star) {
                    continue;
                }
                let hit = {
                    let mut found: Option<(StarId, SearchHit)> = None;
                    search_assignments(
                        world.galaxy(),
                        &free,
                        pool,
                        star,
                        strike_budget,
                        |a| a.total_ships > 0,
                        None,
                        |assignment, hit| {
                            found = Some((assignment.star, hit.clone()));
                            SearchControl::Stop
                        },
                    );
                    found
                };
                let Some((source, hit)) = hit else {
                    continue;
                };
                let strength = pool.get(source).map_or(0, |a| a.total_ships);
                let plan = fly_to_plan(&hit.trace, WaypointAction::None);
                if let Some(_shipped) = use_assignment(world, pool, source, strength, plan)? {
                    for &step in &hit.trace {
                        state.record_claim(step);
                    }
                    dispatched += 1;
                }
            }
        }
    }

    // Settler paths marked owned stars too; only unowned targets stay claims.
    let galaxy = world.galaxy();
    state
        .claims_in_progress
        .retain(|s| galaxy.star(*s).is_some_and(|star| star.owner.is_none()));

    Ok(dispatched)
}

/// Turns a search trace (source first, target last) into a one-way plan,
/// with `final_action` performed on arrival.
fn fly_to_plan(trace: &[StarId], final_action: WaypointAction) -> Vec<Waypoint> {
    let legs = trace.len().saturating_sub(1);
    trace
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let action = if i + 1 == legs { final_action } else { WaypointAction::None };
            Waypoint::new(pair[0], pair[1], action)
        })
        .collect()
}

/// Out-and-back plan: fly to the target, drop every ship, retrace home.
fn defend_and_return_plan(trace: &[StarId]) -> Vec<Waypoint> {
    let mut plan = fly_to_plan(trace, WaypointAction::DropAll);
    let back: Vec<StarId> = trace.iter().rev().copied().collect();
    plan.extend(back.windows(2).map(|p| Waypoint::new(p[0], p[1], WaypointAction::None)));
    plan
}

/// Draws up to `ships` from a pool entry into a fleet and dispatches it on
/// `waypoints`. Reuses a docked idle fleet when one is available, otherwise
/// builds an empty one and crews it by transfer.
///
/// Returns the ships actually aboard, or `None` when the entry is missing,
/// empty, or a recoverable world error (no funds, dead star) blocks the
/// build; those skip the order without failing the turn.
fn use_assignment<W: WorldOps>(
    world: &mut W,
    pool: &mut AssignmentPool,
    star: StarId,
    ships: u32,
    waypoints: Vec<Waypoint>,
) -> Result<Option<u32>, AiError> {
    let Some(entry) = pool.get_mut(star) else {
        return Ok(None);
    };
    let requested = ships.min(entry.total_ships);
    if requested == 0 {
        return Ok(None);
    }

    let fleet_id = match entry.idle_fleets.pop() {
        Some(id) => id,
        None => match world.build_fleet(star, 0, PersistMode::Defer) {
            Ok(id) => id,
            Err(err) if err.is_recoverable() => {
                debug!(%star, %err, "assignment skipped");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        },
    };

    let (aboard, total) = {
        let galaxy = world.galaxy();
        let fleet = galaxy.fleet(fleet_id).ok_or(AiError::MissingFleet(fleet_id))?;
        let total = fleet.ships
            + galaxy.star(star).ok_or(AiError::MissingStar(star))?.garrison;
        // Top up from the garrison; never unload an idle fleet's surplus.
        (fleet.ships.max(requested).min(total), total)
    };
    if world.galaxy().fleet(fleet_id).map_or(0, |f| f.ships) != aboard {
        world.transfer_ships(fleet_id, aboard, star, total - aboard, PersistMode::Defer)?;
    }
    world.assign_movement_plan(fleet_id, waypoints, false, PersistMode::Defer)?;

    reserve_ships(pool, star, aboard);
    Ok(Some(aboard))
}

/// Withholds `ships` from a pool entry without dispatching anything; drained
/// entries leave the pool just as dispatch drains them.
fn reserve_ships(pool: &mut AssignmentPool, star: StarId, ships: u32) {
    if let Some(entry) = pool.get_mut(star) {
        entry.total_ships = entry.total_ships.saturating_sub(ships);
        if entry.total_ships == 0 && entry.idle_fleets.is_empty() {
            pool.remove(star);
        }
    }
}
