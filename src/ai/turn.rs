//! The per-faction turn driver.
//!
//! Runs one faction's full decision pipeline against the world: prune stale
//! memory, snapshot a context, spend the cycle's infrastructure budget,
//! generate and evaluate orders, then run logistics. Any unexpected error is
//! caught here so a broken faction never takes the rest of the tick down
//! with it.

use tracing::{debug, warn};

use crate::ai::context::{build_context, FactionTotals};
use crate::ai::evaluate::evaluate_orders;
use crate::ai::logistics::plan_logistics;
use crate::ai::orders::generate_orders;
use crate::ai::search::AssignmentPool;
use crate::ai::state::AiState;
use crate::ai::AiError;
use crate::galaxy::FactionId;
use crate::world::{InfrastructureKind, PersistMode, SpendStrategy, WorldOps};

/// How a faction's turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The pipeline ran to completion.
    Played,
    /// The faction owns no stars; its state was cleared and nothing ran.
    SkippedNoStars,
    /// An unexpected error abandoned the turn partway through.
    Failed,
}

/// Plays one faction's turn. Never panics and never propagates an error:
/// a failure is logged with the faction and tick and reported as
/// [`TurnOutcome::Failed`], leaving other factions unaffected.
pub fn take_turn<W: WorldOps>(
    world: &mut W,
    faction: FactionId,
    state: &mut AiState,
) -> TurnOutcome {
    match run_turn(world, faction, state) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(
                galaxy = world.galaxy().id,
                tick = world.galaxy().tick,
                %faction,
                %err,
                "faction turn abandoned"
            );
            TurnOutcome::Failed
        }
    }
}

fn run_turn<W: WorldOps>(
    world: &mut W,
    faction: FactionId,
    state: &mut AiState,
) -> Result<TurnOutcome, AiError> {
    state.prune(world.galaxy());
    let Some(ctx) = build_context(world.galaxy(), faction) else {
        state.clear();
        debug!(%faction, "no stars, turn skipped");
        return Ok(TurnOutcome::SkippedNoStars);
    };

    // On cycle-opening ticks, half the treasury goes into whichever
    // infrastructure the faction is weakest in; the rest stays liquid for
    // fleet construction.
    if ctx.tick % u64::from(world.galaxy().ticks_per_cycle) == 0 {
        let budget = world.galaxy().faction(faction).map_or(0, |f| f.credits) / 2;
        if budget > 0 {
            let kind = weakest_infrastructure(&ctx.totals);
            let spent = world.bulk_spend(
                faction,
                SpendStrategy::CheapestFirst,
                kind,
                budget,
                PersistMode::Defer,
            )?;
            debug!(%faction, spent, ?kind, "cycle infrastructure spend");
        }
    }

    let orders = generate_orders(world.galaxy(), &ctx, state);
    let mut pool = AssignmentPool::from_context(world.galaxy(), &ctx);
    let dispatched = evaluate_orders(world, &ctx, &mut pool, state, orders)?;
    let moved = plan_logistics(world, &ctx, &mut pool)?;
    debug!(%faction, dispatched, moved, "turn complete");
    Ok(TurnOutcome::Played)
}

fn weakest_infrastructure(totals: &FactionTotals) -> InfrastructureKind {
    if totals.economy <= totals.industry && totals.economy <= totals.science {
        InfrastructureKind::Economy
    } else if totals.industry <= totals.science {
        InfrastructureKind::Industry
    } else {
        InfrastructureKind::Science
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{
        Faction, Fleet, FleetId, Galaxy, Point, ResourceLevels, Star, StarId, Waypoint,
        WaypointAction,
    };
    use crate::world::{LocalWorld, RouteHop, WorldError};

    const ME: FactionId = FactionId(1);
    const THEM: FactionId = FactionId(2);

    #[test]
    fn weakest_kind_breaks_ties_toward_economy() {
        let totals = FactionTotals { economy: 2, industry: 2, science: 5, ships: 0 };
        assert_eq!(weakest_infrastructure(&totals), InfrastructureKind::Economy);
        let totals = FactionTotals { economy: 9, industry: 3, science: 3, ships: 0 };
        assert_eq!(weakest_infrastructure(&totals), InfrastructureKind::Industry);
    }

    #[test]
    fn starless_faction_skips_and_forgets() {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_faction(Faction::new(ME, 1, 1, 50));
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0));
        let mut world = LocalWorld::new(galaxy);

        let mut state = AiState::default();
        state.record_claim(StarId(1));
        let outcome = take_turn(&mut world, ME, &mut state);
        assert_eq!(outcome, TurnOutcome::SkippedNoStars);
        assert_eq!(state, AiState::default());
    }

    #[test]
    fn infrastructure_spend_runs_only_on_cycle_boundaries() {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_faction(Faction::new(ME, 1, 1, 100));
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        let mut world = LocalWorld::new(galaxy);
        let mut state = AiState::default();

        // Tick 0 opens a cycle: half of 100 goes into economy.
        assert_eq!(take_turn(&mut world, ME, &mut state), TurnOutcome::Played);
        let after_open = world.galaxy().faction(ME).unwrap().credits;
        assert!(after_open < 100);
        assert!(world.galaxy().star(StarId(1)).unwrap().infrastructure.economy > 0);

        world.galaxy_mut().tick = 1;
        assert_eq!(take_turn(&mut world, ME, &mut state), TurnOutcome::Played);
        assert_eq!(world.galaxy().faction(ME).unwrap().credits, after_open);
    }

    #[test]
    fn threatened_turn_dispatches_a_defender() {
        let mut galaxy = Galaxy::new(1);
        galaxy.tick = 1; // off-cycle, no infrastructure spend
        galaxy.add_faction(Faction::new(ME, 0, 0, 200));
        galaxy.add_faction(Faction::new(THEM, 3, 0, 0));
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 2));
        galaxy.add_star(Star::new(StarId(2), 0.0, 30.0).owned_by(ME, 8));
        let mut raider = Fleet::docked(FleetId(50), THEM, 12, StarId(1), Point::new(30.0, 0.0));
        raider.orbiting = None;
        raider.waypoints = vec![Waypoint::new(StarId(9), StarId(1), WaypointAction::None)];
        galaxy.add_fleet(raider);
        let mut world = LocalWorld::new(galaxy);
        let mut state = AiState::default();

        assert_eq!(take_turn(&mut world, ME, &mut state), TurnOutcome::Played);
        // Impact in 3 ticks, star 2 is exactly 3 ticks out: its 8 ships go.
        assert_eq!(state.committed_to(StarId(1), 4), 8);
        assert_eq!(world.galaxy().star(StarId(2)).unwrap().garrison, 0);
        let defender = world
            .galaxy()
            .fleets
            .values()
            .find(|f| f.owner == ME && !f.waypoints.is_empty())
            .unwrap();
        assert_eq!(defender.ships, 8);
        assert_eq!(defender.waypoints[0].destination, StarId(1));
    }

    /// A world whose fleet construction always reports an inconsistency.
    struct BrokenWorld(LocalWorld);

    impl WorldOps for BrokenWorld {
        fn galaxy(&self) -> &Galaxy {
            self.0.galaxy()
        }
        fn defense_requirement(&self, target: StarId, attackers: u32, en_route: u32) -> u32 {
            self.0.defense_requirement(target, attackers, en_route)
        }
        fn invasion_requirement(&self, target: StarId, eta_ticks: u32) -> u32 {
            self.0.invasion_requirement(target, eta_ticks)
        }
        fn build_fleet(
            &mut self,
            star: StarId,
            _ships: u32,
            _mode: PersistMode,
        ) -> Result<FleetId, WorldError> {
            Err(WorldError::UnknownStar(star))
        }
        fn transfer_ships(
            &mut self,
            fleet: FleetId,
            fleet_ships: u32,
            star: StarId,
            star_garrison: u32,
            mode: PersistMode,
        ) -> Result<(), WorldError> {
            self.0.transfer_ships(fleet, fleet_ships, star, star_garrison, mode)
        }
        fn assign_movement_plan(
            &mut self,
            fleet: FleetId,
            waypoints: Vec<Waypoint>,
            looped: bool,
            mode: PersistMode,
        ) -> Result<(), WorldError> {
            self.0.assign_movement_plan(fleet, waypoints, looped, mode)
        }
        fn bulk_spend(
            &mut self,
            faction: FactionId,
            strategy: SpendStrategy,
            kind: InfrastructureKind,
            amount: u32,
            mode: PersistMode,
        ) -> Result<u32, WorldError> {
            self.0.bulk_spend(faction, strategy, kind, amount, mode)
        }
        fn shortest_route(&self, fleet: FleetId, from: StarId, to: StarId) -> Vec<RouteHop> {
            self.0.shortest_route(fleet, from, to)
        }
    }

    #[test]
    fn unexpected_error_fails_the_turn_without_panicking() {
        let mut galaxy = Galaxy::new(1);
        galaxy.tick = 1;
        galaxy.add_faction(Faction::new(ME, 0, 1, 200));
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 5));
        galaxy.add_star(
            Star::new(StarId(2), 20.0, 0.0).with_natural(ResourceLevels::new(3, 0, 0)),
        );
        let mut world = BrokenWorld(LocalWorld::new(galaxy));

        // The claim order reaches build_fleet, which reports a model
        // inconsistency; the turn fails in isolation.
        let mut state = AiState::default();
        assert_eq!(take_turn(&mut world, ME, &mut state), TurnOutcome::Failed);
    }
}
