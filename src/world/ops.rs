//! World mutation and query operations.
//!
//! The AI treats the shared world model as a black box behind the
//! [`WorldOps`] trait: combat-requirement queries, fleet construction, ship
//! transfer, movement-plan assignment, bulk infrastructure spending, and an
//! external pathfinder. Every mutation takes a [`PersistMode`] so a whole
//! world tick can run against the in-memory working model and be written
//! durably exactly once at the end.

use thiserror::Error;

use crate::galaxy::{FactionId, FleetId, Galaxy, StarId, Waypoint};

/// Whether a mutation is also written durably, or only applied to the
/// in-memory working model until the tick-level commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// Update the working model only; the caller commits once per tick.
    Defer,
    /// Update the working model and write durably immediately.
    Persist,
}

/// How a bulk spend picks infrastructure to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendStrategy {
    /// Repeatedly buy the cheapest next level across all owned stars.
    CheapestFirst,
}

/// The infrastructure type a bulk spend targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfrastructureKind {
    Economy,
    Industry,
    Science,
}

/// One star on a computed route, with the distance accumulated to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteHop {
    pub star: StarId,
    pub cumulative_distance: f64,
}

/// Errors raised by world operations.
///
/// `InsufficientFunds` and `DeadStar` are expected, recoverable conditions:
/// the order evaluator treats them as "skip this assignment". The rest
/// indicate a working-model inconsistency and abandon the faction's turn.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u32, available: u32 },

    #[error("{0} is dead and cannot host fleet construction")]
    DeadStar(StarId),

    #[error("{star} garrison too small: requested {requested}, available {available}")]
    InsufficientGarrison {
        star: StarId,
        requested: u32,
        available: u32,
    },

    #[error("unknown star {0}")]
    UnknownStar(StarId),

    #[error("unknown fleet {0}")]
    UnknownFleet(FleetId),

    #[error("unknown faction {0}")]
    UnknownFaction(FactionId),

    #[error("{fleet} is not docked at {star}")]
    NotDocked { fleet: FleetId, star: StarId },

    #[error("transfer does not conserve ships: {fleet_ships} + {star_garrison} != {total}")]
    UnbalancedTransfer {
        fleet_ships: u32,
        star_garrison: u32,
        total: u32,
    },
}

impl WorldError {
    /// True for conditions the order evaluator absorbs by skipping the
    /// current assignment rather than failing the faction's turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WorldError::InsufficientFunds { .. } | WorldError::DeadStar(_)
        )
    }
}

/// Operations the decision engine needs from the shared world model.
pub trait WorldOps {
    /// Read access to the working model.
    fn galaxy(&self) -> &Galaxy;

    /// Ships the defender still needs at `target` to survive `attackers`
    /// arriving ships, given defenders already on the way.
    fn defense_requirement(&self, target: StarId, attackers: u32, en_route: u32) -> u32;

    /// Ships an attacker needs to take `target` when arriving `eta_ticks`
    /// from now.
    fn invasion_requirement(&self, target: StarId, eta_ticks: u32) -> u32;

    /// Spawns a new fleet docked at `star`, crewed with `ships` from the
    /// garrison, deducting the build cost from the owner's credits.
    fn build_fleet(
        &mut self,
        star: StarId,
        ships: u32,
        mode: PersistMode,
    ) -> Result<FleetId, WorldError>;

    /// Rebalances ships between a docked fleet and its star to the given
    /// absolute amounts. The two must sum to the current combined total.
    fn transfer_ships(
        &mut self,
        fleet: FleetId,
        fleet_ships: u32,
        star: StarId,
        star_garrison: u32,
        mode: PersistMode,
    ) -> Result<(), WorldError>;

    /// Replaces a fleet's movement plan.
    fn assign_movement_plan(
        &mut self,
        fleet: FleetId,
        waypoints: Vec<Waypoint>,
        looped: bool,
        mode: PersistMode,
    ) -> Result<(), WorldError>;

    /// Spends up to `amount` credits of `faction` on infrastructure.
    /// Returns the credits actually spent.
    fn bulk_spend(
        &mut self,
        faction: FactionId,
        strategy: SpendStrategy,
        kind: InfrastructureKind,
        amount: u32,
        mode: PersistMode,
    ) -> Result<u32, WorldError>;

    /// Shortest route for `fleet` from one star to another, including both
    /// endpoints, or empty if unreachable.
    fn shortest_route(&self, fleet: FleetId, from: StarId, to: StarId) -> Vec<RouteHop>;
}
