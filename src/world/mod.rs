//! The world-model boundary.
//!
//! Everything the decision engine is not: combat arithmetic, mutation
//! primitives with deferred persistence, and the external pathfinder. The
//! engine only ever sees these through the [`WorldOps`] trait.

pub mod combat;
pub mod local;
pub mod ops;

pub use local::{LocalWorld, FLEET_COST, INFRA_COST_PER_LEVEL};
pub use ops::{
    InfrastructureKind, PersistMode, RouteHop, SpendStrategy, WorldError, WorldOps,
};
