//! The faction decision engine.
//!
//! One call to [`turn::take_turn`] runs a faction's whole tick: context
//! snapshot, border classification, order generation, pool-constrained
//! evaluation, and rear-to-front logistics. The engine is deterministic for
//! a given galaxy snapshot and AI state, and keeps no memory between ticks
//! beyond the [`state::AiState`] blob the caller persists.

pub mod border;
pub mod context;
pub mod evaluate;
pub mod logistics;
pub mod orders;
pub mod search;
pub mod state;
pub mod turn;

pub use border::{BorderClass, BorderStarData, OPEN_FLANK_GAP_DEGREES};
pub use context::{build_context, Context, ContextGraphs, FactionTotals};
pub use evaluate::{evaluate_orders, sort_orders};
pub use logistics::{plan_logistics, Movement};
pub use orders::{generate_orders, Order};
pub use search::{search_assignments, Assignment, AssignmentPool, SearchControl, SearchHit};
pub use state::{AiState, Invasion, KnownAttack};
pub use turn::{take_turn, TurnOutcome};

use thiserror::Error;

use crate::galaxy::{FleetId, StarId};
use crate::world::WorldError;

/// Unexpected failures inside the decision pipeline.
///
/// Recoverable world conditions (no funds, dead star) never become an
/// `AiError`; they are absorbed where they occur. Anything that does reach
/// this type abandons the faction's turn at the [`turn::take_turn`]
/// boundary.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("{0} missing from the working model")]
    MissingFleet(FleetId),

    #[error("{0} missing from the working model")]
    MissingStar(StarId),

    #[error(transparent)]
    World(#[from] WorldError),
}
