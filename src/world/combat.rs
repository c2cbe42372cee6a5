//! Deterministic combat-odds arithmetic.
//!
//! The decision engine never resolves combat itself; it only asks two
//! questions of the combat model. Both answers are deterministic functions
//! of the working model, so the AI's decisions are reproducible for a given
//! snapshot.

use crate::galaxy::{Galaxy, StarId};

/// Ships the defender still needs at `target` to survive an attack of
/// `attackers` ships, counting the current garrison and defenders already
/// on the way. Zero when the star already holds.
pub fn defense_requirement(galaxy: &Galaxy, target: StarId, attackers: u32, en_route: u32) -> u32 {
    let garrison = galaxy.star(target).map_or(0, |s| s.garrison);
    // Defenders win ties, so surviving takes matching the attacker exactly.
    attackers.saturating_sub(garrison + en_route)
}

/// Ships an attacker needs to take `target` when arriving `eta_ticks` from
/// now: the present garrison, plus projected industrial production until
/// arrival, plus one to break the defender's tie advantage.
pub fn invasion_requirement(galaxy: &Galaxy, target: StarId, eta_ticks: u32) -> u32 {
    let Some(star) = galaxy.star(target) else {
        return 0;
    };
    let per_cycle = star.infrastructure.industry;
    let produced =
        (u64::from(per_cycle) * u64::from(eta_ticks)) / u64::from(galaxy.ticks_per_cycle.max(1));
    star.garrison + produced as u32 + 1
}
