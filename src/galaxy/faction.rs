//! Factions and their research levels.

use serde::{Deserialize, Serialize};

/// Identifies a faction (player or computer-controlled).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FactionId(pub u32);

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "faction_{}", self.0)
    }
}

/// A faction's tech levels and treasury.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    /// Hyperspace tech level; sets maximum travel distance per jump.
    pub hyperspace: u32,
    /// Scanning tech level; sets maximum detection distance.
    pub scanning: u32,
    pub credits: u32,
}

impl Faction {
    pub fn new(id: FactionId, hyperspace: u32, scanning: u32, credits: u32) -> Self {
        Faction { id, hyperspace, scanning, credits }
    }
}
