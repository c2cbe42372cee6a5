//! Persistent per-faction AI memory.
//!
//! The only state the decision engine keeps between ticks: attacks it has
//! already committed defenders to, claims it has dispatched settlers toward,
//! and invasions currently in flight. The caller reads the blob at turn
//! start and persists it at turn end; it is opaque to everything else.

use serde::{Deserialize, Serialize};

use crate::galaxy::{Galaxy, StarId};

/// Defenders already committed to an incoming attack on a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownAttack {
    pub star: StarId,
    /// Absolute tick the attack lands.
    pub arrival_tick: u64,
    /// Ships dispatched toward the star for this attack so far.
    pub committed_ships: u32,
}

/// An invasion strike already launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invasion {
    pub star: StarId,
    /// Absolute tick the strike is projected to land.
    pub arrival_tick: u64,
}

/// The persisted AI-state blob for one faction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiState {
    pub known_attacks: Vec<KnownAttack>,
    pub claims_in_progress: Vec<StarId>,
    pub invasions_in_progress: Vec<Invasion>,
}

impl AiState {
    /// Drops entries whose moment has passed: attacks and invasions that
    /// have already landed, and claims whose target is no longer unowned.
    pub fn prune(&mut self, galaxy: &Galaxy) {
        let tick = galaxy.tick;
        self.known_attacks.retain(|a| a.arrival_tick > tick);
        self.invasions_in_progress.retain(|i| i.arrival_tick > tick);
        self.claims_in_progress
            .retain(|star| galaxy.star(*star).is_some_and(|s| s.owner.is_none()));
    }

    /// Ships already committed toward an attack landing on `star` at
    /// `arrival_tick`.
    pub fn committed_to(&self, star: StarId, arrival_tick: u64) -> u32 {
        self.known_attacks
            .iter()
            .filter(|a| a.star == star && a.arrival_tick == arrival_tick)
            .map(|a| a.committed_ships)
            .sum()
    }

    /// Adds `ships` to the commitment against an attack, merging with any
    /// existing entry for the same (star, arrival) pair.
    pub fn record_commitment(&mut self, star: StarId, arrival_tick: u64, ships: u32) {
        if let Some(existing) = self
            .known_attacks
            .iter_mut()
            .find(|a| a.star == star && a.arrival_tick == arrival_tick)
        {
            existing.committed_ships += ships;
            return;
        }
        self.known_attacks.push(KnownAttack { star, arrival_tick, committed_ships: ships });
    }

    pub fn is_invading(&self, star: StarId) -> bool {
        self.invasions_in_progress.iter().any(|i| i.star == star)
    }

    pub fn is_claiming(&self, star: StarId) -> bool {
        self.claims_in_progress.contains(&star)
    }

    pub fn record_claim(&mut self, star: StarId) {
        if !self.claims_in_progress.contains(&star) {
            self.claims_in_progress.push(star);
        }
    }

    /// Forgets everything; used when the faction no longer owns any stars.
    pub fn clear(&mut self) {
        self.known_attacks.clear();
        self.claims_in_progress.clear();
        self.invasions_in_progress.clear();
    }

    /// Serializes the blob for the caller's persistence layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores the blob from the caller's persistence layer.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}
