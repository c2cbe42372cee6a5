//! Fleets (carriers) and their movement plans.
//!
//! A fleet is a mobile group of ships with a position, an optional orbit
//! star, and an ordered list of waypoints. A fleet with no waypoints sitting
//! in orbit is idle and available to the AI as an assignment resource.

use serde::{Deserialize, Serialize};

use super::faction::FactionId;
use super::star::{Point, StarId};

/// Identifies a fleet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FleetId(pub u32);

impl std::fmt::Display for FleetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fleet_{}", self.0)
    }
}

/// What a fleet does with ships when it arrives at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointAction {
    /// Pass through without touching the garrison.
    None,
    /// Load the star's entire garrison aboard.
    CollectAll,
    /// Unload every ship into the star's garrison.
    DropAll,
}

/// One leg of a fleet's movement plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub source: StarId,
    pub destination: StarId,
    pub action: WaypointAction,
}

impl Waypoint {
    pub fn new(source: StarId, destination: StarId, action: WaypointAction) -> Self {
        Waypoint { source, destination, action }
    }
}

/// A mobile group of ships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub owner: FactionId,
    pub ships: u32,
    pub position: Point,
    /// The star the fleet is docked at, if any.
    pub orbiting: Option<StarId>,
    /// Remaining legs of the current movement plan, in travel order.
    pub waypoints: Vec<Waypoint>,
    /// Whether the movement plan repeats once exhausted.
    pub looped: bool,
}

impl Fleet {
    /// Creates a fleet docked at a star.
    pub fn docked(id: FleetId, owner: FactionId, ships: u32, star: StarId, position: Point) -> Self {
        Fleet {
            id,
            owner,
            ships,
            position,
            orbiting: Some(star),
            waypoints: Vec::new(),
            looped: false,
        }
    }

    /// True if the fleet is docked with no pending movement plan.
    pub fn is_idle(&self) -> bool {
        self.orbiting.is_some() && self.waypoints.is_empty()
    }

    /// The final destination of the current movement plan, if any.
    pub fn final_destination(&self) -> Option<StarId> {
        self.waypoints.last().map(|w| w.destination)
    }

    /// The origin star of the current movement plan, if any.
    pub fn plan_origin(&self) -> Option<StarId> {
        self.waypoints.first().map(|w| w.source)
    }

    /// True if any waypoint on the plan collects ships at the given star.
    pub fn collects_at(&self, star: StarId) -> bool {
        self.waypoints
            .iter()
            .any(|w| w.destination == star && w.action == WaypointAction::CollectAll)
    }
}
