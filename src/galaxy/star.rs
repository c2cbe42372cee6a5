//! Stars and their infrastructure.
//!
//! A star is a fixed map location with an optional owning faction, a ship
//! garrison, raw natural-resource levels, and built infrastructure. Two
//! stars may be linked as a wormhole pair, which makes travel between them
//! free.

use serde::{Deserialize, Serialize};

use super::faction::FactionId;

/// Identifies a star on the map.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StarId(pub u32);

impl std::fmt::Display for StarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "star_{}", self.0)
    }
}

/// A 2D map position in abstract distance units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Straight-line distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing to another point in degrees, normalized to [0, 360).
    pub fn bearing_to(self, other: Point) -> f64 {
        let deg = (other.y - self.y).atan2(other.x - self.x).to_degrees();
        if deg < 0.0 {
            deg + 360.0
        } else {
            deg
        }
    }
}

/// Economy/industry/science triple, used for both natural resources and
/// built infrastructure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLevels {
    pub economy: u32,
    pub industry: u32,
    pub science: u32,
}

impl ResourceLevels {
    pub fn new(economy: u32, industry: u32, science: u32) -> Self {
        ResourceLevels { economy, industry, science }
    }

    /// Sum of the three raw levels.
    pub fn total(self) -> u32 {
        self.economy + self.industry + self.science
    }

    /// Strategic value: economy weighted 1, industry 2, science 3.
    pub fn weighted_value(self) -> f64 {
        f64::from(self.economy) + 2.0 * f64::from(self.industry) + 3.0 * f64::from(self.science)
    }
}

/// A star on the galaxy map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub id: StarId,
    pub position: Point,
    pub owner: Option<FactionId>,
    /// Ships stationed at the star, outside any fleet.
    pub garrison: u32,
    /// Raw natural-resource levels; drives expansion scoring.
    pub natural: ResourceLevels,
    /// Built infrastructure; drives defense scoring and economy totals.
    pub infrastructure: ResourceLevels,
    /// The other end of a wormhole, if this star has one.
    pub wormhole_pair: Option<StarId>,
    /// Dead stars cannot host fleet construction.
    pub dead: bool,
}

impl Star {
    /// Creates an unowned, empty star at the given position.
    pub fn new(id: StarId, x: f64, y: f64) -> Self {
        Star {
            id,
            position: Point::new(x, y),
            owner: None,
            garrison: 0,
            natural: ResourceLevels::default(),
            infrastructure: ResourceLevels::default(),
            wormhole_pair: None,
            dead: false,
        }
    }

    /// Sets the owning faction and garrison. Builder-style, for map setup.
    pub fn owned_by(mut self, owner: FactionId, garrison: u32) -> Self {
        self.owner = Some(owner);
        self.garrison = garrison;
        self
    }

    /// Sets the natural-resource levels. Builder-style, for map setup.
    pub fn with_natural(mut self, natural: ResourceLevels) -> Self {
        self.natural = natural;
        self
    }

    /// Sets the built infrastructure. Builder-style, for map setup.
    pub fn with_infrastructure(mut self, infrastructure: ResourceLevels) -> Self {
        self.infrastructure = infrastructure;
        self
    }

    /// Returns true if the star is owned by the given faction.
    pub fn is_owned_by(&self, faction: FactionId) -> bool {
        self.owner == Some(faction)
    }

    /// Returns true if the star is owned by some faction other than the given one.
    pub fn is_enemy_of(&self, faction: FactionId) -> bool {
        matches!(self.owner, Some(o) if o != faction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-9);
        assert!((b.distance_to(a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_normalized_to_positive_degrees() {
        let origin = Point::new(0.0, 0.0);
        assert!((origin.bearing_to(Point::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.bearing_to(Point::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((origin.bearing_to(Point::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.bearing_to(Point::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_value_weights_science_highest() {
        let r = ResourceLevels::new(1, 1, 1);
        assert!((r.weighted_value() - 6.0).abs() < 1e-9);
        let industry_only = ResourceLevels::new(0, 10, 0);
        assert!((industry_only.weighted_value() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ownership_predicates() {
        let star = Star::new(StarId(1), 0.0, 0.0).owned_by(FactionId(7), 5);
        assert!(star.is_owned_by(FactionId(7)));
        assert!(!star.is_owned_by(FactionId(8)));
        assert!(star.is_enemy_of(FactionId(8)));
        assert!(!star.is_enemy_of(FactionId(7)));

        let neutral = Star::new(StarId(2), 0.0, 0.0);
        assert!(!neutral.is_enemy_of(FactionId(7)));
    }
}
