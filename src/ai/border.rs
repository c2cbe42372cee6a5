//! Frontier classification.
//!
//! Labels each owned star as facing empty space, free stars, or a hostile
//! border. A star is a frontier star when it has at most one reachable
//! friendly neighbor, or when the bearings to its friendly neighbors leave
//! an angular gap wider than 120 degrees, an open flank. Interior stars
//! are excluded from the border map entirely.

use std::collections::{BTreeMap, BTreeSet};

use crate::galaxy::{FactionId, Galaxy, StarGraph, StarId};

/// Angular gap between friendly neighbors beyond which a flank counts as open.
pub const OPEN_FLANK_GAP_DEGREES: f64 = 120.0;

/// What kind of space a frontier star faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderClass {
    /// Nothing within detection range.
    EmptySpace,
    /// Unowned stars nearby, nothing hostile.
    FreeStars,
    /// At least one enemy-owned star within detection range.
    HostileBorder,
}

/// Per-frontier-star facts used by order generation and logistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderStarData {
    pub class: BorderClass,
    /// Factions owning stars within detection range.
    pub bordering_factions: BTreeSet<FactionId>,
    /// Every star within this star's maximum detection range.
    pub detection_neighbors: BTreeSet<StarId>,
}

/// Classifies the faction's frontier stars.
///
/// `logical` is the movement-or-detection reachability graph (range
/// max(scan, hyperspace)); `detection` is the scan-range graph.
pub fn classify_borders(
    galaxy: &Galaxy,
    faction: FactionId,
    owned: &[StarId],
    logical: &StarGraph,
    detection: &StarGraph,
) -> BTreeMap<StarId, BorderStarData> {
    let mut borders = BTreeMap::new();

    for &star_id in owned {
        let Some(star) = galaxy.star(star_id) else {
            continue;
        };

        let friendly: Vec<StarId> = logical
            .neighbors(star_id)
            .filter(|n| galaxy.star(*n).is_some_and(|s| s.is_owned_by(faction)))
            .collect();

        let frontier = if friendly.len() <= 1 {
            true
        } else {
            let mut bearings: Vec<f64> = friendly
                .iter()
                .filter_map(|n| galaxy.star(*n))
                .map(|n| star.position.bearing_to(n.position))
                .collect();
            max_bearing_gap(&mut bearings) > OPEN_FLANK_GAP_DEGREES
        };
        if !frontier {
            continue;
        }

        let detection_neighbors: BTreeSet<StarId> = detection.neighbors(star_id).collect();
        let mut bordering_factions = BTreeSet::new();
        let mut saw_neutral = false;
        for &neighbor in &detection_neighbors {
            match galaxy.star(neighbor).and_then(|s| s.owner) {
                Some(owner) if owner != faction => {
                    bordering_factions.insert(owner);
                }
                Some(_) => {}
                None => saw_neutral = true,
            }
        }

        let class = if !bordering_factions.is_empty() {
            BorderClass::HostileBorder
        } else if saw_neutral {
            BorderClass::FreeStars
        } else {
            BorderClass::EmptySpace
        };

        borders.insert(
            star_id,
            BorderStarData { class, bordering_factions, detection_neighbors },
        );
    }

    borders
}

/// The widest gap, in degrees, between consecutive bearings. Bearings are
/// sorted ascending and the smallest is wrapped +360 to the end so the gap
/// across north is measured too.
fn max_bearing_gap(bearings: &mut Vec<f64>) -> f64 {
    if bearings.len() < 2 {
        return 360.0;
    }
    bearings.sort_by(f64::total_cmp);
    bearings.push(bearings[0] + 360.0);
    bearings
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{build_star_graph, Faction, Star};

    const ME: FactionId = FactionId(1);
    const THEM: FactionId = FactionId(2);

    /// Builds a galaxy, its owned list, and the two graphs at the given range.
    fn classify(galaxy: &Galaxy, range: f64) -> BTreeMap<StarId, BorderStarData> {
        let owned = galaxy.owned_star_ids(ME);
        let all = galaxy.all_star_ids();
        let logical = build_star_graph(galaxy, &owned, &all, range);
        let detection = build_star_graph(galaxy, &owned, &all, range);
        classify_borders(galaxy, ME, &owned, &logical, &detection)
    }

    fn base_galaxy() -> Galaxy {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_faction(Faction::new(ME, 1, 1, 0));
        galaxy.add_faction(Faction::new(THEM, 1, 1, 0));
        galaxy
    }

    #[test]
    fn max_gap_spans_the_wraparound() {
        let mut bearings = vec![350.0, 10.0, 180.0];
        // Gaps: 10->180 = 170, 180->350 = 170, 350->370 = 20.
        assert!((max_bearing_gap(&mut bearings) - 170.0).abs() < 1e-9);
    }

    #[test]
    fn lone_star_is_always_frontier() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        let borders = classify(&galaxy, 100.0);
        assert_eq!(borders[&StarId(1)].class, BorderClass::EmptySpace);
    }

    #[test]
    fn single_friendly_neighbor_is_frontier() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(2), 10.0, 0.0).owned_by(ME, 0));
        let borders = classify(&galaxy, 100.0);
        assert!(borders.contains_key(&StarId(1)));
        assert!(borders.contains_key(&StarId(2)));
    }

    #[test]
    fn surrounded_star_is_interior() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        // Four friendly neighbors at the compass points: all gaps are 90.
        galaxy.add_star(Star::new(StarId(2), 10.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(3), 0.0, 10.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(4), -10.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(5), 0.0, -10.0).owned_by(ME, 0));
        let borders = classify(&galaxy, 100.0);
        assert!(!borders.contains_key(&StarId(1)), "all gaps 90 degrees, interior");
    }

    #[test]
    fn open_flank_beyond_threshold_is_frontier() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        // Two neighbors 90 degrees apart leave a 270-degree flank.
        galaxy.add_star(Star::new(StarId(2), 10.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(3), 0.0, 10.0).owned_by(ME, 0));
        let borders = classify(&galaxy, 100.0);
        assert!(borders.contains_key(&StarId(1)));
    }

    #[test]
    fn hostile_wins_over_free_stars() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(2), 10.0, 0.0)); // neutral
        galaxy.add_star(Star::new(StarId(3), 0.0, 10.0).owned_by(THEM, 5));
        let borders = classify(&galaxy, 100.0);
        let data = &borders[&StarId(1)];
        assert_eq!(data.class, BorderClass::HostileBorder);
        assert!(data.bordering_factions.contains(&THEM));
        assert_eq!(data.detection_neighbors.len(), 2);
    }

    #[test]
    fn neutral_neighbors_classify_as_free_stars() {
        let mut galaxy = base_galaxy();
        galaxy.add_star(Star::new(StarId(1), 0.0, 0.0).owned_by(ME, 0));
        galaxy.add_star(Star::new(StarId(2), 10.0, 0.0));
        let borders = classify(&galaxy, 100.0);
        assert_eq!(borders[&StarId(1)].class, BorderClass::FreeStars);
        assert!(borders[&StarId(1)].bordering_factions.is_empty());
    }
}
