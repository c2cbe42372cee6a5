//! Order generation.
//!
//! Three independent passes over the context (defense, invasion, and
//! expansion), each producing scored candidate orders. Scores are unit-less
//! comparable floats, larger = more valuable; the evaluator sorts by
//! category priority first and score second.

use crate::ai::context::Context;
use crate::ai::state::AiState;
use crate::galaxy::{FleetId, Galaxy, StarId};

/// A candidate action for the faction, fixed in category at creation.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Reinforce an owned star before an incoming attack lands.
    DefendStar {
        star: StarId,
        score: f64,
        /// Ticks until the attack arrives.
        ticks_until: u32,
        /// The enemy fleets arriving at that moment.
        incoming: Vec<FleetId>,
    },
    /// Take an enemy star with a single consolidated strike.
    InvadeStar { star: StarId, score: f64 },
    /// Settle a neutral star.
    ClaimStar { star: StarId, score: f64 },
}

impl Order {
    pub fn target(&self) -> StarId {
        match *self {
            Order::DefendStar { star, .. }
            | Order::InvadeStar { star, .. }
            | Order::ClaimStar { star, .. } => star,
        }
    }

    pub fn score(&self) -> f64 {
        match *self {
            Order::DefendStar { score, .. }
            | Order::InvadeStar { score, .. }
            | Order::ClaimStar { score, .. } => score,
        }
    }

    /// Category priority: defense beats invasion beats expansion, whatever
    /// the scores say.
    pub fn priority(&self) -> u8 {
        match self {
            Order::DefendStar { .. } => 4,
            Order::InvadeStar { .. } => 3,
            Order::ClaimStar { .. } => 2,
        }
    }
}

/// Runs all three passes and concatenates the results. No cross-pass
/// deduplication: a star can only be one of owned, enemy, or neutral, so
/// the passes cannot overlap targets.
pub fn generate_orders(galaxy: &Galaxy, ctx: &Context, state: &AiState) -> Vec<Order> {
    let mut orders = defense_orders(galaxy, ctx);
    orders.extend(invasion_orders(galaxy, ctx));
    orders.extend(expansion_orders(galaxy, ctx, state));
    orders
}

/// One defense order per (threatened star, eta) pair in the threat index.
/// Score is the weighted infrastructure value of the star at stake.
fn defense_orders(galaxy: &Galaxy, ctx: &Context) -> Vec<Order> {
    let mut orders = Vec::new();
    for (&star, by_eta) in &ctx.threats {
        let Some(target) = galaxy.star(star) else {
            continue;
        };
        let score = target.infrastructure.weighted_value();
        for (&eta, fleets) in by_eta {
            orders.push(Order::DefendStar {
                star,
                score,
                ticks_until: eta,
                incoming: fleets.clone(),
            });
        }
    }
    orders
}

/// One invasion order per enemy star reachable from an owned star, scored
/// by value over distance: closer targets of equal worth score higher.
/// Duplicate targets keep the best score across source stars.
fn invasion_orders(galaxy: &Galaxy, ctx: &Context) -> Vec<Order> {
    let mut best: std::collections::BTreeMap<StarId, f64> = std::collections::BTreeMap::new();
    for source in ctx.graphs.external.sources() {
        for target in ctx.graphs.external.neighbors(source) {
            let Some(star) = galaxy.star(target) else {
                continue;
            };
            if !star.is_enemy_of(ctx.faction) {
                continue;
            }
            // Wormhole pairs have zero distance; score them as one unit away.
            let distance = galaxy.distance(source, target).max(1.0);
            let score = star.infrastructure.weighted_value() * (ctx.internal_range / distance);
            let entry = best.entry(target).or_insert(f64::MIN);
            if score > *entry {
                *entry = score;
            }
        }
    }
    best.into_iter()
        .map(|(star, score)| Order::InvadeStar { star, score })
        .collect()
}

/// One claim order per neutral star reachable through free space, scored by
/// raw natural resources. Targets already being claimed are skipped.
fn expansion_orders(galaxy: &Galaxy, ctx: &Context, state: &AiState) -> Vec<Order> {
    let mut best: std::collections::BTreeMap<StarId, f64> = std::collections::BTreeMap::new();
    for &source in &ctx.owned_stars {
        for target in ctx.graphs.free.neighbors(source) {
            let Some(star) = galaxy.star(target) else {
                continue;
            };
            if star.owner.is_some() || state.is_claiming(target) {
                continue;
            }
            let resources = star.natural.total();
            let score = if resources == 0 { 1.0 } else { f64::from(resources) };
            let entry = best.entry(target).or_insert(f64::MIN);
            if score > *entry {
                *entry = score;
            }
        }
    }
    best.into_iter()
        .map(|(star, score)| Order::ClaimStar { star, score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::build_context;
    use crate::galaxy::{Faction, FactionId, Fleet, Point, ResourceLevels, Star, Waypoint, WaypointAction};

    const ME: FactionId = FactionId(1);
    const THEM: FactionId = FactionId(2);

    fn fixture() -> Galaxy {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_faction(Faction::new(ME, 1, 2, 100));
        galaxy.add_faction(Faction::new(THEM, 1, 1, 100));
        galaxy.add_star(
            Star::new(StarId(1), 0.0, 0.0)
                .owned_by(ME, 10)
                .with_infrastructure(ResourceLevels::new(0, 10, 0)),
        );
        galaxy.add_star(
            Star::new(StarId(2), 30.0, 0.0)
                .owned_by(THEM, 3)
                .with_infrastructure(ResourceLevels::new(2, 0, 0)),
        );
        galaxy.add_star(
            Star::new(StarId(3), 0.0, 25.0).with_natural(ResourceLevels::new(3, 4, 0)),
        );
        galaxy
    }

    fn orders_for(galaxy: &Galaxy, state: &AiState) -> Vec<Order> {
        let ctx = build_context(galaxy, ME).unwrap();
        generate_orders(galaxy, &ctx, state)
    }

    #[test]
    fn defense_order_scores_weighted_star_value() {
        let mut galaxy = fixture();
        // 5 enemy ships arriving at star 1 in 3 ticks (30 away at speed 10).
        let mut raider = Fleet::docked(FleetId(9), THEM, 5, StarId(2), Point::new(30.0, 0.0));
        raider.orbiting = None;
        raider.waypoints = vec![Waypoint::new(StarId(2), StarId(1), WaypointAction::None)];
        galaxy.add_fleet(raider);

        let orders = orders_for(&galaxy, &AiState::default());
        let defend = orders
            .iter()
            .find(|o| matches!(o, Order::DefendStar { .. }))
            .expect("defense order");
        match defend {
            Order::DefendStar { star, score, ticks_until, incoming } => {
                assert_eq!(*star, StarId(1));
                // Industry 10 weighted x2.
                assert!((score - 20.0).abs() < 1e-9);
                assert_eq!(*ticks_until, 3);
                assert_eq!(incoming, &vec![FleetId(9)]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn invasion_scores_favor_closer_targets() {
        let mut galaxy = fixture();
        // A second enemy star, same value, farther away.
        galaxy.add_star(
            Star::new(StarId(4), 40.0, 0.0)
                .owned_by(THEM, 3)
                .with_infrastructure(ResourceLevels::new(2, 0, 0)),
        );

        let orders = orders_for(&galaxy, &AiState::default());
        let score_of = |id: StarId| {
            orders
                .iter()
                .find_map(|o| match o {
                    Order::InvadeStar { star, score } if *star == id => Some(*score),
                    _ => None,
                })
                .expect("invasion order")
        };
        assert!(score_of(StarId(2)) > score_of(StarId(4)));
    }

    #[test]
    fn invasion_targets_deduplicated_keeping_max() {
        let mut galaxy = fixture();
        // Second owned star closer to the enemy: edge exists from both.
        galaxy.add_star(Star::new(StarId(5), 20.0, 0.0).owned_by(ME, 1));
        let orders = orders_for(&galaxy, &AiState::default());
        let invasions: Vec<&Order> = orders
            .iter()
            .filter(|o| matches!(o, Order::InvadeStar { star, .. } if *star == StarId(2)))
            .collect();
        assert_eq!(invasions.len(), 1);
        // Best source is star 5 at distance 10: score = 2 * (40 / 10).
        assert!((invasions[0].score() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn expansion_scores_sum_natural_resources() {
        let galaxy = fixture();
        let orders = orders_for(&galaxy, &AiState::default());
        let claim = orders
            .iter()
            .find(|o| matches!(o, Order::ClaimStar { .. }))
            .expect("claim order");
        assert_eq!(claim.target(), StarId(3));
        assert!((claim.score() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn expansion_skips_claims_in_progress() {
        let galaxy = fixture();
        let mut state = AiState::default();
        state.record_claim(StarId(3));
        let orders = orders_for(&galaxy, &state);
        assert!(!orders.iter().any(|o| matches!(o, Order::ClaimStar { .. })));
    }

    #[test]
    fn barren_neutral_star_scores_one() {
        let mut galaxy = fixture();
        galaxy.stars.get_mut(&StarId(3)).unwrap().natural = ResourceLevels::default();
        let orders = orders_for(&galaxy, &AiState::default());
        let claim = orders
            .iter()
            .find(|o| matches!(o, Order::ClaimStar { .. }))
            .expect("claim order");
        assert!((claim.score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn priorities_rank_defend_over_invade_over_claim() {
        let defend = Order::DefendStar {
            star: StarId(1),
            score: 0.0,
            ticks_until: 1,
            incoming: Vec::new(),
        };
        let invade = Order::InvadeStar { star: StarId(2), score: 1000.0 };
        let claim = Order::ClaimStar { star: StarId(3), score: 1000.0 };
        assert!(defend.priority() > invade.priority());
        assert!(invade.priority() > claim.priority());
    }
}
