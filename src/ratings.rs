//! Team rating aggregation
//!
//! Reduces a squad to three scalars used by the statistical resolver and
//! recorded on every simulated match.

use serde::{Deserialize, Serialize};

use crate::roster::{Player, Team};

/// Per-attribute weights for the attack and defense ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingWeights {
    pub attack_passing: f32,
    pub attack_speed: f32,
    pub attack_strength: f32,
    pub attack_kicking: f32,
    pub attack_skill: f32,
    pub defense_tackling: f32,
    pub defense_strength: f32,
    pub defense_speed: f32,
    pub defense_skill: f32,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            attack_passing: 0.3,
            attack_speed: 0.3,
            attack_strength: 0.2,
            attack_kicking: 0.1,
            attack_skill: 0.1,
            defense_tackling: 0.5,
            defense_strength: 0.3,
            defense_speed: 0.1,
            defense_skill: 0.1,
        }
    }
}

impl RatingWeights {
    fn attack(&self, p: &Player) -> f32 {
        p.passing() as f32 * self.attack_passing
            + p.speed() as f32 * self.attack_speed
            + p.strength() as f32 * self.attack_strength
            + p.kicking() as f32 * self.attack_kicking
            + p.skill() as f32 * self.attack_skill
    }

    fn defense(&self, p: &Player) -> f32 {
        p.tackling() as f32 * self.defense_tackling
            + p.strength() as f32 * self.defense_strength
            + p.speed() as f32 * self.defense_speed
            + p.skill() as f32 * self.defense_skill
    }
}

/// Aggregated team strength
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRatings {
    pub attack: f32,
    pub defense: f32,
    pub kicking: f32,
}

/// Ratings with the stock weights
pub fn aggregate_ratings(team: &Team) -> TeamRatings {
    aggregate_ratings_with(team, &RatingWeights::default())
}

/// Ratings with custom weights. An empty squad rates zero across the board.
pub fn aggregate_ratings_with(team: &Team, weights: &RatingWeights) -> TeamRatings {
    if team.players.is_empty() {
        return TeamRatings::default();
    }

    let n = team.players.len() as f32;
    let (attack, defense, kicking) = team.players.iter().fold((0.0, 0.0, 0.0), |(a, d, k), p| {
        (a + weights.attack(p), d + weights.defense(p), k + p.kicking() as f32)
    });

    TeamRatings {
        attack: attack / n,
        defense: defense / n,
        kicking: kicking / n,
    }
}
