//! Probability formulas
//!
//! Each function returns a value already clamped to its configured range so
//! callers can compare a uniform roll against it directly.

use crate::ratings::TeamRatings;
use crate::roster::Player;
use crate::settings::{MovementConfig, PassingConfig, PenaltyConfig, ResolverConfig, TacklingConfig};

/// Kicking attribute at which the stepped kick rates apply unchanged
const KICKER_BASELINE: f32 = 60.0;
/// Attribute points per unit of stepped kick probability
const KICKER_SCALE: f32 = 150.0;
/// Swing of the statistical penalty chance per unit of try potential
const PENALTY_POTENTIAL_SCALE: f32 = 10.0;
const PENALTY_KICKING_SCALE: f32 = 500.0;

/// Distance an agent covers in one step
pub fn agent_speed(player: &Player, movement: &MovementConfig) -> f32 {
    let variation = (player.speed() as f32 - 50.0) / 50.0 * movement.speed_variation;
    (movement.base_speed + variation).max(movement.min_speed)
}

pub fn pass_success_chance(passing: u8, distance: f32, cfg: &PassingConfig) -> f32 {
    let chance = cfg.success_base + (passing as f32 - 60.0) * cfg.accuracy_influence
        - distance * cfg.distance_penalty;
    chance.clamp(cfg.success_min, cfg.success_max)
}

pub fn tackle_success_chance(carrier: &Player, defender: &Player, cfg: &TacklingConfig) -> f32 {
    let strength_diff = carrier.strength() as f32 - defender.strength() as f32;
    let tackling_diff = defender.tackling() as f32 - 50.0;
    let speed_diff = defender.speed() as f32 - carrier.speed() as f32;
    let chance = cfg.success_base - strength_diff * cfg.strength_influence
        + tackling_diff * cfg.strength_influence
        + speed_diff * cfg.speed_influence;
    chance.clamp(cfg.success_min, cfg.success_max)
}

fn kick_chance(base: f32, kicking: u8, cfg: &PenaltyConfig) -> f32 {
    let chance = base + (kicking as f32 - KICKER_BASELINE) / KICKER_SCALE;
    chance.clamp(cfg.kick_min, cfg.kick_max)
}

/// Penalty goal attempt during stepped play
pub fn penalty_goal_chance(kicking: u8, cfg: &PenaltyConfig) -> f32 {
    kick_chance(cfg.goal_success_rate, kicking, cfg)
}

/// Conversion after a try during stepped play
pub fn conversion_chance(kicking: u8, cfg: &PenaltyConfig) -> f32 {
    kick_chance(cfg.conversion_success_rate, kicking, cfg)
}

/// Attack of one side against the other's defense
pub fn try_potential(attack: &TeamRatings, defense: &TeamRatings, cfg: &ResolverConfig) -> f32 {
    (attack.attack - defense.defense) / cfg.normalization
}

/// Conversion chance in the statistical model (team kicking average)
pub fn team_conversion_chance(kicking: f32, cfg: &ResolverConfig) -> f32 {
    let chance = cfg.conversion_base + (kicking - cfg.kicking_baseline) / cfg.conversion_scale;
    chance.clamp(cfg.conversion_min, cfg.conversion_max)
}

/// Penalty goal chance per opportunity in the statistical model
pub fn team_penalty_chance(potential: f32, kicking: f32, cfg: &ResolverConfig) -> f32 {
    let chance = cfg.penalty_factor
        + potential / PENALTY_POTENTIAL_SCALE
        + (kicking - cfg.kicking_baseline) / PENALTY_KICKING_SCALE;
    chance.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Attributes, Position};

    fn player(attrs: Attributes) -> Player {
        Player::new("P", Position::Centre, attrs)
    }

    #[test]
    fn test_equal_tackle_is_forty_percent() {
        let carrier = player(Attributes::uniform(50));
        let defender = player(Attributes::uniform(50));
        let chance = tackle_success_chance(&carrier, &defender, &TacklingConfig::default());
        assert!((chance - 0.40).abs() < 1e-6);
    }

    #[test]
    fn test_tackle_clamped() {
        let carrier = player(Attributes::new(50, 50, 50, 100, 100));
        let defender = player(Attributes::new(1, 50, 50, 1, 1));
        let cfg = TacklingConfig::default();
        assert_eq!(tackle_success_chance(&carrier, &defender, &cfg), 0.05);
        assert_eq!(tackle_success_chance(&defender, &carrier, &cfg), 0.95);
    }

    #[test]
    fn test_pass_at_zero_distance() {
        let cfg = PassingConfig::default();
        assert!((pass_success_chance(60, 0.0, &cfg) - 0.85).abs() < 1e-6);
        // 0.85 + 40 * 0.008 = 1.17 -> clamped
        assert_eq!(pass_success_chance(100, 0.0, &cfg), 0.98);
        // 0.85 - 100 * 0.003 = 0.55
        assert!((pass_success_chance(60, 100.0, &cfg) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_kicks_at_baseline() {
        let cfg = PenaltyConfig::default();
        assert!((penalty_goal_chance(60, &cfg) - 0.75).abs() < 1e-6);
        assert!((conversion_chance(60, &cfg) - 0.70).abs() < 1e-6);
        // 0.75 + 40 / 150 and 0.70 + 40 / 150 both pass the cap
        assert_eq!(penalty_goal_chance(100, &cfg), 1.0);
        assert!((conversion_chance(100, &cfg) - 0.9666667).abs() < 1e-5);
        assert!((penalty_goal_chance(90, &cfg) - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_kick_cap_is_configurable() {
        let cfg = PenaltyConfig {
            kick_max: 0.9,
            ..Default::default()
        };
        assert_eq!(penalty_goal_chance(100, &cfg), 0.9);
        assert!((conversion_chance(60, &cfg) - 0.70).abs() < 1e-6);
    }

    #[test]
    fn test_agent_speed() {
        let movement = MovementConfig::default();
        assert_eq!(agent_speed(&player(Attributes::uniform(50)), &movement), 1.5);
        assert!((agent_speed(&player(Attributes::uniform(100)), &movement) - 2.3).abs() < 1e-6);
        // 1.5 - 49/50 * 0.8 = 0.716
        assert!((agent_speed(&player(Attributes::uniform(1)), &movement) - 0.716).abs() < 1e-5);

        let slow = MovementConfig {
            base_speed: 0.0,
            ..movement
        };
        assert_eq!(agent_speed(&player(Attributes::uniform(1)), &slow), 0.5);
    }

    #[test]
    fn test_team_formulas() {
        let cfg = ResolverConfig::default();
        assert!((team_conversion_chance(50.0, &cfg) - 0.65).abs() < 1e-6);
        assert!((team_conversion_chance(100.0, &cfg) - 0.9).abs() < 1e-6);
        assert!((team_penalty_chance(0.0, 50.0, &cfg) - 0.1).abs() < 1e-6);
        assert_eq!(team_penalty_chance(-20.0, 1.0, &cfg), 0.0);
    }
}
