//! Match tuning
//!
//! Every probability, speed and distance the engine uses lives here. The
//! defaults reproduce the stock balance; JSON files may override any subset.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::ratings::RatingWeights;
use crate::sim::Pitch;

/// Points awarded per scoring event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Points {
    pub try_points: u32,
    pub conversion: u32,
    pub penalty_goal: u32,
}

impl Default for Points {
    fn default() -> Self {
        Self {
            try_points: TRY_POINTS,
            conversion: CONVERSION_POINTS,
            penalty_goal: PENALTY_POINTS,
        }
    }
}

/// Step budget and how it maps onto the game clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub total_steps: u32,
    pub game_minutes: u32,
    /// Real-time pacing used by controllers and status expiry
    pub step_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            total_steps: MATCH_DURATION_STEPS,
            game_minutes: GAME_DURATION_MINUTES,
            step_interval_ms: STEP_INTERVAL_MS,
        }
    }
}

impl ClockConfig {
    /// Convert a display duration into whole steps (at least one)
    pub fn steps_for_ms(&self, duration_ms: u64) -> u32 {
        let interval = self.step_interval_ms.max(1);
        duration_ms.div_ceil(interval).max(1) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub base_speed: f32,
    /// Speed gained (or lost) at attribute 100 (or 0) relative to 50
    pub speed_variation: f32,
    pub min_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 1.5,
            speed_variation: 0.8,
            min_speed: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// How far behind the carrier support runners aim
    pub support_distance: f32,
    /// Lateral gap between support slots
    pub support_width: f32,
    /// Support runners that take explicit slots
    pub immediate_support: usize,
    /// Extra depth for the remaining attackers
    pub holding_depth: f32,
    /// Share of current position kept by the remaining attackers each step
    pub lagged_blend: f32,
    /// How far toward their own line defenders sit from the carrier
    pub defensive_line_offset: f32,
    pub defensive_line_spacing: f32,
    /// How far behind the line the sweeper sits
    pub sweeper_depth: f32,
    /// A sweeper is held back only when more defenders than this exist
    pub sweeper_threshold: usize,
    /// Vertical scatter at the initial line-up
    pub lineup_jitter: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            support_distance: 45.0,
            support_width: 35.0,
            immediate_support: 4,
            holding_depth: 30.0,
            lagged_blend: 0.8,
            defensive_line_offset: 20.0,
            defensive_line_spacing: 40.0,
            sweeper_depth: 60.0,
            sweeper_threshold: 5,
            lineup_jitter: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassingConfig {
    pub base_chance: f32,
    /// Added to the pass chance when a defender is inside the pressure radius
    pub pressure_bonus: f32,
    /// Pressure radius as a multiple of the tackle radius
    pub pressure_radius_factor: f32,
    pub max_distance: f32,
    /// How far behind the carrier a receiver may stand
    pub y_tolerance: f32,
    pub success_base: f32,
    pub accuracy_influence: f32,
    pub distance_penalty: f32,
    pub success_min: f32,
    pub success_max: f32,
    pub interception_chance: f32,
    pub interception_radius: f32,
    /// Scatter of a dropped ball around the intended receiver
    pub drop_scatter: f32,
}

impl Default for PassingConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.02,
            pressure_bonus: 0.08,
            pressure_radius_factor: 2.0,
            max_distance: 100.0,
            y_tolerance: 5.0,
            success_base: 0.85,
            accuracy_influence: 0.008,
            distance_penalty: 0.003,
            success_min: 0.1,
            success_max: 0.98,
            interception_chance: 0.01,
            interception_radius: 35.0,
            drop_scatter: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacklingConfig {
    pub radius: f32,
    pub success_base: f32,
    /// Weight of the strength gap and of the tackler's tackling above 50
    pub strength_influence: f32,
    pub speed_influence: f32,
    pub success_min: f32,
    pub success_max: f32,
    /// Multiplier on the base penalty chance for an infringement at the tackle
    pub penalty_multiplier: f32,
    /// Fraction of the tackler's offset added on a broken tackle
    pub knockback: f32,
}

impl Default for TacklingConfig {
    fn default() -> Self {
        Self {
            radius: 8.0 * 2.5,
            success_base: 0.40,
            strength_influence: 0.01,
            speed_influence: 0.005,
            success_min: 0.05,
            success_max: 0.95,
            penalty_multiplier: 2.5,
            knockback: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Chance per step of a general infringement
    pub base_chance: f32,
    pub goal_success_rate: f32,
    pub conversion_success_rate: f32,
    pub kick_min: f32,
    pub kick_max: f32,
    /// Goal attempts are taken within this fraction of pitch length
    pub kick_range_fraction: f32,
    /// Ground gained by a kick to touch, as a fraction of pitch length
    pub touch_gain_fraction: f32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.008,
            goal_success_rate: 0.75,
            conversion_success_rate: 0.70,
            kick_min: 0.1,
            kick_max: 1.0,
            kick_range_fraction: 0.45,
            touch_gain_fraction: 0.3,
        }
    }
}

/// Instant statistical result tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Lower values produce higher scores
    pub normalization: f32,
    pub base_tries: f32,
    pub try_jitter_min: f32,
    pub try_jitter_max: f32,
    pub conversion_base: f32,
    pub kicking_baseline: f32,
    pub conversion_scale: f32,
    pub conversion_min: f32,
    pub conversion_max: f32,
    pub penalty_factor: f32,
    pub penalty_opportunities: RangeInclusive<u32>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            normalization: 75.0,
            base_tries: 1.5,
            try_jitter_min: -1.0,
            try_jitter_max: 1.5,
            conversion_base: 0.65,
            kicking_baseline: 50.0,
            conversion_scale: 200.0,
            conversion_min: 0.1,
            conversion_max: 0.95,
            penalty_factor: 0.1,
            penalty_opportunities: 3..=7,
        }
    }
}

/// Complete match configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub points: Points,
    pub clock: ClockConfig,
    pub pitch: Pitch,
    pub movement: MovementConfig,
    pub formation: FormationConfig,
    pub passing: PassingConfig,
    pub tackling: TacklingConfig,
    pub penalties: PenaltyConfig,
    pub resolver: ResolverConfig,
    pub ratings: RatingWeights,
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(message()))
    }
}

fn check_probability(name: &str, value: f32) -> Result<()> {
    check((0.0..=1.0).contains(&value), || {
        format!("{name} must be a probability in [0, 1], got {value}")
    })
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    check(value.is_finite() && value >= 0.0, || {
        format!("{name} must be non-negative, got {value}")
    })
}

fn check_bounds(name: &str, min: f32, max: f32) -> Result<()> {
    check(min <= max, || format!("{name} bounds are inverted: {min} > {max}"))?;
    check_probability(name, min)?;
    check_probability(name, max)
}

impl MatchConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded match config from {}", path.as_ref().display());
        Ok(config)
    }

    /// A config with the given step budget, everything else stock
    pub fn with_steps(total_steps: u32) -> Self {
        let mut config = Self::default();
        config.clock.total_steps = total_steps;
        config
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        check(self.clock.total_steps > 0, || {
            "clock.total_steps must be positive".to_string()
        })?;
        check(self.clock.game_minutes > 0, || {
            "clock.game_minutes must be positive".to_string()
        })?;
        check(self.clock.step_interval_ms > 0, || {
            "clock.step_interval_ms must be positive".to_string()
        })?;

        let pitch = &self.pitch;
        check(
            pitch.size.is_finite() && pitch.size.x > 0.0 && pitch.size.y > 0.0,
            || format!("pitch.size must be positive, got {:?}", pitch.size),
        )?;
        check(pitch.origin.is_finite(), || "pitch.origin must be finite".to_string())?;
        check_non_negative("pitch.margin", pitch.margin)?;
        check_non_negative("pitch.try_line_offset", pitch.try_line_offset)?;
        check_non_negative("pitch.line_buffer", pitch.line_buffer)?;
        check_probability("pitch.twenty_two_fraction", pitch.twenty_two_fraction)?;

        let m = &self.movement;
        check_non_negative("movement.base_speed", m.base_speed)?;
        check_non_negative("movement.speed_variation", m.speed_variation)?;
        check(m.min_speed.is_finite() && m.min_speed > 0.0, || {
            "movement.min_speed must be positive".to_string()
        })?;

        let f = &self.formation;
        check_non_negative("formation.support_distance", f.support_distance)?;
        check_non_negative("formation.support_width", f.support_width)?;
        check_non_negative("formation.holding_depth", f.holding_depth)?;
        check_probability("formation.lagged_blend", f.lagged_blend)?;
        check_non_negative("formation.defensive_line_offset", f.defensive_line_offset)?;
        check_non_negative("formation.defensive_line_spacing", f.defensive_line_spacing)?;
        check_non_negative("formation.sweeper_depth", f.sweeper_depth)?;
        check_non_negative("formation.lineup_jitter", f.lineup_jitter)?;

        let p = &self.passing;
        check_probability("passing.base_chance", p.base_chance)?;
        check_probability("passing.pressure_bonus", p.pressure_bonus)?;
        check_non_negative("passing.pressure_radius_factor", p.pressure_radius_factor)?;
        check_non_negative("passing.max_distance", p.max_distance)?;
        check_non_negative("passing.y_tolerance", p.y_tolerance)?;
        check_bounds("passing.success", p.success_min, p.success_max)?;
        check_probability("passing.interception_chance", p.interception_chance)?;
        check_non_negative("passing.interception_radius", p.interception_radius)?;
        check_non_negative("passing.drop_scatter", p.drop_scatter)?;

        let t = &self.tackling;
        check_non_negative("tackling.radius", t.radius)?;
        check_bounds("tackling.success", t.success_min, t.success_max)?;
        check_non_negative("tackling.penalty_multiplier", t.penalty_multiplier)?;
        check_non_negative("tackling.knockback", t.knockback)?;

        let pen = &self.penalties;
        check_probability("penalties.base_chance", pen.base_chance)?;
        check_bounds("penalties.kick", pen.kick_min, pen.kick_max)?;
        check_probability("penalties.kick_range_fraction", pen.kick_range_fraction)?;
        check_probability("penalties.touch_gain_fraction", pen.touch_gain_fraction)?;

        let r = &self.resolver;
        check(r.normalization > 0.0, || {
            "resolver.normalization must be positive".to_string()
        })?;
        check(r.try_jitter_min < r.try_jitter_max, || {
            format!(
                "resolver try jitter range is empty: {} >= {}",
                r.try_jitter_min, r.try_jitter_max
            )
        })?;
        check(r.conversion_scale > 0.0, || {
            "resolver.conversion_scale must be positive".to_string()
        })?;
        check_bounds("resolver.conversion", r.conversion_min, r.conversion_max)?;
        check(!r.penalty_opportunities.is_empty(), || {
            "resolver.penalty_opportunities must not be empty".to_string()
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let err = MatchConfig::with_steps(0).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        assert!(err.to_string().contains("total_steps"));
    }

    #[test]
    fn test_bad_probability_rejected() {
        let mut config = MatchConfig::default();
        config.passing.base_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = MatchConfig::default();
        config.tackling.success_min = 0.9;
        config.tackling.success_max = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_pitch_rejected() {
        let mut config = MatchConfig::default();
        config.pitch.size.y = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MatchConfig::from_json(
            r#"{ "clock": { "total_steps": 40 }, "passing": { "base_chance": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.clock.total_steps, 40);
        assert_eq!(config.clock.game_minutes, GAME_DURATION_MINUTES);
        assert_eq!(config.passing.base_chance, 0.5);
        assert_eq!(config.passing.max_distance, 100.0);
        assert_eq!(config.points, Points::default());
    }

    #[test]
    fn test_json_validation_runs() {
        let err = MatchConfig::from_json(r#"{ "clock": { "total_steps": 0 } }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        let err = MatchConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Parse(_)));
    }

    #[test]
    fn test_steps_for_ms() {
        let clock = ClockConfig::default();
        assert_eq!(clock.steps_for_ms(2000), 20);
        assert_eq!(clock.steps_for_ms(150), 2);
        assert_eq!(clock.steps_for_ms(0), 1);
    }

    #[test]
    fn test_fixed_kick_scales_are_not_settings() {
        let json = r#"{
            "penalties": { "kicker_scale": 0.0 },
            "resolver": { "penalty_kicking_scale": 0.0 }
        }"#;
        let config = MatchConfig::from_json(json).unwrap();
        assert_eq!(config, MatchConfig::default());
        assert_eq!(config.penalties.kick_max, 1.0);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = MatchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(MatchConfig::from_json(&json).unwrap(), config);
    }
}
