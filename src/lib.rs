//! Rugby Sim - A two-team rugby union match simulator
//!
//! Core modules:
//! - `roster`: Players, positions and teams (read-only input to a match)
//! - `ratings`: Team attack/defense/kicking aggregation
//! - `odds`: Clamped probability formulas shared by both resolution paths
//! - `resolver`: Instant statistical result
//! - `sim`: Deterministic stepped spatial simulation
//! - `settings`: Data-driven match tuning

pub mod error;
pub mod odds;
pub mod ratings;
pub mod resolver;
pub mod roster;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use ratings::{TeamRatings, aggregate_ratings};
pub use resolver::{quick_result, resolve_statistical};
pub use roster::{Player, Position, Side, Team};
pub use settings::MatchConfig;
pub use sim::{MatchSnapshot, MatchState, Score, StepOutcome};

/// Match configuration constants (defaults for `MatchConfig`)
pub mod consts {
    /// Matchday squad size for the MVP rules
    pub const SQUAD_SIZE: usize = 15;
    /// Forwards occupy the first slots of a squad
    pub const FORWARD_COUNT: usize = 8;

    /// Points
    pub const TRY_POINTS: u32 = 5;
    pub const CONVERSION_POINTS: u32 = 2;
    pub const PENALTY_POINTS: u32 = 3;

    /// Clock: 80 minutes played out over 320 steps at 100 ms each
    pub const GAME_DURATION_MINUTES: u32 = 80;
    pub const MATCH_DURATION_STEPS: u32 = 80 * 4;
    pub const STEP_INTERVAL_MS: u64 = 100;

    /// Pitch rectangle (top-left origin, Y grows toward the away try line)
    pub const PITCH_LEFT: f32 = 100.0;
    pub const PITCH_TOP: f32 = 80.0;
    pub const PITCH_WIDTH: f32 = 600.0;
    pub const PITCH_HEIGHT: f32 = 440.0;
    /// Agents may stray this far outside the pitch
    pub const PITCH_MARGIN: f32 = 20.0;

    /// Attribute bounds
    pub const ATTRIBUTE_MIN: u8 = 1;
    pub const ATTRIBUTE_MAX: u8 = 100;
    pub const ATTRIBUTE_DEFAULT: u8 = 50;
}

/// Uniform jitter in `(-amount, amount)`, zero when there is no room to jitter
#[inline]
pub fn jitter<R: rand::Rng>(rng: &mut R, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..amount)
    } else {
        0.0
    }
}

/// Uniform roll in `[0, 1)` compared against a probability
#[inline]
pub fn roll<R: rand::Rng>(rng: &mut R, probability: f32) -> bool {
    rng.random::<f32>() < probability
}
