//! Instant statistical match result
//!
//! No spatial state: the score comes straight from the two teams' ratings
//! plus randomness. Backs both the quick-result mode and "skip to end".

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::odds::{team_conversion_chance, team_penalty_chance, try_potential};
use crate::ratings::{TeamRatings, aggregate_ratings_with};
use crate::roll;
use crate::roster::Team;
use crate::settings::{MatchConfig, Points, ResolverConfig};
use crate::sim::Score;

/// Scoring events for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatLine {
    pub tries: u32,
    pub conversions: u32,
    pub penalty_goals: u32,
}

impl StatLine {
    pub fn points(&self, points: &Points) -> u32 {
        self.tries * points.try_points
            + self.conversions * points.conversion
            + self.penalty_goals * points.penalty_goal
    }
}

/// Full breakdown of a statistical result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub home: StatLine,
    pub away: StatLine,
    pub score: Score,
}

fn try_count<R: Rng>(rng: &mut R, potential: f32, cfg: &ResolverConfig) -> u32 {
    let noise = if cfg.try_jitter_min < cfg.try_jitter_max {
        rng.random_range(cfg.try_jitter_min..cfg.try_jitter_max)
    } else {
        cfg.try_jitter_min
    };
    // Ties round to even
    (cfg.base_tries + potential + noise).round_ties_even().max(0.0) as u32
}

fn conversions<R: Rng>(rng: &mut R, tries: u32, chance: f32) -> u32 {
    let mut made = 0;
    for _ in 0..tries {
        if roll(rng, chance) {
            made += 1;
        }
    }
    made
}

/// Resolve a match from ratings, reporting every scoring event
pub fn resolve_detailed<R: Rng>(
    home: &TeamRatings,
    away: &TeamRatings,
    cfg: &ResolverConfig,
    points: &Points,
    rng: &mut R,
) -> ResolvedMatch {
    let home_potential = try_potential(home, away, cfg);
    let away_potential = try_potential(away, home, cfg);

    let mut home_line = StatLine {
        tries: try_count(rng, home_potential, cfg),
        ..Default::default()
    };
    let mut away_line = StatLine {
        tries: try_count(rng, away_potential, cfg),
        ..Default::default()
    };

    let home_conversion = team_conversion_chance(home.kicking, cfg);
    let away_conversion = team_conversion_chance(away.kicking, cfg);
    home_line.conversions = conversions(rng, home_line.tries, home_conversion);
    away_line.conversions = conversions(rng, away_line.tries, away_conversion);

    // One opportunity count shared by both sides
    let home_penalty = team_penalty_chance(home_potential, home.kicking, cfg);
    let away_penalty = team_penalty_chance(away_potential, away.kicking, cfg);
    let opportunities = if cfg.penalty_opportunities.is_empty() {
        *cfg.penalty_opportunities.start()
    } else {
        rng.random_range(cfg.penalty_opportunities.clone())
    };
    for _ in 0..opportunities {
        if roll(rng, home_penalty) {
            home_line.penalty_goals += 1;
        }
        if roll(rng, away_penalty) {
            away_line.penalty_goals += 1;
        }
    }

    let score = Score {
        home: home_line.points(points),
        away: away_line.points(points),
    };
    log::debug!(
        "Statistical result {}-{} (tries {}-{}, penalties over {} chances)",
        score.home,
        score.away,
        home_line.tries,
        away_line.tries,
        opportunities
    );

    ResolvedMatch {
        home: home_line,
        away: away_line,
        score,
    }
}

/// Resolve a match from ratings
pub fn resolve_statistical<R: Rng>(
    home: &TeamRatings,
    away: &TeamRatings,
    cfg: &ResolverConfig,
    points: &Points,
    rng: &mut R,
) -> Score {
    resolve_detailed(home, away, cfg, points, rng).score
}

/// Standalone quick result for two teams
pub fn quick_result(home: &Team, away: &Team, config: &MatchConfig, seed: u64) -> Score {
    let mut rng = Pcg32::seed_from_u64(seed);
    let home_ratings = aggregate_ratings_with(home, &config.ratings);
    let away_ratings = aggregate_ratings_with(away, &config.ratings);
    let score = resolve_statistical(
        &home_ratings,
        &away_ratings,
        &config.resolver,
        &config.points,
        &mut rng,
    );
    log::info!(
        "Instant result: {} {} - {} {}",
        home.name,
        score.home,
        score.away,
        away.name
    );
    score
}
