//! Line-up and per-step targeting
//!
//! Targets are re-derived every step from the carrier's position alone, so
//! nothing here keeps state between steps.

use glam::Vec2;
use rand::Rng;

use super::state::{AgentId, MatchAgent};
use super::Pitch;
use crate::jitter;
use crate::roster::{Side, Team};
use crate::settings::FormationConfig;

const FORWARD_SLOTS: f32 = 9.0;
const BACK_SLOTS: usize = 8;
const FORWARD_DEPTH: f32 = 0.15;
const BACK_DEPTH: f32 = 0.35;

/// Starting position for roster slot `index` of `side`
fn lineup_slot(pitch: &Pitch, side: Side, index: usize) -> Vec2 {
    let center_y = pitch.center().y;
    // Home sits on the top half
    let toward_own = -side.attack_dir();
    if Team::is_forward_slot(index) {
        let x = pitch.left() + pitch.width() / FORWARD_SLOTS * (index as f32 + 1.0);
        Vec2::new(x, center_y + toward_own * FORWARD_DEPTH * pitch.height())
    } else {
        let slot = (index - crate::consts::FORWARD_COUNT) % BACK_SLOTS;
        let x = pitch.left() + pitch.width() / BACK_SLOTS as f32 * (slot as f32 + 0.5);
        Vec2::new(x, center_y + toward_own * BACK_DEPTH * pitch.height())
    }
}

/// One agent per player, home first, each scattered around its slot
pub(super) fn line_up<R: Rng>(
    home: &Team,
    away: &Team,
    pitch: &Pitch,
    cfg: &FormationConfig,
    rng: &mut R,
) -> Vec<MatchAgent> {
    let mut agents = Vec::with_capacity(home.len() + away.len());
    for (side, team) in [(Side::Home, home), (Side::Away, away)] {
        for index in 0..team.len() {
            let mut pos = lineup_slot(pitch, side, index);
            pos.y += jitter(rng, cfg.lineup_jitter);
            agents.push(MatchAgent::new(side, index, pitch.clamp(pos)));
        }
    }
    agents
}

/// Assign a target to every agent given the current carrier
pub(super) fn assign_targets<R: Rng>(
    agents: &mut [MatchAgent],
    carrier: AgentId,
    pitch: &Pitch,
    cfg: &FormationConfig,
    offside_tolerance: f32,
    rng: &mut R,
) {
    let attack = agents[carrier].side;
    let dir = attack.attack_dir();
    let carrier_pos = agents[carrier].pos;

    agents[carrier].target = Vec2::new(
        carrier_pos.x + jitter(rng, pitch.width() * 0.05),
        carrier_pos.y + dir * pitch.height(),
    );

    let by_distance = |agents: &[MatchAgent], ids: &mut Vec<AgentId>| {
        ids.sort_by(|&a, &b| {
            let da = agents[a].pos.distance(carrier_pos);
            let db = agents[b].pos.distance(carrier_pos);
            da.total_cmp(&db)
        });
    };

    let mut support: Vec<AgentId> = (0..agents.len())
        .filter(|&id| id != carrier && agents[id].side == attack)
        .collect();
    by_distance(agents, &mut support);

    for (i, &id) in support.iter().enumerate() {
        if i < cfg.immediate_support {
            let slot = (i / 2 + 1) as f32;
            let lateral = if i % 2 == 0 { 1.0 } else { -1.0 };
            let x = carrier_pos.x + lateral * slot * cfg.support_width + jitter(rng, 10.0);
            let y = carrier_pos.y - dir * cfg.support_distance + jitter(rng, 5.0);
            agents[id].target = Vec2::new(x, y);
        } else {
            let agent = &mut agents[id];
            let holding = Vec2::new(
                agent.pos.x,
                carrier_pos.y - dir * (cfg.support_distance + cfg.holding_depth),
            );
            agent.target = agent.pos * cfg.lagged_blend + holding * (1.0 - cfg.lagged_blend);
        }
    }

    let line_y = defensive_line_y(carrier_pos.y, attack, pitch, cfg, offside_tolerance);

    let mut defenders: Vec<AgentId> = (0..agents.len())
        .filter(|&id| agents[id].side != attack)
        .collect();
    defenders.sort_by(|&a, &b| agents[a].pos.x.total_cmp(&agents[b].pos.x));

    let has_sweeper = defenders.len() > cfg.sweeper_threshold;
    let line_len = if has_sweeper {
        defenders.len() - 1
    } else {
        defenders.len()
    };
    let half = (line_len / 2) as f32;

    for (i, &id) in defenders[..line_len].iter().enumerate() {
        let x = carrier_pos.x + (i as f32 - half) * cfg.defensive_line_spacing;
        agents[id].target = Vec2::new(x, line_y + jitter(rng, 3.0));
    }
    if has_sweeper {
        let sweeper = defenders[line_len];
        agents[sweeper].target = Vec2::new(carrier_pos.x, line_y + dir * cfg.sweeper_depth);
    }
}

/// Y of the defensive line, kept onside and off the defenders' own boundary
pub(super) fn defensive_line_y(
    carrier_y: f32,
    attack: Side,
    pitch: &Pitch,
    cfg: &FormationConfig,
    offside_tolerance: f32,
) -> f32 {
    let line_y = carrier_y - attack.attack_dir() * cfg.defensive_line_offset;
    match attack {
        Side::Home => line_y
            .max(carrier_y + offside_tolerance)
            .min(pitch.bottom() - pitch.line_buffer),
        Side::Away => line_y
            .min(carrier_y - offside_tolerance)
            .max(pitch.top() + pitch.line_buffer),
    }
}
