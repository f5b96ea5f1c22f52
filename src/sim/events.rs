//! Event resolution: passes, tackles, penalties, tries and restarts
//!
//! Each resolver either returns the outcome that ends the step or `None` to
//! let the next one in precedence order run.

use glam::Vec2;
use rand::Rng;

use super::state::{AgentId, MatchEvent, MatchState, PenaltyReason, StepOutcome};
use crate::odds::{
    conversion_chance, pass_success_chance, penalty_goal_chance, tackle_success_chance,
};
use crate::roster::Side;
use crate::{jitter, roll};

const DEFAULT_STATUS_MS: u64 = 1500;
const PHASE_STATUS_MS: u64 = 2000;

impl MatchState {
    /// Random side receives at the centre spot
    pub(super) fn kickoff(&mut self) {
        let side = if self.rng.random::<bool>() {
            Side::Home
        } else {
            Side::Away
        };
        self.ball.pos = self.config.pitch.center();
        self.ball.carrier = None;
        self.ball.possession = Some(side);

        let receiver = self.nearest_in(self.side_agents(side), self.ball.pos);
        match receiver {
            Some(id) => self.give_ball(id),
            None => log::warn!("{} has no players to receive the kickoff", self.team(side).name),
        }

        let name = self.team(side).name.clone();
        log::info!("Kick off, {name} receive");
        self.record(MatchEvent::Kickoff {
            side,
            receiver: receiver.map(|id| self.name_of(id)),
        });
        self.set_status(format!("Kick off! {name} possession."), PHASE_STATUS_MS);
    }

    /// Nearest agent of either side claims a loose ball
    pub(super) fn pick_up_loose_ball(&mut self) -> bool {
        let Some(id) = self.nearest_in(0..self.agents.len(), self.ball.pos) else {
            return false;
        };
        self.give_ball(id);
        self.record(MatchEvent::LooseBallPickup {
            side: self.agents[id].side,
            player: self.name_of(id),
        });
        true
    }

    pub(super) fn attempt_pass(&mut self) -> Option<StepOutcome> {
        let carrier = self.ball.carrier?;
        let cfg = self.config.passing;
        let side = self.agents[carrier].side;
        let carrier_pos = self.agents[carrier].pos;

        let pressure_radius = self.config.tackling.radius * cfg.pressure_radius_factor;
        let under_pressure = self
            .side_agents(side.opponent())
            .any(|id| self.agents[id].pos.distance(carrier_pos) < pressure_radius);
        let chance = cfg.base_chance + if under_pressure { cfg.pressure_bonus } else { 0.0 };
        if !roll(&mut self.rng, chance) {
            return None;
        }

        let target = self.find_pass_target(carrier)?;
        Some(self.execute_pass(carrier, target))
    }

    /// Nearest teammate in range that is level with or beyond the carrier
    pub(super) fn find_pass_target(&self, carrier: AgentId) -> Option<AgentId> {
        let cfg = &self.config.passing;
        let side = self.agents[carrier].side;
        let carrier_pos = self.agents[carrier].pos;
        let onside = |y: f32| match side {
            Side::Home => y >= carrier_pos.y - cfg.y_tolerance,
            Side::Away => y <= carrier_pos.y + cfg.y_tolerance,
        };

        self.side_agents(side)
            .filter(|&id| id != carrier)
            .map(|id| (id, self.agents[id].pos.distance(carrier_pos)))
            .filter(|&(id, distance)| onside(self.agents[id].pos.y) && distance < cfg.max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn execute_pass(&mut self, carrier: AgentId, target: AgentId) -> StepOutcome {
        let cfg = self.config.passing;
        let side = self.agents[carrier].side;
        let target_pos = self.agents[target].pos;
        let distance = self.agents[carrier].pos.distance(target_pos);
        let chance = pass_success_chance(self.player(carrier).passing(), distance, &cfg);

        if roll(&mut self.rng, chance) {
            self.give_ball(target);
            self.ball.pos = target_pos;
            let to = self.name_of(target);
            self.record(MatchEvent::Pass {
                side,
                from: self.name_of(carrier),
                to: to.clone(),
            });
            self.set_status(format!("Pass to {to}"), DEFAULT_STATUS_MS);
            return StepOutcome::Pass;
        }

        // Every defender near the receiver gets one chance, in roster order
        for id in self.side_agents(side.opponent()) {
            if self.agents[id].pos.distance(target_pos) >= cfg.interception_radius {
                continue;
            }
            if roll(&mut self.rng, cfg.interception_chance) {
                self.give_ball(id);
                self.ball.pos = self.agents[id].pos;
                let player = self.name_of(id);
                self.record(MatchEvent::Interception {
                    side: side.opponent(),
                    player: player.clone(),
                });
                self.set_status(format!("INTERCEPTED by {player}!"), DEFAULT_STATUS_MS);
                return StepOutcome::Interception;
            }
        }

        let scatter = Vec2::new(
            jitter(&mut self.rng, cfg.drop_scatter),
            jitter(&mut self.rng, cfg.drop_scatter),
        );
        self.ball.carrier = None;
        self.ball.pos = self.config.pitch.clamp(target_pos + scatter);
        self.record(MatchEvent::DroppedPass {
            side,
            intended: self.name_of(target),
        });
        self.set_status("Dropped pass!", DEFAULT_STATUS_MS);
        StepOutcome::DroppedPass
    }

    /// Nearest defender inside the tackle radius tries to bring the carrier down
    pub(super) fn resolve_tackle(&mut self) -> Option<StepOutcome> {
        let carrier = self.ball.carrier?;
        let cfg = self.config.tackling;
        let side = self.agents[carrier].side;
        let carrier_pos = self.agents[carrier].pos;

        let tackler = self
            .side_agents(side.opponent())
            .map(|id| (id, self.agents[id].pos.distance(carrier_pos)))
            .filter(|&(_, distance)| distance < cfg.radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)?;

        let chance = tackle_success_chance(self.player(carrier), self.player(tackler), &cfg);
        let tackler_name = self.name_of(tackler);
        let carrier_name = self.name_of(carrier);

        if roll(&mut self.rng, chance) {
            self.set_status(
                format!("Tackle! {tackler_name} stops {carrier_name}!"),
                DEFAULT_STATUS_MS,
            );
            self.record(MatchEvent::Tackle {
                side: side.opponent(),
                tackler: tackler_name,
                carrier: carrier_name,
            });

            let penalty_chance = self.config.penalties.base_chance * cfg.penalty_multiplier;
            if roll(&mut self.rng, penalty_chance) {
                self.award_penalty(side.opponent(), PenaltyReason::AtTackle);
                return Some(StepOutcome::Penalty);
            }

            self.ball.carrier = None;
            self.ball.possession = Some(side.opponent());
            self.ball.pos = carrier_pos;
            self.record(MatchEvent::Turnover {
                side: side.opponent(),
            });
            return Some(StepOutcome::Turnover);
        }

        let tackler_pos = self.agents[tackler].pos;
        let pushed = tackler_pos + (tackler_pos - carrier_pos) * cfg.knockback;
        self.agents[tackler].pos = self.config.pitch.clamp(pushed);
        self.set_status(
            format!("{carrier_name} breaks the tackle from {tackler_name}!"),
            DEFAULT_STATUS_MS,
        );
        self.record(MatchEvent::BrokenTackle {
            side,
            carrier: carrier_name,
            tackler: tackler_name,
        });
        None
    }

    /// Give `side` a penalty at the ball and play it out
    pub(super) fn award_penalty(&mut self, side: Side, reason: PenaltyReason) {
        let team_name = self.team(side).name.clone();
        let reason_text = match reason {
            PenaltyReason::GeneralInfringement => "General infringement".to_string(),
            PenaltyReason::AtTackle => {
                format!("Infringement by {} at tackle", self.team(side.opponent()).name)
            }
        };
        self.set_status(format!("Penalty! {team_name}. ({reason_text})"), PHASE_STATUS_MS);
        self.ball.possession = Some(side);
        self.ball.carrier = None;
        self.record(MatchEvent::Penalty { side, reason });

        let Some(kicker) = self.best_kicker(side) else {
            log::warn!("{team_name} has no players to take the penalty");
            return;
        };

        let pitch = self.config.pitch;
        let cfg = self.config.penalties;
        self.agents[kicker].pos = pitch.clamp(self.ball.pos);
        let kicker_name = self.name_of(kicker);

        let distance = (self.ball.pos.y - pitch.target_line_y(side)).abs();
        if distance < pitch.height() * cfg.kick_range_fraction {
            let chance = penalty_goal_chance(self.player(kicker).kicking(), &cfg);
            if roll(&mut self.rng, chance) {
                self.score.add(side, self.config.points.penalty_goal);
                self.record(MatchEvent::PenaltyGoal {
                    side,
                    kicker: kicker_name,
                });
                self.set_status("Penalty goal successful!", PHASE_STATUS_MS);
                self.restart_at_midfield(side.opponent());
            } else {
                self.record(MatchEvent::PenaltyMissed {
                    side,
                    kicker: kicker_name,
                });
                self.set_status("Penalty kick missed.", PHASE_STATUS_MS);
                let defending = side.opponent();
                self.ball.pos = Vec2::new(pitch.center().x, pitch.twenty_two_y(defending));
                self.reset_possession(defending);
            }
        } else {
            self.record(MatchEvent::KickToTouch {
                side,
                kicker: kicker_name,
            });
            self.set_status("Penalty kicked for touch.", PHASE_STATUS_MS);
            let gain = pitch.height() * cfg.touch_gain_fraction;
            let gained = self.ball.pos.y + side.attack_dir() * gain;
            self.ball.pos.y = gained.clamp(
                pitch.top() + pitch.line_buffer,
                pitch.bottom() - pitch.line_buffer,
            );
            self.reset_possession(side);
        }
    }

    /// Award a try if the carrier has crossed the line, then convert and restart
    pub(super) fn check_scoring(&mut self) -> bool {
        let Some(carrier) = self.ball.carrier else {
            return false;
        };
        let side = self.agents[carrier].side;
        if !self.config.pitch.is_over_try_line(side, self.agents[carrier].pos) {
            return false;
        }

        let team_name = self.team(side).name.clone();
        self.score.add(side, self.config.points.try_points);
        self.record(MatchEvent::Try {
            side,
            scorer: self.name_of(carrier),
        });
        self.set_status(format!("TRY! {team_name}!"), PHASE_STATUS_MS);
        self.ball.carrier = None;

        if let Some(kicker) = self.best_kicker(side) {
            let chance = conversion_chance(self.player(kicker).kicking(), &self.config.penalties);
            let success = roll(&mut self.rng, chance);
            if success {
                self.score.add(side, self.config.points.conversion);
                self.set_status("Conversion successful!", PHASE_STATUS_MS);
            } else {
                self.set_status("Conversion missed.", PHASE_STATUS_MS);
            }
            self.record(MatchEvent::Conversion {
                side,
                kicker: self.name_of(kicker),
                success,
            });
        }

        self.restart_at_midfield(side.opponent());
        true
    }

    pub(super) fn restart_at_midfield(&mut self, side: Side) {
        log::info!(
            "Restart at midfield, {} in possession ({})",
            self.team(side).name,
            self.score
        );
        self.ball.pos = self.config.pitch.center();
        self.record(MatchEvent::Restart { side });
        self.reset_possession(side);
    }

    /// Nearest player of `side` to the ball takes it
    pub(super) fn reset_possession(&mut self, side: Side) {
        self.ball.possession = Some(side);
        self.ball.carrier = None;
        let team_name = self.team(side).name.clone();
        match self.nearest_in(self.side_agents(side), self.ball.pos) {
            Some(id) => self.give_ball(id),
            None => {
                log::warn!("{team_name} has no players to restart with");
                return;
            }
        }
        if self.status.is_none() {
            self.set_status(format!("{team_name} possession."), DEFAULT_STATUS_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::roster::{Attributes, Player, Position, Team};
    use crate::settings::MatchConfig;

    fn uniform_team(name: &str, value: u8) -> Team {
        let players = Position::MVP_SQUAD
            .iter()
            .enumerate()
            .map(|(i, &pos)| Player::new(format!("{name} {i}"), pos, Attributes::uniform(value)))
            .collect();
        Team::new(name, players)
    }

    fn state(home: Team, away: Team, seed: u64) -> MatchState {
        MatchState::new(Arc::new(home), Arc::new(away), MatchConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_penalty_in_range_converts_three_in_four() {
        let mut state = state(uniform_team("H", 60), uniform_team("A", 60), 8);
        let trials = 2000;
        let mut goals = 0;
        for _ in 0..trials {
            state.ball.pos = Vec2::new(400.0, 450.0);
            state.award_penalty(Side::Home, PenaltyReason::GeneralInfringement);
            goals += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e.event, MatchEvent::PenaltyGoal { .. }))
                .count();
        }
        assert_eq!(state.score.home, goals as u32 * 3);
        let rate = goals as f32 / trials as f32;
        assert!((rate - 0.75).abs() < 0.04, "goal rate {rate}");
    }

    #[test]
    fn test_missed_penalty_restarts_at_defending_22() {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), 3);
        state.config.penalties.kick_min = 0.0;
        state.config.penalties.kick_max = 0.0;
        state.ball.pos = Vec2::new(300.0, 480.0);
        state.award_penalty(Side::Home, PenaltyReason::GeneralInfringement);

        assert_eq!(state.score.home, 0);
        assert_eq!(state.ball.pos, Vec2::new(400.0, 410.0));
        assert_eq!(state.ball.possession, Some(Side::Away));
        let carrier = state.ball.carrier.unwrap();
        assert_eq!(state.agents[carrier].side, Side::Away);
    }

    #[test]
    fn test_long_penalty_goes_to_touch() {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), 4);
        state.ball.pos = Vec2::new(400.0, 150.0);
        state.award_penalty(Side::Home, PenaltyReason::AtTackle);

        // 150 + 0.3 * 440
        assert!((state.ball.pos.y - 282.0).abs() < 1e-3);
        assert_eq!(state.ball.possession, Some(Side::Home));
        assert!(state.possession_consistent());
        assert!(state.events().iter().any(|e| matches!(e.event, MatchEvent::KickToTouch { .. })));
        assert_eq!(state.score, Default::default());
    }

    #[test]
    fn test_touch_kick_stays_off_the_line() {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), 4);
        state.ball.pos = Vec2::new(400.0, 500.0);
        state.award_penalty(Side::Away, PenaltyReason::GeneralInfringement);
        // Away attack the top line, 500 is out of range
        assert!((state.ball.pos.y - 368.0).abs() < 1e-3);

        state.ball.pos = Vec2::new(400.0, 150.0);
        state.config.penalties.kick_range_fraction = 0.0;
        state.award_penalty(Side::Away, PenaltyReason::GeneralInfringement);
        assert_eq!(state.ball.pos.y, 90.0);
    }

    #[test]
    fn test_penalty_for_empty_side_is_a_no_op() {
        let mut state = state(Team::new("Empty", Vec::new()), Team::balanced("A"), 5);
        state.award_penalty(Side::Home, PenaltyReason::GeneralInfringement);
        assert_eq!(state.ball.possession, Some(Side::Home));
        assert_eq!(state.ball.carrier, None);
        assert_eq!(state.score, Default::default());
    }

    #[test]
    fn test_try_awards_points_and_restarts() {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), 6);
        state.reset_possession(Side::Home);
        let carrier = state.ball.carrier.unwrap();
        state.agents[carrier].pos = Vec2::new(400.0, 516.0);

        assert!(state.check_scoring());
        assert!(state.score.home == 5 || state.score.home == 7);
        assert_eq!(state.score.away, 0);
        assert_eq!(state.ball.possession, Some(Side::Away));
        assert_eq!(state.ball.pos, Vec2::new(400.0, 300.0));
        assert!(state.possession_consistent());
        assert!(state.events().iter().any(|e| matches!(e.event, MatchEvent::Conversion { .. })));
    }

    #[test]
    fn test_pass_target_respects_y_tolerance() {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), 7);
        let home = state.side_agents(Side::Home);
        for id in home.clone() {
            state.agents[id].pos = Vec2::new(100.0 + id as f32 * 200.0, 100.0);
        }
        state.agents[0].pos = Vec2::new(400.0, 300.0);
        // Toward the away line and within range
        state.agents[1].pos = Vec2::new(420.0, 320.0);
        // Too far, and behind the tolerance
        state.agents[2].pos = Vec2::new(400.0, 190.0);
        // Level within tolerance
        state.agents[3].pos = Vec2::new(450.0, 296.0);
        assert_eq!(state.find_pass_target(0), Some(1));

        state.agents[1].pos = Vec2::new(420.0, 200.0);
        assert_eq!(state.find_pass_target(0), Some(3));

        state.agents[3].pos = Vec2::new(450.0, 200.0);
        assert_eq!(state.find_pass_target(0), None);
    }

    /// Park everyone away from the action, then put home 0 on the ball at (400, 300)
    /// with home 1 as the only receiver in range
    fn open_play(seed: u64) -> MatchState {
        let mut state = state(Team::balanced("H"), Team::balanced("A"), seed);
        for id in 0..state.agents.len() {
            let y = match state.agents[id].side {
                Side::Home => 100.0,
                Side::Away => 500.0,
            };
            state.agents[id].pos = Vec2::new(110.0 + (id % 15) as f32 * 40.0, y);
        }
        state.agents[0].pos = Vec2::new(400.0, 300.0);
        state.agents[1].pos = Vec2::new(420.0, 320.0);
        state.ball.pos = state.agents[0].pos;
        state.give_ball(0);
        state.drain_events();
        state
    }

    fn kinds(state: &MatchState) -> Vec<&MatchEvent> {
        state.events().iter().map(|e| &e.event).collect()
    }

    #[test]
    fn test_completed_pass_moves_ball_to_receiver() {
        let mut state = open_play(10);
        state.config.passing.success_min = 1.0;
        state.config.passing.success_max = 1.0;

        assert_eq!(state.find_pass_target(0), Some(1));
        assert_eq!(state.execute_pass(0, 1), StepOutcome::Pass);
        assert_eq!(state.ball.carrier, Some(1));
        assert_eq!(state.ball.possession, Some(Side::Home));
        assert_eq!(state.ball.pos, Vec2::new(420.0, 320.0));
        assert!(matches!(kinds(&state)[..], [MatchEvent::Pass { side: Side::Home, .. }]));
    }

    #[test]
    fn test_interception_hands_ball_to_defender() {
        let mut state = open_play(11);
        state.config.passing.success_min = 0.0;
        state.config.passing.success_max = 0.0;
        state.config.passing.interception_chance = 1.0;
        let defender = state.side_agents(Side::Away).start + 2;
        state.agents[defender].pos = Vec2::new(430.0, 330.0);

        assert_eq!(state.execute_pass(0, 1), StepOutcome::Interception);
        assert_eq!(state.ball.carrier, Some(defender));
        assert_eq!(state.ball.possession, Some(Side::Away));
        assert_eq!(state.ball.pos, Vec2::new(430.0, 330.0));
        assert!(state.possession_consistent());
        assert!(matches!(
            kinds(&state)[..],
            [MatchEvent::Interception { side: Side::Away, .. }]
        ));
    }

    #[test]
    fn test_first_defender_in_roster_order_intercepts() {
        let mut state = open_play(12);
        state.config.passing.success_min = 0.0;
        state.config.passing.success_max = 0.0;
        state.config.passing.interception_chance = 1.0;
        let first = state.side_agents(Side::Away).start + 1;
        // Closer to the receiver but later in the roster
        state.agents[first + 5].pos = Vec2::new(421.0, 321.0);
        state.agents[first].pos = Vec2::new(440.0, 340.0);

        assert_eq!(state.execute_pass(0, 1), StepOutcome::Interception);
        assert_eq!(state.ball.carrier, Some(first));
    }

    #[test]
    fn test_dropped_pass_scatters_then_nearest_picks_up() {
        let mut state = open_play(13);
        state.config.passing.success_min = 0.0;
        state.config.passing.success_max = 0.0;
        state.config.passing.interception_chance = 0.0;
        let scatter = state.config.passing.drop_scatter;

        assert_eq!(state.execute_pass(0, 1), StepOutcome::DroppedPass);
        assert_eq!(state.ball.carrier, None);
        assert_eq!(state.ball.possession, Some(Side::Home));
        let offset = state.ball.pos - Vec2::new(420.0, 320.0);
        assert!(offset.x.abs() <= scatter && offset.y.abs() <= scatter, "{offset:?}");

        assert!(state.pick_up_loose_ball());
        assert_eq!(state.ball.carrier, Some(1));
        assert!(state.possession_consistent());
        assert!(matches!(
            kinds(&state)[..],
            [MatchEvent::DroppedPass { .. }, MatchEvent::LooseBallPickup { side: Side::Home, .. }]
        ));
    }

    #[test]
    fn test_tackle_infringement_awards_penalty_before_turnover() {
        let mut state = open_play(14);
        state.config.tackling.success_min = 1.0;
        state.config.tackling.success_max = 1.0;
        // 0.4 * 2.5 makes the infringement certain
        state.config.penalties.base_chance = 0.4;
        let tackler = state.side_agents(Side::Away).start;
        state.agents[tackler].pos = Vec2::new(405.0, 300.0);

        assert_eq!(state.resolve_tackle(), Some(StepOutcome::Penalty));
        // 220 from the away target line is out of kicking range
        assert!(matches!(
            kinds(&state)[..],
            [
                MatchEvent::Tackle { side: Side::Away, .. },
                MatchEvent::Penalty {
                    side: Side::Away,
                    reason: PenaltyReason::AtTackle,
                },
                MatchEvent::KickToTouch { side: Side::Away, .. },
            ]
        ));
        assert_eq!(state.ball.possession, Some(Side::Away));
        assert!(state.possession_consistent());
    }

    #[test]
    fn test_clean_tackle_turns_ball_over() {
        let mut state = open_play(15);
        state.config.tackling.success_min = 1.0;
        state.config.tackling.success_max = 1.0;
        state.config.penalties.base_chance = 0.0;
        let tackler = state.side_agents(Side::Away).start;
        state.agents[tackler].pos = Vec2::new(405.0, 300.0);

        assert_eq!(state.resolve_tackle(), Some(StepOutcome::Turnover));
        assert_eq!(state.ball.carrier, None);
        assert_eq!(state.ball.possession, Some(Side::Away));
        assert_eq!(state.ball.pos, Vec2::new(400.0, 300.0));
        assert!(matches!(
            kinds(&state)[..],
            [MatchEvent::Tackle { .. }, MatchEvent::Turnover { side: Side::Away }]
        ));
    }

    #[test]
    fn test_broken_tackle_pushes_tackler_away() {
        let mut state = open_play(16);
        state.config.tackling.success_min = 0.0;
        state.config.tackling.success_max = 0.0;
        let tackler = state.side_agents(Side::Away).start;
        state.agents[tackler].pos = Vec2::new(405.0, 300.0);

        assert_eq!(state.resolve_tackle(), None);
        // 405 + 5 * 0.3
        assert!(state.agents[tackler].pos.abs_diff_eq(Vec2::new(406.5, 300.0), 1e-4));
        assert_eq!(state.ball.carrier, Some(0));
        assert!(matches!(
            kinds(&state)[..],
            [MatchEvent::BrokenTackle { side: Side::Home, .. }]
        ));
    }

    #[test]
    fn test_no_tackle_outside_radius() {
        let mut state = open_play(17);
        let tackler = state.side_agents(Side::Away).start;
        state.agents[tackler].pos = Vec2::new(400.0, 300.0 + state.config.tackling.radius);
        assert_eq!(state.resolve_tackle(), None);
        assert!(state.events().is_empty());
    }
}
