//! Fixed step match loop
//!
//! Advances a match one step at a time and handles the two ways out of it:
//! running the clock down or skipping to a statistical result.

use super::formation;
use super::state::{
    Completion, MatchEvent, MatchPhase, MatchState, PenaltyReason, Score, StepOutcome,
};
use crate::odds::agent_speed;
use crate::resolver::resolve_statistical;
use crate::roll;
use crate::roster::Side;

const FINAL_STATUS_MS: u64 = 5000;

impl MatchState {
    /// Advance one step. At most one major event resolves per call.
    pub fn step(&mut self) -> StepOutcome {
        if self.phase == MatchPhase::Finished {
            return StepOutcome::Finished;
        }
        self.expire_status();
        if self.phase == MatchPhase::Kickoff {
            self.phase = MatchPhase::InPlay;
        }

        let outcome = self.resolve_step();
        self.advance_clock();
        outcome
    }

    fn resolve_step(&mut self) -> StepOutcome {
        if self.ball.carrier.is_none() && !self.pick_up_loose_ball() {
            // Nobody on the pitch
            return StepOutcome::Quiet;
        }
        let Some(carrier) = self.ball.carrier else {
            return StepOutcome::Quiet;
        };

        formation::assign_targets(
            &mut self.agents,
            carrier,
            &self.config.pitch,
            &self.config.formation,
            self.config.passing.y_tolerance,
            &mut self.rng,
        );
        self.move_agents();
        self.ball.pos = self.agents[carrier].pos;

        if let Some(outcome) = self.attempt_pass() {
            return outcome;
        }
        if let Some(outcome) = self.resolve_tackle() {
            return outcome;
        }
        if roll(&mut self.rng, self.config.penalties.base_chance) {
            let side = self.agents[carrier].side.opponent();
            self.award_penalty(side, PenaltyReason::GeneralInfringement);
            return StepOutcome::Penalty;
        }
        if self.check_scoring() {
            return StepOutcome::Try;
        }
        StepOutcome::Quiet
    }

    fn move_agents(&mut self) {
        let movement = self.config.movement;
        let pitch = self.config.pitch;
        for agent in &mut self.agents {
            let team = match agent.side {
                Side::Home => &self.home,
                Side::Away => &self.away,
            };
            let speed = agent_speed(&team.players[agent.player], &movement);
            agent.move_toward_target(speed, &pitch);
        }
    }

    fn advance_clock(&mut self) {
        self.clock.step += 1;
        if self.clock.is_expired() {
            self.finish(false);
        }
    }

    fn finish(&mut self, skipped: bool) {
        self.phase = MatchPhase::Finished;
        self.skipped = skipped;
        self.clock.step = self.clock.total_steps;
        self.completion = Completion::AwaitingAck(self.score);

        let score = self.score;
        let text = format!(
            "{}{} {} - {} {}",
            if skipped { "(Skipped) Final Score: " } else { "Full Time! " },
            self.home.name,
            score.home,
            score.away,
            self.away.name
        );
        if skipped {
            self.record(MatchEvent::Skipped { score });
        } else {
            self.record(MatchEvent::FullTime { score });
        }
        log::info!("{text}");
        self.set_status(text, FINAL_STATUS_MS);
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// Whether the result came from a skip rather than the full clock
    pub fn was_skipped(&self) -> bool {
        self.skipped
    }

    pub fn minute(&self) -> u32 {
        self.clock.minute()
    }

    /// End the match now with a statistical result.
    ///
    /// Once finished, returns the existing score and changes nothing.
    pub fn skip(&mut self) -> Score {
        if self.is_finished() {
            log::debug!("Skip ignored, match already finished at {}", self.score);
            return self.score;
        }

        log::info!(
            "Skipping {} vs {} at step {}",
            self.home.name,
            self.away.name,
            self.clock.step
        );
        self.score = resolve_statistical(
            &self.home_ratings,
            &self.away_ratings,
            &self.config.resolver,
            &self.config.points,
            &mut self.rng,
        );
        self.ball.carrier = None;
        self.finish(true);
        self.score
    }

    /// Collect the final score once.
    ///
    /// Fires the finish callback on the first call after the match ends;
    /// every other call returns `None`.
    pub fn acknowledge(&mut self) -> Option<Score> {
        let Completion::AwaitingAck(score) = self.completion else {
            return None;
        };
        self.completion = Completion::Acknowledged(score);
        if let Some(callback) = self.on_finish.take() {
            callback(score);
        }
        Some(score)
    }
}
