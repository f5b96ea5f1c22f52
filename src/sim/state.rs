//! Match state and core simulation types
//!
//! Everything one match owns lives here: agents, ball, clock, score and the
//! seeded RNG. Rosters are shared read-only.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::formation;
use crate::error::Result;
use crate::ratings::{TeamRatings, aggregate_ratings_with};
use crate::roster::{Player, Side, Team};
use crate::settings::MatchConfig;

/// Index into the match's agent list
pub type AgentId = usize;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Lined up, nobody has moved yet
    Kickoff,
    /// Active play
    InPlay,
    /// Step budget spent or skipped
    Finished,
}

/// Completion handshake with the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    Pending,
    /// Finished, final score not yet collected
    AwaitingAck(Score),
    /// Final score collected; nothing more will be delivered
    Acknowledged(Score),
}

/// Running score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn add(&mut self, side: Side, points: u32) {
        match side {
            Side::Home => self.home += points,
            Side::Away => self.away += points,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.home, self.away)
    }
}

/// Step counter and the game clock shown to viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub step: u32,
    pub total_steps: u32,
    pub game_minutes: u32,
}

impl Clock {
    /// Displayed minute, truncated
    pub fn minute(&self) -> u32 {
        if self.step >= self.total_steps {
            return self.game_minutes;
        }
        (self.step as u64 * self.game_minutes as u64 / self.total_steps as u64) as u32
    }

    pub fn is_expired(&self) -> bool {
        self.step >= self.total_steps
    }
}

/// One player on the pitch for the duration of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchAgent {
    pub side: Side,
    /// Index into the side's roster
    pub player: usize,
    pub pos: Vec2,
    pub target: Vec2,
}

impl MatchAgent {
    pub fn new(side: Side, player: usize, pos: Vec2) -> Self {
        Self {
            side,
            player,
            pos,
            target: pos,
        }
    }

    /// Move up to `speed` toward the target, snapping when close enough
    pub fn move_toward_target(&mut self, speed: f32, pitch: &super::Pitch) {
        let delta = self.target - self.pos;
        let distance = delta.length();
        if distance < speed {
            self.pos = self.target;
        } else if distance > 0.0 {
            self.pos += delta / distance * speed;
        }
        self.pos = pitch.clamp(self.pos);
    }
}

/// Ball position and who has it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub pos: Vec2,
    pub carrier: Option<AgentId>,
    pub possession: Option<Side>,
}

/// Why a penalty was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyReason {
    GeneralInfringement,
    /// Offence by the tackled side at the breakdown
    AtTackle,
}

/// Discrete events, in the order they resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    Kickoff {
        side: Side,
        receiver: Option<String>,
    },
    LooseBallPickup { side: Side, player: String },
    Pass {
        side: Side,
        from: String,
        to: String,
    },
    Interception { side: Side, player: String },
    DroppedPass { side: Side, intended: String },
    /// `side` is the tackling side
    Tackle {
        side: Side,
        tackler: String,
        carrier: String,
    },
    Turnover { side: Side },
    BrokenTackle {
        side: Side,
        carrier: String,
        tackler: String,
    },
    Penalty { side: Side, reason: PenaltyReason },
    PenaltyGoal { side: Side, kicker: String },
    PenaltyMissed { side: Side, kicker: String },
    KickToTouch { side: Side, kicker: String },
    Try { side: Side, scorer: String },
    Conversion {
        side: Side,
        kicker: String,
        success: bool,
    },
    Restart { side: Side },
    FullTime { score: Score },
    Skipped { score: Score },
}

/// An event stamped with the step it resolved on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub step: u32,
    pub event: MatchEvent,
}

/// Message for viewers. Never read by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at_step: u32,
}

/// What a single call to `step` resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Movement only
    Quiet,
    Pass,
    Interception,
    DroppedPass,
    /// Tackle won the ball back
    Turnover,
    Penalty,
    Try,
    /// Match already over; nothing happened
    Finished,
}

/// Called once with the final score when completion is acknowledged
pub type FinishCallback = Box<dyn FnOnce(Score) + Send>;

/// Complete state of one match
pub struct MatchState {
    pub(super) seed: u64,
    pub(super) config: MatchConfig,
    pub(super) home: Arc<Team>,
    pub(super) away: Arc<Team>,
    pub(super) home_ratings: TeamRatings,
    pub(super) away_ratings: TeamRatings,
    /// Home agents first, then away, each in roster order
    pub(super) agents: Vec<MatchAgent>,
    pub(super) ball: BallState,
    pub(super) clock: Clock,
    pub(super) score: Score,
    pub(super) phase: MatchPhase,
    pub(super) completion: Completion,
    pub(super) skipped: bool,
    pub(super) status: Option<StatusMessage>,
    pub(super) events: Vec<EventRecord>,
    pub(super) rng: Pcg32,
    pub(super) on_finish: Option<FinishCallback>,
}

impl fmt::Debug for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchState")
            .field("seed", &self.seed)
            .field("home", &self.home.name)
            .field("away", &self.away.name)
            .field("clock", &self.clock)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("ball", &self.ball)
            .finish_non_exhaustive()
    }
}

impl MatchState {
    /// Line both teams up and kick off. Fails only on an invalid config.
    pub fn new(home: Arc<Team>, away: Arc<Team>, config: MatchConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let agents = formation::line_up(&home, &away, &config.pitch, &config.formation, &mut rng);
        let home_ratings = aggregate_ratings_with(&home, &config.ratings);
        let away_ratings = aggregate_ratings_with(&away, &config.ratings);
        let clock = Clock {
            step: 0,
            total_steps: config.clock.total_steps,
            game_minutes: config.clock.game_minutes,
        };

        let mut state = Self {
            seed,
            ball: BallState {
                pos: config.pitch.center(),
                carrier: None,
                possession: None,
            },
            config,
            home,
            away,
            home_ratings,
            away_ratings,
            agents,
            clock,
            score: Score::default(),
            phase: MatchPhase::Kickoff,
            completion: Completion::Pending,
            skipped: false,
            status: None,
            events: Vec::new(),
            rng,
            on_finish: None,
        };

        log::info!(
            "Starting match: {} vs {} ({} steps, {} minutes, seed {})",
            state.home.name,
            state.away.name,
            state.clock.total_steps,
            state.clock.game_minutes,
            seed
        );
        state.kickoff();

        Ok(state)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn ratings(&self, side: Side) -> TeamRatings {
        match side {
            Side::Home => self.home_ratings,
            Side::Away => self.away_ratings,
        }
    }

    pub fn agents(&self) -> &[MatchAgent] {
        &self.agents
    }

    pub fn ball(&self) -> &BallState {
        &self.ball
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn completion(&self) -> Completion {
        self.completion
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    /// Player behind an agent
    pub fn player(&self, id: AgentId) -> &Player {
        let agent = &self.agents[id];
        &self.team(agent.side).players[agent.player]
    }

    /// Agent ids belonging to one side
    pub fn side_agents(&self, side: Side) -> Range<AgentId> {
        let home_len = self.home.players.len();
        match side {
            Side::Home => 0..home_len,
            Side::Away => home_len..self.agents.len(),
        }
    }

    /// Carrier's side must match possession whenever someone has the ball
    pub fn possession_consistent(&self) -> bool {
        match self.ball.carrier {
            Some(id) => self.ball.possession == Some(self.agents[id].side),
            None => true,
        }
    }

    pub(super) fn name_of(&self, id: AgentId) -> String {
        self.player(id).name.clone()
    }

    pub(super) fn record(&mut self, event: MatchEvent) {
        log::debug!("[step {}] {:?}", self.clock.step, event);
        self.events.push(EventRecord {
            step: self.clock.step,
            event,
        });
    }

    pub(super) fn set_status(&mut self, text: impl Into<String>, duration_ms: u64) {
        let steps = self.config.clock.steps_for_ms(duration_ms);
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at_step: self.clock.step.saturating_add(steps),
        });
    }

    pub(super) fn expire_status(&mut self) {
        let step = self.clock.step;
        if self.status.as_ref().is_some_and(|s| step >= s.expires_at_step) {
            self.status = None;
        }
    }

    /// Give the ball to `id`, keeping possession in step with the carrier.
    /// The ball itself catches up with the carrier on the next step.
    pub(super) fn give_ball(&mut self, id: AgentId) {
        self.ball.carrier = Some(id);
        self.ball.possession = Some(self.agents[id].side);
    }

    /// Nearest agent to a point among `ids` (first wins ties)
    pub(super) fn nearest_in(&self, ids: Range<AgentId>, point: Vec2) -> Option<AgentId> {
        ids.min_by(|&a, &b| {
            let da = self.agents[a].pos.distance(point);
            let db = self.agents[b].pos.distance(point);
            da.total_cmp(&db)
        })
    }

    /// Highest kicking attribute on a side (first wins ties)
    pub(super) fn best_kicker(&self, side: Side) -> Option<AgentId> {
        self.side_agents(side)
            .min_by_key(|&id| std::cmp::Reverse(self.player(id).kicking()))
    }

    /// Register a callback fired once when completion is acknowledged
    pub fn on_finish(&mut self, callback: impl FnOnce(Score) + Send + 'static) {
        self.on_finish = Some(Box::new(callback));
    }
}
