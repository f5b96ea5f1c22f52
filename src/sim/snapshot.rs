//! Read-only view of a match for presentation layers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{AgentId, MatchPhase, MatchState, Score};
use crate::roster::{Position, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub side: Side,
    pub name: String,
    pub position: Position,
    pub pos: Vec2,
    pub target: Vec2,
    pub has_ball: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub step: u32,
    pub total_steps: u32,
    pub minute: u32,
    pub phase: MatchPhase,
    pub home_team: String,
    pub away_team: String,
    pub score: Score,
    pub possession: Option<Side>,
    pub ball: Vec2,
    pub carrier: Option<AgentId>,
    pub agents: Vec<AgentView>,
    /// Current viewer message, if one has not expired
    pub status: Option<String>,
}

impl MatchState {
    pub fn snapshot(&self) -> MatchSnapshot {
        let clock = self.clock();
        let ball = self.ball();
        let agents = self
            .agents()
            .iter()
            .enumerate()
            .map(|(id, agent)| {
                let player = self.player(id);
                AgentView {
                    id,
                    side: agent.side,
                    name: player.name.clone(),
                    position: player.position,
                    pos: agent.pos,
                    target: agent.target,
                    has_ball: ball.carrier == Some(id),
                }
            })
            .collect();

        MatchSnapshot {
            step: clock.step,
            total_steps: clock.total_steps,
            minute: clock.minute(),
            phase: self.phase(),
            home_team: self.team(Side::Home).name.clone(),
            away_team: self.team(Side::Away).name.clone(),
            score: self.score(),
            possession: ball.possession,
            ball: ball.pos,
            carrier: ball.carrier,
            agents,
            status: self.status().map(|s| s.text.clone()),
        }
    }
}

impl MatchSnapshot {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
