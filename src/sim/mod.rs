//! Deterministic match simulation module
//!
//! All stepped gameplay lives here. This module must be pure and deterministic:
//! - Fixed step only, no sleeping inside a step
//! - Seeded RNG only
//! - Stable iteration order (home agents, then away, in roster order)
//! - No rendering or platform dependencies

mod events;
mod formation;
pub mod pitch;
pub mod snapshot;
pub mod state;
mod tick;

pub use pitch::Pitch;
pub use snapshot::{AgentView, MatchSnapshot};
pub use state::{
    AgentId, BallState, Clock, Completion, EventRecord, FinishCallback, MatchAgent, MatchEvent,
    MatchPhase, MatchState, PenaltyReason, Score, StatusMessage, StepOutcome,
};
