//! Pitch geometry
//!
//! Screen-style coordinates: origin at the top-left corner, Y grows toward
//! the bottom (away) try line. Home defends the top line.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::roster::Side;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pitch {
    /// Top-left corner
    pub origin: Vec2,
    /// Width (x) and length (y)
    pub size: Vec2,
    /// How far outside the rectangle agents may stray
    pub margin: f32,
    /// A carrier this close to the far boundary has scored
    pub try_line_offset: f32,
    /// Keeps defensive lines and touch kicks off the boundary itself
    pub line_buffer: f32,
    /// Depth of the 22 metre line as a fraction of pitch length
    pub twenty_two_fraction: f32,
}

impl Default for Pitch {
    fn default() -> Self {
        Self {
            origin: Vec2::new(PITCH_LEFT, PITCH_TOP),
            size: Vec2::new(PITCH_WIDTH, PITCH_HEIGHT),
            margin: PITCH_MARGIN,
            try_line_offset: 5.0,
            line_buffer: 10.0,
            twenty_two_fraction: 0.25,
        }
    }
}

impl Pitch {
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Clamp a position to the pitch expanded by the margin
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        let min = self.origin - Vec2::splat(self.margin);
        let max = self.origin + self.size + Vec2::splat(self.margin);
        pos.clamp(min, max)
    }

    /// Whether a position lies inside the pitch expanded by the margin
    pub fn contains(&self, pos: Vec2) -> bool {
        let min = self.origin - Vec2::splat(self.margin);
        let max = self.origin + self.size + Vec2::splat(self.margin);
        pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
    }

    /// Boundary this side is trying to reach
    pub fn target_line_y(&self, side: Side) -> f32 {
        match side {
            Side::Home => self.bottom(),
            Side::Away => self.top(),
        }
    }

    /// Boundary this side defends
    pub fn own_line_y(&self, side: Side) -> f32 {
        self.target_line_y(side.opponent())
    }

    /// Whether a carrier of `side` at `pos` has grounded the ball
    pub fn is_over_try_line(&self, side: Side, pos: Vec2) -> bool {
        match side {
            Side::Home => pos.y >= self.bottom() - self.try_line_offset,
            Side::Away => pos.y <= self.top() + self.try_line_offset,
        }
    }

    /// Y of the 22 in front of the line `side` defends
    pub fn twenty_two_y(&self, side: Side) -> f32 {
        let depth = self.height() * self.twenty_two_fraction;
        match side {
            Side::Home => self.top() + depth,
            Side::Away => self.bottom() - depth,
        }
    }
}
