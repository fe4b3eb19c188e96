use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// A player. `Home` defends the goal at x = 0, `Away` the goal at x = length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// (-1)^player, used to mirror axes for the away side
    pub fn sign(self) -> f64 {
        match self {
            Side::Home => 1.0,
            Side::Away => -1.0,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Side::Home),
            1 => Ok(Side::Away),
            other => Err(SimError::InvalidSide(other)),
        }
    }
}

/// Match score, carried across episodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Home => self.home += 1,
            Side::Away => self.away += 1,
        }
    }
}

/// Ball position and velocity in table coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: DVec2, // x in [0, length], y in [0, 1]
    pub velocity: DVec2,
}

/// Semantic state of one rod
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodState {
    pub offset: f64, // Nominally [0, 1]
    pub offset_velocity: f64,
    pub angle: f64, // [-1, 1] maps to [-90deg, 90deg]
    pub angle_velocity: f64,
}

impl RodState {
    /// Centered, upright and still
    pub const REST: RodState = RodState {
        offset: 0.5,
        offset_velocity: 0.0,
        angle: 0.0,
        angle_velocity: 0.0,
    };
}

impl Default for RodState {
    fn default() -> Self {
        Self::REST
    }
}

/// Complete semantic game state, aligned 1:1 with the table's rods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: Score,
    pub ball: BallState,
    pub rods: Vec<RodState>,
}

impl GameState {
    pub fn new(score: Score, ball: BallState, rods: Vec<RodState>) -> Self {
        Self { score, ball, rods }
    }

    /// Set a rod's commanded velocities
    pub fn apply_command(&mut self, rod: usize, offset_velocity: f64, angle_velocity: f64) {
        if let Some(state) = self.rods.get_mut(rod) {
            state.offset_velocity = offset_velocity;
            state.angle_velocity = angle_velocity;
        }
    }
}
