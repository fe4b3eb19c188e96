use serde::{Deserialize, Serialize};

use crate::params::Params;
use crate::state::{GameState, Side};
use crate::table::TableModel;

/// Per-player training signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub reward: f64,
    pub penalty: f64,
}

impl Reward {
    pub fn new(reward: f64, penalty: f64) -> Self {
        Self { reward, penalty }
    }

    pub fn total(&self) -> f64 {
        self.reward + self.penalty
    }
}

/// Condition that ends an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// Ball entered `conceded`'s goal; the opponent scores
    Goal { conceded: Side },
    OutOfBounds,
}

impl Terminal {
    pub fn scorer(&self) -> Option<Side> {
        match self {
            Terminal::Goal { conceded } => Some(conceded.opponent()),
            Terminal::OutOfBounds => None,
        }
    }
}

/// Terminal condition for the current ball position, goals first
pub fn terminal(table: &TableModel, state: &GameState) -> Option<Terminal> {
    let position = state.ball.position;
    if let Some(conceded) = table.goal_side(position) {
        Some(Terminal::Goal { conceded })
    } else if !table.ball_in_bounds(position) {
        Some(Terminal::OutOfBounds)
    } else {
        None
    }
}

/// Reward and penalty for `player` in the current state.
///
/// Goals short-circuit everything else. Otherwise the reward grows as the
/// ball nears the opponent's goal; while the ball is in the player's own half
/// it is signed by whether the ball travels away from the player's goal. The
/// penalty punishes a slow or stopped ball and a ball off the table. The
/// distance to the opponent's goal is floored at one ball radius so the
/// reward stays finite on and past the goal line.
pub fn evaluate(table: &TableModel, state: &GameState, player: Side) -> Reward {
    let ball = &state.ball;

    match table.goal_side(ball.position) {
        Some(side) if side == player.opponent() => {
            return Reward::new(Params::GOAL_REWARD, 0.0);
        }
        Some(_) => {
            return Reward::new(Params::GOAL_AGAINST_PENALTY, Params::GOAL_AGAINST_PENALTY);
        }
        None => {}
    }

    let d_from = (table.player_goal_x(player) - ball.position.x).abs();
    let d_to = (table.length() - d_from).max(table.ball_radius());
    let ratio = d_from / d_to * Params::DISTANCE_REWARD_SCALE;

    let reward = if d_to < d_from {
        ratio
    } else {
        sign(ball.velocity.x) * player.sign() * ratio
    };

    Reward::new(reward, penalty(table, state))
}

fn penalty(table: &TableModel, state: &GameState) -> f64 {
    let speed = state.ball.velocity.length();
    let mut penalty = 0.0;
    if speed < Params::INERT_SPEED {
        penalty += Params::INERT_PENALTY;
    } else if speed < Params::SLUGGISH_SPEED {
        penalty -= (Params::SLUGGISH_SPEED / speed).min(Params::SLUGGISH_PENALTY_CAP);
    }
    if !table.ball_in_bounds(state.ball.position) {
        penalty += Params::OUT_OF_BOUNDS_PENALTY;
    }
    penalty
}

/// Sign with sign(0) == 0, unlike `f64::signum`
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
