//! Flat per-player observation vectors.
//!
//! Each player sees the table from its own end: for `Side::Away` the ball
//! and every rod are mirrored so that both players attack toward +x and read
//! their own rods first.

use crate::state::{GameState, Side};
use crate::table::TableModel;

const BALL_FIELDS: usize = 4;
const ROD_FIELDS: usize = 7;

/// Number of values `observe` produces for `table`
pub fn observation_len(table: &TableModel) -> usize {
    BALL_FIELDS + ROD_FIELDS * table.rods().len()
}

/// Ball position and velocity, then per rod: offset, offset velocity, angle,
/// angle velocity, rod x, foosman count and spacing.
pub fn observe(table: &TableModel, state: &GameState, side: Side) -> Vec<f32> {
    let mut out = Vec::with_capacity(observation_len(table));
    let length = table.length();
    let ball = &state.ball;

    match side {
        Side::Home => out.extend([
            ball.position.x,
            ball.position.y,
            ball.velocity.x,
            ball.velocity.y,
        ]),
        Side::Away => out.extend([
            length - ball.position.x,
            1.0 - ball.position.y,
            -ball.velocity.x,
            -ball.velocity.y,
        ]),
    }

    let order: Box<dyn Iterator<Item = usize>> = match side {
        Side::Home => Box::new(0..table.rods().len()),
        Side::Away => Box::new((0..table.rods().len()).rev()),
    };

    for idx in order {
        let spec = table.rod(idx);
        let rod = state.rods.get(idx).copied().unwrap_or_default();
        let count = spec.foosman_count as f64;
        match side {
            Side::Home => out.extend([
                rod.offset,
                rod.offset_velocity,
                rod.angle,
                rod.angle_velocity,
                spec.base_x,
                count,
                spec.spacing,
            ]),
            Side::Away => out.extend([
                1.0 - rod.offset,
                -rod.offset_velocity,
                -rod.angle,
                -rod.angle_velocity,
                length - spec.base_x,
                count,
                spec.spacing,
            ]),
        }
    }

    out.into_iter().map(|v| v as f32).collect()
}
