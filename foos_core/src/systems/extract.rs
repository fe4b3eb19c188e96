use hecs::World;

use crate::components::{BallBody, Body, RodBody};
use crate::state::GameState;
use crate::table::TableModel;

/// Refresh the semantic state from the physical bodies.
///
/// Angle velocity is a finite difference over the body's x velocity rather
/// than a raw rate, so it stays consistent with the angle clamp.
pub fn extract_state(world: &World, table: &TableModel, state: &mut GameState) {
    if let Some((_e, (_ball, body))) = world.query::<(&BallBody, &Body)>().iter().next() {
        state.ball.position = body.pos;
        state.ball.velocity = body.vel;
    }

    for (_e, (rod_body, body)) in world.query::<(&RodBody, &Body)>().iter() {
        let idx = rod_body.index;
        let Some(rod) = state.rods.get_mut(idx) else {
            continue;
        };
        let angle = table.rod_angle(idx, body.pos.x);
        let last_angle = table.rod_angle(idx, body.pos.x - body.vel.x);

        rod.offset = table.rod_offset(idx, body.pos.y);
        rod.offset_velocity = body.vel.y;
        rod.angle = angle;
        rod.angle_velocity = angle - last_angle;
    }
}
