use glam::DVec2;
use hecs::World;

use crate::components::{Body, RodBody};
use crate::state::RodState;
use crate::table::TableModel;

/// Velocity that carries a rod body toward its commanded state in one step.
///
/// The lateral component is whatever moves the body to the x position of the
/// angle expected after `dt`. The offset component follows the command but is
/// cut to zero once the body is past a travel stop and still pushing outward,
/// and is always zero for a rod without travel.
pub fn rod_velocity(
    table: &TableModel,
    idx: usize,
    rod: &RodState,
    body_pos: DVec2,
    dt: f64,
) -> DVec2 {
    if dt <= 0.0 {
        return DVec2::ZERO;
    }

    let target_x = table.rod_x(idx, rod.angle + rod.angle_velocity * dt);
    let vx = (target_x - body_pos.x) / dt;

    let offset = table.rod_offset(idx, body_pos.y);
    let vy = if table.max_offset(idx) <= 0.0 {
        0.0
    } else if (offset < 0.0 && rod.offset_velocity < 0.0)
        || (offset > 1.0 && rod.offset_velocity > 0.0)
    {
        0.0
    } else {
        rod.offset_velocity
    };

    DVec2::new(vx, vy)
}

/// Set every rod body's velocity from the semantic rod state
pub fn drive_rods(world: &mut World, table: &TableModel, rods: &[RodState], dt: f64) {
    for (_entity, (rod_body, body)) in world.query_mut::<(&RodBody, &mut Body)>() {
        if let Some(rod) = rods.get(rod_body.index) {
            body.vel = rod_velocity(table, rod_body.index, rod, body.pos, dt);
        }
    }
}
