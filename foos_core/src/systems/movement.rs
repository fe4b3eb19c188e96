use hecs::World;

use crate::components::{Body, BodyKind};

/// Move every non-static body along its velocity
pub fn integrate(world: &mut World, dt: f64) {
    for (_entity, body) in world.query_mut::<&mut Body>() {
        if body.kind != BodyKind::Static {
            body.prev_pos = body.pos;
            body.pos += body.vel * dt;
        }
    }
}
