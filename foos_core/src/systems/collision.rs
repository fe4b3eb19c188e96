use glam::DVec2;
use hecs::{Entity, World};

use crate::components::{Body, BodyKind, Collider, CollisionFilter, Shape};
use crate::params::Params;

/// Penetration of a circle into a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: DVec2, // Unit vector pointing from the shape toward the circle
    pub depth: f64,
}

/// Contact between a circle and a shape attached to a body at `body_pos`
pub fn circle_contact(center: DVec2, radius: f64, shape: &Shape, body_pos: DVec2) -> Option<Contact> {
    match *shape {
        Shape::Circle { radius: other } => {
            let delta = center - body_pos;
            contact_from_delta(delta, radius + other, DVec2::Y)
        }
        Shape::Rect { .. } => {
            let aabb = shape.world_aabb(body_pos)?;
            if aabb.contains(center) {
                // Center is inside: push out through the nearest face
                let faces = [
                    (center.x - aabb.min.x, DVec2::NEG_X),
                    (aabb.max.x - center.x, DVec2::X),
                    (center.y - aabb.min.y, DVec2::NEG_Y),
                    (aabb.max.y - center.y, DVec2::Y),
                ];
                let (distance, normal) = faces
                    .iter()
                    .copied()
                    .min_by(|a, b| a.0.total_cmp(&b.0))?;
                return Some(Contact {
                    normal,
                    depth: radius + distance,
                });
            }
            let delta = center - aabb.closest_point(center);
            contact_from_delta(delta, radius, DVec2::Y)
        }
        Shape::Segment { a, b, radius: thickness } => {
            let a = body_pos + a;
            let b = body_pos + b;
            let ab = b - a;
            let len_sq = ab.length_squared();
            let t = if len_sq > 0.0 {
                ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + ab * t;
            let fallback = if len_sq > 0.0 {
                ab.perp().normalize()
            } else {
                DVec2::Y
            };
            contact_from_delta(center - closest, radius + thickness, fallback)
        }
    }
}

/// Contact for a circle that moved from `previous` to `center` this step.
///
/// A circle whose center crossed a segment's line inside the segment is
/// pushed back to the side it came from, however far it travelled. Every
/// other case is the plain overlap test.
pub fn swept_contact(
    previous: DVec2,
    center: DVec2,
    radius: f64,
    shape: &Shape,
    body_pos: DVec2,
) -> Option<Contact> {
    if let Shape::Segment { a, b, radius: thickness } = *shape {
        let a = body_pos + a;
        let ab = body_pos + b - a;
        let len_sq = ab.length_squared();
        if len_sq > 0.0 {
            let n = ab.perp() / len_sq.sqrt();
            let d_prev = (previous - a).dot(n);
            let d_now = (center - a).dot(n);
            if d_prev != 0.0 && d_prev * d_now <= 0.0 {
                let hit = previous + (center - previous) * (d_prev / (d_prev - d_now));
                let t = (hit - a).dot(ab) / len_sq;
                if (0.0..=1.0).contains(&t) {
                    return Some(Contact {
                        normal: n * d_prev.signum(),
                        depth: radius + thickness + d_now.abs(),
                    });
                }
            }
        }
    }
    circle_contact(center, radius, shape, body_pos)
}

fn contact_from_delta(delta: DVec2, reach: f64, fallback: DVec2) -> Option<Contact> {
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 { delta / dist } else { fallback };
    Some(Contact {
        normal,
        depth: reach - dist,
    })
}

/// Obstacle shape snapshot used while solving
#[derive(Debug, Clone, Copy)]
struct Obstacle {
    pos: DVec2,
    vel: DVec2,
    shape: Shape,
    filter: CollisionFilter,
    elasticity: f64,
}

/// Resolve contacts between dynamic circles and every other body.
///
/// Runs at most `iterations` passes. Each penetrating contact pushes the
/// dynamic body out along the normal and removes the approaching part of the
/// relative normal velocity, scaled by the combined restitution. Friction is
/// zero so tangential velocity is left untouched. Returns the number of
/// contacts resolved.
pub fn resolve_contacts(world: &mut World, iterations: usize) -> usize {
    let obstacles: Vec<Obstacle> = world
        .query::<(&Body, &Collider)>()
        .iter()
        .filter(|(_e, (body, _))| body.kind != BodyKind::Dynamic)
        .flat_map(|(_e, (body, collider))| {
            let (pos, vel) = (body.pos, body.vel);
            let filter = collider.filter;
            let elasticity = collider.elasticity;
            collider.shapes.iter().map(move |shape| Obstacle {
                pos,
                vel,
                shape: *shape,
                filter,
                elasticity,
            })
        })
        .collect();

    let dynamics: Vec<Entity> = world
        .query::<(&Body, &Collider)>()
        .iter()
        .filter(|(_e, (body, _))| body.kind == BodyKind::Dynamic)
        .map(|(e, _)| e)
        .collect();

    let mut resolved = 0;
    for entity in dynamics {
        let Ok((body, collider)) = world.query_one_mut::<(&mut Body, &Collider)>(entity) else {
            continue;
        };

        let circles: Vec<f64> = collider
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Circle { radius } => Some(*radius),
                _ => None,
            })
            .collect();

        for _ in 0..iterations {
            let mut touched = false;
            for obstacle in &obstacles {
                if !collider.filter.collides_with(&obstacle.filter) {
                    continue;
                }
                for &radius in &circles {
                    let Some(contact) = swept_contact(
                        body.prev_pos,
                        body.pos,
                        radius,
                        &obstacle.shape,
                        obstacle.pos,
                    ) else {
                        continue;
                    };
                    if contact.depth <= Params::CONTACT_SLOP {
                        continue;
                    }

                    body.pos += contact.normal * contact.depth;

                    let restitution = collider.elasticity * obstacle.elasticity;
                    let approach = (body.vel - obstacle.vel).dot(contact.normal);
                    if approach < 0.0 {
                        body.vel -= contact.normal * (1.0 + restitution) * approach;
                    }

                    touched = true;
                    resolved += 1;
                }
            }
            if !touched {
                break;
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BallBody, CollisionFilter};

    fn spawn_ball(world: &mut World, pos: DVec2, vel: DVec2) -> Entity {
        world.spawn((
            BallBody,
            Body::dynamic(pos, vel, 1.0),
            Collider::new(vec![Shape::Circle { radius: 0.05 }], CollisionFilter::BALL, 0.8),
        ))
    }

    fn spawn_wall(world: &mut World, a: DVec2, b: DVec2, filter: CollisionFilter) -> Entity {
        world.spawn((
            Body::fixed(),
            Collider::new(vec![Shape::Segment { a, b, radius: 0.0 }], filter, 0.8),
        ))
    }

    #[test]
    fn test_segment_contact_normal_points_to_circle() {
        let shape = Shape::Segment {
            a: DVec2::new(0.0, 0.0),
            b: DVec2::new(2.0, 0.0),
            radius: 0.0,
        };
        let contact = circle_contact(DVec2::new(1.0, 0.03), 0.05, &shape, DVec2::ZERO).unwrap();
        assert!((contact.normal - DVec2::Y).length() < 1e-12);
        assert!((contact.depth - 0.02).abs() < 1e-12);
        assert!(circle_contact(DVec2::new(1.0, 0.06), 0.05, &shape, DVec2::ZERO).is_none());
    }

    #[test]
    fn test_rect_contact_outside_and_inside() {
        let shape = Shape::Rect {
            offset: DVec2::new(0.0, 0.25),
            size: DVec2::new(0.04, 0.08),
        };
        let body_pos = DVec2::new(1.0, 0.5);
        // Approaching the +x face of the foosman centered at (1.0, 0.75)
        let contact = circle_contact(DVec2::new(1.06, 0.75), 0.05, &shape, body_pos).unwrap();
        assert!((contact.normal - DVec2::X).length() < 1e-12);
        assert!((contact.depth - 0.01).abs() < 1e-12);

        // Center inside, nearest face is -x
        let contact = circle_contact(DVec2::new(0.985, 0.75), 0.05, &shape, body_pos).unwrap();
        assert_eq!(contact.normal, DVec2::NEG_X);
        assert!((contact.depth - 0.055).abs() < 1e-12);
    }

    #[test]
    fn test_ball_bounces_off_rail_with_combined_restitution() {
        let mut world = World::new();
        let ball = spawn_ball(&mut world, DVec2::new(1.0, 0.04), DVec2::new(0.5, -1.0));
        spawn_wall(&mut world, DVec2::ZERO, DVec2::new(2.0, 0.0), CollisionFilter::SIDE);

        let resolved = resolve_contacts(&mut world, 4);

        assert_eq!(resolved, 1);
        let body = world.get::<&Body>(ball).unwrap();
        assert!((body.vel.y - 0.64).abs() < 1e-12, "got {}", body.vel.y);
        assert_eq!(body.vel.x, 0.5, "Frictionless contact keeps tangential velocity");
        assert!(body.pos.y >= 0.05 - 1e-12, "Ball should be pushed out of the rail");
    }

    #[test]
    fn test_swept_contact_catches_crossed_segment() {
        let shape = Shape::Segment {
            a: DVec2::ZERO,
            b: DVec2::new(2.0, 0.0),
            radius: 0.0,
        };
        let contact = swept_contact(
            DVec2::new(1.0, 0.06),
            DVec2::new(1.0, -0.04),
            0.05,
            &shape,
            DVec2::ZERO,
        )
        .unwrap();
        assert_eq!(contact.normal, DVec2::Y, "Normal faces the side the ball came from");
        assert!((contact.depth - 0.09).abs() < 1e-12);

        // Crossing the line beyond the segment end is no contact
        assert!(swept_contact(
            DVec2::new(2.5, 0.06),
            DVec2::new(2.5, -0.04),
            0.05,
            &shape,
            DVec2::ZERO,
        )
        .is_none());
    }

    #[test]
    fn test_fast_ball_does_not_tunnel_through_rail() {
        let mut world = World::new();
        let ball = spawn_ball(&mut world, DVec2::new(1.0, 0.06), DVec2::new(0.0, -6.0));
        spawn_wall(&mut world, DVec2::ZERO, DVec2::new(2.0, 0.0), CollisionFilter::SIDE);

        crate::systems::integrate(&mut world, 1.0 / 60.0);
        resolve_contacts(&mut world, 4);

        let body = world.get::<&Body>(ball).unwrap();
        assert!(body.pos.y >= 0.05 - 1e-9, "Ball should stay on the table, got {}", body.pos.y);
        assert!((body.vel.y - 6.0 * 0.64).abs() < 1e-9, "got {}", body.vel.y);
    }

    #[test]
    fn test_ball_ignores_goal_sensor() {
        let mut world = World::new();
        let ball = spawn_ball(&mut world, DVec2::new(0.01, 0.5), DVec2::new(-1.0, 0.0));
        spawn_wall(
            &mut world,
            DVec2::new(0.0, 0.375),
            DVec2::new(0.0, 0.625),
            CollisionFilter::GOAL,
        );

        assert_eq!(resolve_contacts(&mut world, 4), 0);
        let body = world.get::<&Body>(ball).unwrap();
        assert_eq!(body.vel, DVec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_receding_ball_keeps_velocity() {
        let mut world = World::new();
        let ball = spawn_ball(&mut world, DVec2::new(1.0, 0.04), DVec2::new(0.0, 1.0));
        spawn_wall(&mut world, DVec2::ZERO, DVec2::new(2.0, 0.0), CollisionFilter::SIDE);

        resolve_contacts(&mut world, 4);

        let body = world.get::<&Body>(ball).unwrap();
        assert_eq!(body.vel, DVec2::new(0.0, 1.0), "Separating contact adds no impulse");
    }

    #[test]
    fn test_moving_foosman_kicks_still_ball() {
        let mut world = World::new();
        let ball = spawn_ball(&mut world, DVec2::new(1.06, 0.5), DVec2::ZERO);
        let mut rod = Body::kinematic(DVec2::new(1.0, 0.5));
        rod.vel = DVec2::new(2.0, 0.0);
        world.spawn((
            rod,
            Collider::new(
                vec![Shape::Rect {
                    offset: DVec2::ZERO,
                    size: DVec2::new(0.04, 0.08),
                }],
                CollisionFilter::FOOSMAN,
                0.8,
            ),
        ));

        resolve_contacts(&mut world, 4);

        let body = world.get::<&Body>(ball).unwrap();
        assert!(
            (body.vel.x - 2.0 * 1.64).abs() < 1e-12,
            "Ball should leave faster than the foot, got {}",
            body.vel.x
        );
    }
}
