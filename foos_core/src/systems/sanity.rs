use hecs::World;

use crate::components::{BallBody, Body, GoalSensor, RodBody};
use crate::error::{Result, SimError};

/// Fail on the first body with a NaN or infinite position or velocity
pub fn check_finite(world: &World) -> Result<()> {
    let mut query = world.query::<(
        &Body,
        Option<&BallBody>,
        Option<&RodBody>,
        Option<&GoalSensor>,
    )>();
    for (_entity, (body, ball, rod, goal)) in query.iter() {
        if body.is_finite() {
            continue;
        }
        let kind = match (ball, rod, goal) {
            (Some(_), _, _) => "ball",
            (_, Some(_), _) => "rod",
            (_, _, Some(_)) => "goal",
            _ => "boundary",
        };
        return Err(SimError::NonFinite { body: kind });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_finite_world_passes() {
        let mut world = World::new();
        world.spawn((BallBody, Body::dynamic(DVec2::ONE, DVec2::ZERO, 1.0)));
        world.spawn((RodBody { index: 0 }, Body::kinematic(DVec2::new(0.1, 0.5))));
        assert!(check_finite(&world).is_ok());
    }

    #[test]
    fn test_nan_ball_is_reported() {
        let mut world = World::new();
        world.spawn((RodBody { index: 0 }, Body::kinematic(DVec2::new(0.1, 0.5))));
        world.spawn((
            BallBody,
            Body::dynamic(DVec2::new(f64::NAN, 0.5), DVec2::ZERO, 1.0),
        ));
        let err = check_finite(&world).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { body: "ball" }), "got {err:?}");
    }

    #[test]
    fn test_infinite_rod_velocity_is_reported() {
        let mut world = World::new();
        let mut body = Body::kinematic(DVec2::new(0.1, 0.5));
        body.vel.x = f64::INFINITY;
        world.spawn((RodBody { index: 3 }, body));
        assert!(matches!(
            check_finite(&world),
            Err(SimError::NonFinite { body: "rod" })
        ));
    }
}
