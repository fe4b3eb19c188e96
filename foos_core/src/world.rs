//! Rigid-body scene for one episode.
//!
//! The scene is a `hecs::World` holding one dynamic ball, one kinematic body
//! per rod, static side boundaries and two goal-mouth sensors. It is built
//! from a `GameState` and thrown away on reset; entity handles never outlive
//! the world that issued them.

use glam::DVec2;
use hecs::{Entity, World};

use crate::components::*;
use crate::error::Result;
use crate::params::Params;
use crate::resources::GameRng;
use crate::state::{BallState, RodState, Side};
use crate::systems::{check_finite, drive_rods, integrate, resolve_contacts};
use crate::table::TableModel;
use crate::GameState;

/// Owns every body of the current episode
pub struct PhysicsWorld {
    world: World,
    ball: Entity,
    rods: Vec<Entity>,
    goals: [Entity; 2],
    boundaries: Vec<Entity>,
}

impl PhysicsWorld {
    /// Build the scene so that its bodies realize `state` exactly
    pub fn build(table: &TableModel, state: &GameState) -> Self {
        let mut world = World::new();

        let ball = create_ball(&mut world, table, &state.ball);

        let rods = table
            .rods()
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                let rod = state.rods.get(idx).copied().unwrap_or(RodState::REST);
                create_rod(&mut world, table, idx, &rod)
            })
            .collect();

        let boundaries = create_boundaries(&mut world, table);
        let goals = [
            create_goal_sensor(&mut world, table, Side::Home),
            create_goal_sensor(&mut world, table, Side::Away),
        ];

        Self {
            world,
            ball,
            rods,
            goals,
            boundaries,
        }
    }

    /// Advance the scene by `dt`, driving rods from their semantic state
    pub fn step(&mut self, table: &TableModel, rods: &[RodState], dt: f64) -> usize {
        drive_rods(&mut self.world, table, rods, dt);
        integrate(&mut self.world, dt);
        resolve_contacts(&mut self.world, Params::SOLVER_ITERATIONS)
    }

    /// Fails if any body carries a NaN or infinite position or velocity
    pub fn check_finite(&self) -> Result<()> {
        check_finite(&self.world)
    }

    pub fn ball(&self) -> Entity {
        self.ball
    }

    /// Rod bodies in table order
    pub fn rods(&self) -> &[Entity] {
        &self.rods
    }

    /// Goal sensors indexed by the defending side
    pub fn goals(&self) -> [Entity; 2] {
        self.goals
    }

    pub fn boundaries(&self) -> &[Entity] {
        &self.boundaries
    }

    /// Copy of a body's state, if the handle belongs to this world
    pub fn body(&self, entity: Entity) -> Option<Body> {
        self.world.get::<&Body>(entity).ok().map(|b| *b)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// Ball placed at the table center with symmetric position and velocity jitter
pub fn jittered_ball(table: &TableModel, rng: &mut GameRng) -> BallState {
    let j = Params::BALL_JITTER;
    BallState {
        position: table.center() + DVec2::new(rng.jitter(j), rng.jitter(j)),
        velocity: DVec2::new(rng.jitter(j), rng.jitter(j)),
    }
}

/// Helper to create the ball entity
pub fn create_ball(world: &mut World, table: &TableModel, ball: &BallState) -> Entity {
    let radius = table.ball_radius();
    let mass = Params::BALL_DENSITY * std::f64::consts::PI * radius * radius;
    world.spawn((
        BallBody,
        Body::dynamic(ball.position, ball.velocity, mass),
        Collider::new(
            vec![Shape::Circle { radius }],
            CollisionFilter::BALL,
            Params::ELASTICITY,
        ),
    ))
}

/// Helper to create a rod entity carrying its foosmen
pub fn create_rod(world: &mut World, table: &TableModel, idx: usize, rod: &RodState) -> Entity {
    let spec = table.rod(idx);
    let foo = table.foosman();
    let size = DVec2::new(foo.w, foo.l);
    let shapes = spec
        .foosman_offsets()
        .map(|dy| Shape::Rect {
            offset: DVec2::new(0.0, dy),
            size,
        })
        .collect();

    let pos = DVec2::new(table.rod_x(idx, rod.angle), table.rod_y(idx, rod.offset));
    world.spawn((
        RodBody { index: idx },
        Body::kinematic(pos),
        Collider::new(shapes, CollisionFilter::FOOSMAN, Params::ELASTICITY),
    ))
}

/// Rails along both long edges plus the corner pieces framing each goal mouth
fn create_boundaries(world: &mut World, table: &TableModel) -> Vec<Entity> {
    let length = table.length();
    let mouth_lo = 0.5 - table.goal_width() / 2.0;
    let mouth_hi = 0.5 + table.goal_width() / 2.0;

    let segments = [
        // Rails
        (DVec2::new(0.0, 0.0), DVec2::new(length, 0.0)),
        (DVec2::new(0.0, 1.0), DVec2::new(length, 1.0)),
        // Corners at the home end
        (DVec2::new(0.0, 0.0), DVec2::new(0.0, mouth_lo)),
        (DVec2::new(0.0, mouth_hi), DVec2::new(0.0, 1.0)),
        // Corners at the away end
        (DVec2::new(length, 0.0), DVec2::new(length, mouth_lo)),
        (DVec2::new(length, mouth_hi), DVec2::new(length, 1.0)),
    ];

    segments
        .iter()
        .map(|&(a, b)| {
            world.spawn((
                Boundary,
                Body::fixed(),
                Collider::new(
                    vec![Shape::Segment {
                        a,
                        b,
                        radius: Params::WALL_RADIUS,
                    }],
                    CollisionFilter::SIDE,
                    Params::ELASTICITY,
                ),
            ))
        })
        .collect()
}

fn create_goal_sensor(world: &mut World, table: &TableModel, side: Side) -> Entity {
    let x = table.player_goal_x(side);
    let half = table.goal_width() / 2.0;
    world.spawn((
        GoalSensor { side },
        Body::fixed(),
        Collider::new(
            vec![Shape::Segment {
                a: DVec2::new(x, 0.5 - half),
                b: DVec2::new(x, 0.5 + half),
                radius: Params::WALL_RADIUS,
            }],
            CollisionFilter::GOAL,
            Params::ELASTICITY,
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::state::Score;

    fn setup() -> (TableModel, GameState) {
        let table = TableModel::new(&TableConfig::new()).unwrap();
        let state = table.initial_state(Score::new());
        (table, state)
    }

    #[test]
    fn test_scene_inventory() {
        let (table, state) = setup();
        let physics = PhysicsWorld::build(&table, &state);

        assert_eq!(physics.rods().len(), 8);
        assert_eq!(physics.boundaries().len(), 6);
        assert_eq!(physics.world().len(), 1 + 8 + 6 + 2);

        let mut foosmen = 0;
        for (_e, (_rod, collider)) in physics.world().query::<(&RodBody, &Collider)>().iter() {
            foosmen += collider.shapes.len();
            assert_eq!(collider.filter, CollisionFilter::FOOSMAN);
            assert_eq!(collider.elasticity, 0.8);
            assert_eq!(collider.friction, 0.0);
        }
        assert_eq!(foosmen, 1 + 2 + 3 + 5 + 5 + 3 + 2 + 1);
    }

    #[test]
    fn test_rest_rods_sit_on_their_axis() {
        let (table, state) = setup();
        let physics = PhysicsWorld::build(&table, &state);
        for (idx, entity) in physics.rods().iter().enumerate() {
            let body = physics.body(*entity).unwrap();
            assert_eq!(body.kind, BodyKind::Kinematic);
            assert!((body.pos.x - table.rod(idx).base_x).abs() < 1e-12);
            assert!((body.pos.y - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_goal_sensors_span_mouth() {
        let (table, state) = setup();
        let physics = PhysicsWorld::build(&table, &state);
        let [home, away] = physics.goals();
        let home_sensor = physics.world().get::<&GoalSensor>(home).unwrap();
        assert_eq!(home_sensor.side, Side::Home);
        let collider = physics.world().get::<&Collider>(away).unwrap();
        match collider.shapes[0] {
            Shape::Segment { a, b, .. } => {
                assert_eq!(a.x, 2.0);
                assert!(((b.y - a.y) - 0.25).abs() < 1e-12);
            }
            other => panic!("expected segment, got {other:?}"),
        }
        assert!(!collider.filter.collides_with(&CollisionFilter::BALL));
    }

    #[test]
    fn test_jittered_ball_near_center() {
        let (table, _) = setup();
        let mut rng = GameRng::new(3);
        let ball = jittered_ball(&table, &mut rng);
        let offset = ball.position - table.center();
        assert!(offset.x.abs() <= 0.05 && offset.y.abs() <= 0.05);
        assert!(ball.velocity.x.abs() <= 0.05 && ball.velocity.y.abs() <= 0.05);
    }

    #[test]
    fn test_ball_mass_from_density() {
        let (table, state) = setup();
        let physics = PhysicsWorld::build(&table, &state);
        let body = physics.body(physics.ball()).unwrap();
        let expected = std::f64::consts::PI * 0.045 * 0.045;
        assert!((body.mass - expected).abs() < 1e-12);
    }
}
