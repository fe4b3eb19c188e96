/// Simulation tuning parameters for the foosball table
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Materials
    pub const ELASTICITY: f64 = 0.8;
    pub const FRICTION: f64 = 0.0;
    pub const BALL_DENSITY: f64 = 1.0;

    // Episode start
    pub const BALL_JITTER: f64 = 0.05; // symmetric, applied to position and velocity

    // Boundaries
    pub const WALL_RADIUS: f64 = 0.0;
    pub const IN_BOUNDS_TOLERANCE: f64 = 0.1;

    // Solver
    pub const SOLVER_ITERATIONS: usize = 4;
    pub const CONTACT_SLOP: f64 = 1e-6;

    // Reward
    pub const GOAL_REWARD: f64 = 1000.0;
    pub const GOAL_AGAINST_PENALTY: f64 = -1000.0;
    pub const DISTANCE_REWARD_SCALE: f64 = 10.0;
    pub const INERT_SPEED: f64 = 1e-4;
    pub const INERT_PENALTY: f64 = -5.0;
    pub const SLUGGISH_SPEED: f64 = 0.1;
    pub const SLUGGISH_PENALTY_CAP: f64 = 5.0;
    pub const OUT_OF_BOUNDS_PENALTY: f64 = -2000.0;

    // Time
    pub const FIXED_DT: f64 = 1.0 / 60.0;
}
