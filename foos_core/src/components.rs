use glam::DVec2;

use crate::params::Params;
use crate::state::Side;

/// How a body's velocity is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated and pushed around by contacts
    Dynamic,
    /// Velocity prescribed every step, infinite mass
    Kinematic,
    /// Never moves
    Static,
}

/// Rigid body component
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub kind: BodyKind,
    pub pos: DVec2,
    pub vel: DVec2,
    pub prev_pos: DVec2, // Position before the last integration step
    pub mass: f64,       // infinite for kinematic/static bodies
}

impl Body {
    pub fn dynamic(pos: DVec2, vel: DVec2, mass: f64) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            pos,
            vel,
            prev_pos: pos,
            mass,
        }
    }

    pub fn kinematic(pos: DVec2) -> Self {
        Self {
            kind: BodyKind::Kinematic,
            pos,
            vel: DVec2::ZERO,
            prev_pos: pos,
            mass: f64::INFINITY,
        }
    }

    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            prev_pos: DVec2::ZERO,
            mass: f64::INFINITY,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn from_center_size(center: DVec2, size: DVec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn closest_point(&self, point: DVec2) -> DVec2 {
        point.clamp(self.min, self.max)
    }
}

/// Collision geometry in body-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Rect { offset: DVec2, size: DVec2 },
    Segment { a: DVec2, b: DVec2, radius: f64 },
}

impl Shape {
    /// World-space box for a rectangle attached to a body at `body_pos`
    pub fn world_aabb(&self, body_pos: DVec2) -> Option<Aabb> {
        match *self {
            Shape::Rect { offset, size } => Some(Aabb::from_center_size(body_pos + offset, size)),
            _ => None,
        }
    }
}

/// Collision categories as bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    pub const NONE: CollisionLayer = CollisionLayer(0);
    pub const SIDE: CollisionLayer = CollisionLayer(1 << 0);
    pub const FOOSMAN: CollisionLayer = CollisionLayer(1 << 1);
    pub const BALL: CollisionLayer = CollisionLayer(1 << 2);
    pub const GOAL: CollisionLayer = CollisionLayer(1 << 3);

    pub const fn union(self, other: CollisionLayer) -> CollisionLayer {
        CollisionLayer(self.0 | other.0)
    }

    pub const fn intersects(self, other: CollisionLayer) -> bool {
        self.0 & other.0 != 0
    }
}

/// Category a shape belongs to and the categories it accepts contacts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: CollisionLayer,
    pub mask: CollisionLayer,
}

impl CollisionFilter {
    pub const SIDE: CollisionFilter = CollisionFilter {
        category: CollisionLayer::SIDE,
        mask: CollisionLayer::BALL
            .union(CollisionLayer::FOOSMAN)
            .union(CollisionLayer::GOAL),
    };
    pub const FOOSMAN: CollisionFilter = CollisionFilter {
        category: CollisionLayer::FOOSMAN,
        mask: CollisionLayer::BALL.union(CollisionLayer::SIDE),
    };
    pub const BALL: CollisionFilter = CollisionFilter {
        category: CollisionLayer::BALL,
        mask: CollisionLayer::SIDE.union(CollisionLayer::FOOSMAN),
    };
    pub const GOAL: CollisionFilter = CollisionFilter {
        category: CollisionLayer::GOAL,
        mask: CollisionLayer::SIDE,
    };

    /// Both filters must accept each other's category
    pub fn collides_with(&self, other: &CollisionFilter) -> bool {
        self.mask.intersects(other.category) && other.mask.intersects(self.category)
    }
}

/// Shapes attached to a body plus their material
#[derive(Debug, Clone)]
pub struct Collider {
    pub shapes: Vec<Shape>,
    pub filter: CollisionFilter,
    pub elasticity: f64,
    pub friction: f64,
}

impl Collider {
    pub fn new(shapes: Vec<Shape>, filter: CollisionFilter, elasticity: f64) -> Self {
        Self {
            shapes,
            filter,
            elasticity,
            friction: Params::FRICTION,
        }
    }
}

/// Marks the ball body
#[derive(Debug, Clone, Copy, Default)]
pub struct BallBody;

/// Marks a rod body and its index in the table's rod list
#[derive(Debug, Clone, Copy)]
pub struct RodBody {
    pub index: usize,
}

/// Marks a goal-mouth sensor and the side defending it
#[derive(Debug, Clone, Copy)]
pub struct GoalSensor {
    pub side: Side,
}

/// Marks a side rail or corner segment
#[derive(Debug, Clone, Copy, Default)]
pub struct Boundary;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matrix() {
        let ball = CollisionFilter::BALL;
        let foosman = CollisionFilter::FOOSMAN;
        let side = CollisionFilter::SIDE;
        let goal = CollisionFilter::GOAL;

        assert!(ball.collides_with(&foosman));
        assert!(ball.collides_with(&side));
        assert!(!ball.collides_with(&goal), "Ball passes goal sensors");
        assert!(!foosman.collides_with(&foosman), "Foosmen ignore each other");
        assert!(foosman.collides_with(&side));
        assert!(goal.collides_with(&side));
        assert!(!goal.collides_with(&foosman));
    }

    #[test]
    fn test_filter_is_symmetric() {
        let all = [
            CollisionFilter::BALL,
            CollisionFilter::FOOSMAN,
            CollisionFilter::SIDE,
            CollisionFilter::GOAL,
        ];
        for a in &all {
            for b in &all {
                assert_eq!(a.collides_with(b), b.collides_with(a));
            }
        }
    }

    #[test]
    fn test_aabb_contains_and_closest_point() {
        let aabb = Aabb::from_center_size(DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0));
        assert_eq!(aabb.min, DVec2::ZERO);
        assert!(aabb.contains(DVec2::new(0.5, 0.5)));
        assert!(!aabb.contains(DVec2::new(2.4, 1.0)));
        assert_eq!(aabb.closest_point(DVec2::new(2.4, 1.0)), DVec2::new(2.0, 1.0));
        assert_eq!(aabb.closest_point(DVec2::new(0.5, 0.5)), DVec2::new(0.5, 0.5));
    }

    #[test]
    fn test_body_finiteness() {
        let mut body = Body::dynamic(DVec2::ZERO, DVec2::ZERO, 1.0);
        assert!(body.is_finite());
        body.vel.x = f64::NAN;
        assert!(!body.is_finite());
        assert!(Body::kinematic(DVec2::ONE).is_finite(), "Infinite mass is fine");
    }
}
