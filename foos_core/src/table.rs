//! Static table geometry and the transforms between semantic rod state and
//! physical body positions.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::config::{FoosmanSize, TableConfig};
use crate::error::{Result, SimError};
use crate::params::Params;
use crate::state::{BallState, GameState, RodState, Score, Side};

/// Validated rod description with derived travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RodSpec {
    pub owner: Side,
    pub base_x: f64,
    pub foosman_count: u32,
    pub spacing: f64,
    /// Physical lateral travel; 0 means the rod cannot move sideways
    pub max_offset: f64,
}

impl RodSpec {
    /// Local lateral offsets of each foosman around the rod centerline
    pub fn foosman_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        let center = (self.foosman_count as f64 - 1.0) / 2.0;
        (0..self.foosman_count).map(move |i| self.spacing * (center - i as f64))
    }
}

/// Immutable table model for one match configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    length: f64,
    rods: Vec<RodSpec>,
    foosman: FoosmanSize,
    goal_width: f64,
    ball_radius: f64,
    clamp_rod_offset: bool,
}

impl TableModel {
    /// Validate a configuration and derive per-rod travel
    pub fn new(config: &TableConfig) -> Result<Self> {
        if !(config.length.is_finite() && config.length > 0.0) {
            return Err(SimError::invalid_config(format!(
                "table length must be positive, got {}",
                config.length
            )));
        }
        if !(config.ball_r.is_finite() && config.ball_r > 0.0) {
            return Err(SimError::invalid_config(format!(
                "ball radius must be positive, got {}",
                config.ball_r
            )));
        }
        let foo = config.foo;
        if [foo.w, foo.l, foo.h]
            .iter()
            .any(|d| !(d.is_finite() && *d > 0.0))
        {
            return Err(SimError::invalid_config(format!(
                "foosman dimensions must be positive, got {foo:?}"
            )));
        }
        if !(config.goal_w > 0.0 && config.goal_w <= 1.0) {
            return Err(SimError::invalid_config(format!(
                "goal width must be in (0, 1], got {}",
                config.goal_w
            )));
        }

        let mut rods = Vec::with_capacity(config.rods.len());
        for (idx, rod) in config.rods.iter().enumerate() {
            let owner = Side::try_from(rod.owner).map_err(|_| {
                SimError::invalid_config(format!("rod {idx} has owner {}", rod.owner))
            })?;
            if rod.foo_count == 0 {
                return Err(SimError::invalid_config(format!(
                    "rod {idx} has no foosmen"
                )));
            }
            if !(rod.foo_spacing >= 0.0 && rod.foo_spacing < 1.0) {
                return Err(SimError::invalid_config(format!(
                    "rod {idx} spacing {} outside [0, 1)",
                    rod.foo_spacing
                )));
            }
            if !rod.x.is_finite() {
                return Err(SimError::invalid_config(format!(
                    "rod {idx} position is not finite"
                )));
            }

            let max_offset = 1.0 - rod.foo_spacing * (rod.foo_count as f64 - 1.0) - foo.l;
            if max_offset < 0.0 {
                return Err(SimError::invalid_config(format!(
                    "rod {idx} foosmen do not fit across the table (max offset {max_offset:.4})"
                )));
            }

            rods.push(RodSpec {
                owner,
                base_x: rod.x,
                foosman_count: rod.foo_count,
                spacing: rod.foo_spacing,
                max_offset,
            });
        }

        log::info!(
            "table built: length={}, rods={}, goal_w={}, ball_r={}",
            config.length,
            rods.len(),
            config.goal_w,
            config.ball_r
        );

        Ok(Self {
            length: config.length,
            rods,
            foosman: foo,
            goal_width: config.goal_w,
            ball_radius: config.ball_r,
            clamp_rod_offset: config.clamp_rod_offset,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn rods(&self) -> &[RodSpec] {
        &self.rods
    }

    pub fn rod(&self, idx: usize) -> &RodSpec {
        &self.rods[idx]
    }

    pub fn foosman(&self) -> FoosmanSize {
        self.foosman
    }

    pub fn goal_width(&self) -> f64 {
        self.goal_width
    }

    pub fn ball_radius(&self) -> f64 {
        self.ball_radius
    }

    /// Distance from the rod axis to the foosman foot
    pub fn rod_height(&self) -> f64 {
        self.foosman.h
    }

    pub fn max_offset(&self, idx: usize) -> f64 {
        self.rods[idx].max_offset
    }

    /// Body x position that realizes a normalized rod angle
    pub fn rod_x(&self, idx: usize, angle: f64) -> f64 {
        self.rods[idx].base_x - (angle * FRAC_PI_2).sin() * self.rod_height()
    }

    /// Normalized angle for a body x position. Clamped because integration
    /// can overshoot the reachable range by a hair.
    pub fn rod_angle(&self, idx: usize, x: f64) -> f64 {
        let ratio = (self.rods[idx].base_x - x) / self.rod_height();
        ratio.clamp(-1.0, 1.0).asin() / FRAC_PI_2
    }

    /// Normalized offset for a body y position. Unclamped unless the table was
    /// configured with `clamp_rod_offset`.
    pub fn rod_offset(&self, idx: usize, y: f64) -> f64 {
        let max_offset = self.rods[idx].max_offset;
        if max_offset <= 0.0 {
            return 0.5;
        }
        let offset = (y - 0.5 + max_offset / 2.0) / max_offset;
        if self.clamp_rod_offset {
            offset.clamp(0.0, 1.0)
        } else {
            offset
        }
    }

    /// Body y position for a normalized offset
    pub fn rod_y(&self, idx: usize, offset: f64) -> f64 {
        let max_offset = self.rods[idx].max_offset;
        0.5 - max_offset / 2.0 + offset * max_offset
    }

    /// Owner of the goal the position lies in, if any
    pub fn goal_side(&self, position: DVec2) -> Option<Side> {
        if (position.y - 0.5).abs() >= self.goal_width / 2.0 {
            return None;
        }
        if position.x < 0.0 {
            Some(Side::Home)
        } else if position.x > self.length {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, position: DVec2, tolerance: f64) -> bool {
        position.x >= -tolerance
            && position.x <= self.length + tolerance
            && position.y >= -tolerance
            && position.y <= 1.0 + tolerance
    }

    /// x coordinate of the goal a side defends
    pub fn player_goal_x(&self, side: Side) -> f64 {
        side.index() as f64 * self.length
    }

    /// Ball spawn point before jitter
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.length / 2.0, 0.5)
    }

    /// State at the start of an episode: centered still ball, rods at rest
    pub fn initial_state(&self, score: Score) -> GameState {
        GameState::new(
            score,
            BallState {
                position: self.center(),
                velocity: DVec2::ZERO,
            },
            vec![RodState::REST; self.rods.len()],
        )
    }

    /// Absolute rod indices owned by a side, in that side's own order
    pub fn rods_for(&self, side: Side) -> Vec<usize> {
        let owned = |idx: &usize| self.rods[*idx].owner == side;
        match side {
            Side::Home => (0..self.rods.len()).filter(owned).collect(),
            Side::Away => (0..self.rods.len()).rev().filter(owned).collect(),
        }
    }

    /// Default in-bounds check used by rules
    pub fn ball_in_bounds(&self, position: DVec2) -> bool {
        self.in_bounds(position, Params::IN_BOUNDS_TOLERANCE)
    }
}
